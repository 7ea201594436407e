//! Test utilities for the accounts crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and behind the `test-support` feature.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{ContactLookup, ContactRecords, ContactRecordsError};
use crate::domain::{Contact, ContactId, UserId};

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    utc_now: DateTime<Utc>,
}

impl FixedClock {
    /// Clock that always reports `utc_now`.
    pub fn new(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }

    /// Shareable handle for services that take `Arc<dyn Clock>`.
    pub fn shared(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
        Arc::new(Self::new(utc_now))
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// In-memory contact storage enforcing the `(user_id, channel, contact)`
/// unique key.
///
/// Ids are assigned from a counter starting at one. Batch inserts are
/// all-or-nothing. Every port call is counted so tests can assert that a
/// path never reached storage.
#[derive(Debug, Default)]
pub struct InMemoryContactRecords {
    rows: Vec<Contact>,
    last_id: i64,
    calls: usize,
    fail_next: Option<ContactRecordsError>,
}

impl InMemoryContactRecords {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows in insertion order.
    pub fn rows(&self) -> &[Contact] {
        &self.rows
    }

    /// Number of port calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Make the next port call fail with `error`.
    pub fn fail_next(&mut self, error: ContactRecordsError) {
        self.fail_next = Some(error);
    }

    fn begin(&mut self) -> Result<(), ContactRecordsError> {
        self.calls += 1;
        self.fail_next.take().map_or(Ok(()), Err)
    }

    fn conflicts(&self, candidate: &Contact) -> bool {
        self.rows.iter().any(|row| {
            row.id != candidate.id
                && row.user_id == candidate.user_id
                && row.channel == candidate.channel
                && row.contact == candidate.contact
        })
    }

    fn assign(&mut self, contact: &Contact) -> Contact {
        self.last_id += 1;
        let now = Utc::now();
        let mut stored = contact.clone();
        stored.id = Some(ContactId::new(self.last_id));
        stored.created_at = Some(contact.created_at.unwrap_or(now));
        stored.updated_at = Some(contact.updated_at.unwrap_or(now));
        stored
    }
}

fn unique_violation(contact: &Contact) -> ContactRecordsError {
    ContactRecordsError::unique_violation(format!(
        "user_contacts_user_id_channel_contact_key ({}, {})",
        contact.user_id,
        contact.channel.as_storage()
    ))
}

#[async_trait]
impl ContactRecords for InMemoryContactRecords {
    async fn insert_contact(&mut self, contact: &Contact) -> Result<Contact, ContactRecordsError> {
        self.begin()?;
        let mut candidate = contact.clone();
        candidate.id = None;
        if self.conflicts(&candidate) {
            return Err(unique_violation(contact));
        }
        let stored = self.assign(&candidate);
        self.rows.push(stored.clone());
        Ok(stored)
    }

    async fn insert_contacts(
        &mut self,
        contacts: &[Contact],
    ) -> Result<Vec<Contact>, ContactRecordsError> {
        self.begin()?;
        let mut staged = Self {
            rows: self.rows.clone(),
            last_id: self.last_id,
            ..Self::default()
        };
        let mut stored = Vec::with_capacity(contacts.len());
        for contact in contacts {
            let mut candidate = contact.clone();
            candidate.id = None;
            if staged.conflicts(&candidate) {
                return Err(unique_violation(contact));
            }
            let row = staged.assign(&candidate);
            staged.rows.push(row.clone());
            stored.push(row);
        }
        self.rows = staged.rows;
        self.last_id = staged.last_id;
        Ok(stored)
    }

    async fn update_contact(&mut self, contact: &Contact) -> Result<usize, ContactRecordsError> {
        self.begin()?;
        if contact.id.is_none() {
            return Ok(0);
        }
        if self.conflicts(contact) {
            return Err(unique_violation(contact));
        }
        let Some(row) = self.rows.iter_mut().find(|row| row.id == contact.id) else {
            return Ok(0);
        };
        row.updated_at = contact.updated_at.or(row.updated_at);
        row.verified = contact.verified;
        row.verify_id = contact.verify_id;
        row.contact.clone_from(&contact.contact);
        row.confirmation_requests = contact.confirmation_requests;
        Ok(1)
    }

    async fn delete_contact(&mut self, id: ContactId) -> Result<usize, ContactRecordsError> {
        self.begin()?;
        let before = self.rows.len();
        self.rows.retain(|row| row.id != Some(id));
        Ok(before - self.rows.len())
    }

    async fn find_contact(
        &mut self,
        lookup: &ContactLookup,
    ) -> Result<Option<Contact>, ContactRecordsError> {
        self.begin()?;
        let found = self.rows.iter().find(|row| match lookup {
            ContactLookup::Id(id) => row.id == Some(*id),
            ContactLookup::VerifyId(verify_id) => row.verify_id == Some(*verify_id),
            ContactLookup::Value { channel, contact } => {
                row.channel == *channel && row.contact == *contact
            }
        });
        Ok(found.cloned())
    }

    async fn list_contacts_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<Contact>, ContactRecordsError> {
        self.begin()?;
        Ok(self
            .rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn email_exists(&mut self, email: &str) -> Result<bool, ContactRecordsError> {
        self.begin()?;
        Ok(self
            .rows
            .iter()
            .any(|row| row.channel == crate::domain::Channel::Email && row.contact == email))
    }
}
