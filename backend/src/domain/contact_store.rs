//! Contact persistence service.
//!
//! [`ContactStore`] is the single gateway between contact values and the
//! [`ContactRecords`] port. Every write normalizes and validates before any
//! storage call, every call checks the [`OperationContext`] first, and
//! storage failures are classified into [`DomainError`] here and nowhere else.
//!
//! The records handle is borrowed per call so callers keep control of the
//! connection and of any surrounding transaction.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{ContactLookup, ContactRecords, ContactRecordsError};
use crate::domain::{Channel, Contact, ContactId, Contacts, DomainError, OperationContext, UserId};

/// Contact persistence service.
#[derive(Clone)]
pub struct ContactStore {
    clock: Arc<dyn Clock>,
}

impl ContactStore {
    /// Create a store that stamps timestamps from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Normalize, validate and insert `contact`.
    ///
    /// On success `contact` is replaced by the stored row. A row with the
    /// same owner, channel and value fails with `AlreadyExists`.
    pub async fn create<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        contact: &mut Contact,
    ) -> Result<(), DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("create contact")?;
        contact.normalize();
        contact.validate()?;

        let pending = self.stamp_new(contact.clone());
        match records.insert_contact(&pending).await {
            Ok(stored) => {
                debug!(
                    contact_id = ?stored.id,
                    user_id = %stored.user_id,
                    channel = %stored.channel,
                    "contact created"
                );
                *contact = stored;
                Ok(())
            }
            Err(ContactRecordsError::UniqueViolation { .. }) => Err(DomainError::already_exists(
                format!("contact {} {} already exists", contact.channel, contact.contact),
            )),
            Err(err) => Err(map_records_error("failed to create contact", err)),
        }
    }

    /// Normalize, validate and insert every contact in one storage call.
    ///
    /// Validation fails on the first invalid element and nothing is written.
    /// A uniqueness violation on any row fails the whole batch with
    /// `InvalidArgument`. An empty batch is a no-op.
    pub async fn batch_create<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        contacts: &mut Contacts,
    ) -> Result<(), DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("create contacts")?;
        contacts.sanitize_all();
        contacts.validate_all()?;
        if contacts.is_empty() {
            return Ok(());
        }

        let pending: Vec<Contact> = contacts
            .iter()
            .cloned()
            .map(|contact| self.stamp_new(contact))
            .collect();
        match records.insert_contacts(&pending).await {
            Ok(stored) => {
                debug!(count = stored.len(), "contacts created");
                *contacts = Contacts::from(stored);
                Ok(())
            }
            // Single inserts report AlreadyExists for the same condition.
            Err(ContactRecordsError::UniqueViolation { .. }) => {
                Err(DomainError::invalid_argument("contact already exists"))
            }
            Err(err) => Err(map_records_error("failed to create contacts", err)),
        }
    }

    /// Normalize, validate and overwrite the mutable columns of `contact`.
    ///
    /// Returns the number of affected rows; zero means no row carried the
    /// contact's identifier and is left for the caller to interpret. A
    /// contact without an identifier matches nothing.
    pub async fn update<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        contact: &mut Contact,
    ) -> Result<usize, DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("update contact")?;
        contact.normalize();
        contact.validate()?;
        if contact.id.is_none() {
            return Ok(0);
        }

        let mut pending = contact.clone();
        pending.updated_at = Some(self.clock.utc());
        match records.update_contact(&pending).await {
            Ok(affected) => {
                debug!(contact_id = ?pending.id, affected, "contact updated");
                if affected > 0 {
                    *contact = pending;
                }
                Ok(affected)
            }
            Err(ContactRecordsError::UniqueViolation { .. }) => Err(DomainError::already_exists(
                format!("contact {} {} already exists", contact.channel, contact.contact),
            )),
            Err(err) => Err(map_records_error("failed to update contact", err)),
        }
    }

    /// Delete the contact with `id`; fails with `NotFound` when no row matched.
    pub async fn delete_by_id<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        id: ContactId,
    ) -> Result<(), DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("delete contact")?;
        let affected = records
            .delete_contact(id)
            .await
            .map_err(|err| map_records_error("failed to delete contact", err))?;
        if affected == 0 {
            return Err(DomainError::not_found(format!(
                "failed to delete contact: contact {id} not found"
            )));
        }
        debug!(contact_id = %id, "contact deleted");
        Ok(())
    }

    /// Fetch the contact with `id`.
    pub async fn get_by_id<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        id: ContactId,
    ) -> Result<Contact, DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("get contact")?;
        find_one(records, &ContactLookup::Id(id), "failed to get contact").await
    }

    /// Fetch the contact linked to the verification token `verify_id`.
    pub async fn get_by_verify_id<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        verify_id: Uuid,
    ) -> Result<Contact, DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("get contact by verify id")?;
        find_one(
            records,
            &ContactLookup::VerifyId(verify_id),
            "failed to get contact by verify id",
        )
        .await
    }

    /// Replace `contact` with the stored row holding its channel and value.
    ///
    /// The lookup spans all owners. The value is normalized before the
    /// lookup so it matches what writes persist.
    pub async fn get_existing<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        contact: &mut Contact,
    ) -> Result<(), DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("get existing contact")?;
        contact.normalize();
        let lookup = ContactLookup::Value {
            channel: contact.channel,
            contact: contact.contact.clone(),
        };
        *contact = find_one(records, &lookup, "failed to get existing contact").await?;
        Ok(())
    }

    /// All contacts owned by `user_id`; empty when the user has none.
    pub async fn find_by_user_id<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        user_id: UserId,
    ) -> Result<Contacts, DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("find contacts")?;
        let rows = records
            .list_contacts_for_user(user_id)
            .await
            .map_err(|err| map_records_error("failed to find contacts", err))?;
        Ok(Contacts::from(rows))
    }

    /// Whether any user already holds `email` as an email contact.
    pub async fn email_exists<R>(
        &self,
        ctx: &OperationContext,
        records: &mut R,
        email: &str,
    ) -> Result<bool, DomainError>
    where
        R: ContactRecords + ?Sized,
    {
        ctx.ensure_active("check email")?;
        let mut probe = Contact::new(UserId::new(0), Channel::Email, email);
        probe.normalize();
        records
            .email_exists(&probe.contact)
            .await
            .map_err(|err| map_records_error("failed to check email", err))
    }

    fn stamp_new(&self, mut contact: Contact) -> Contact {
        let now = self.clock.utc();
        contact.id = None;
        contact.created_at = Some(contact.created_at.unwrap_or(now));
        contact.updated_at = Some(contact.updated_at.unwrap_or(now));
        contact
    }
}

async fn find_one<R>(
    records: &mut R,
    lookup: &ContactLookup,
    operation: &str,
) -> Result<Contact, DomainError>
where
    R: ContactRecords + ?Sized,
{
    records
        .find_contact(lookup)
        .await
        .map_err(|err| map_records_error(operation, err))?
        .ok_or_else(|| DomainError::not_found(format!("{operation}: not found")))
}

fn map_records_error(operation: &str, error: ContactRecordsError) -> DomainError {
    match &error {
        ContactRecordsError::Connection { .. } => {
            warn!(operation, error = %error, "contact storage unavailable");
        }
        ContactRecordsError::CorruptRow { .. } => {
            warn!(operation, error = %error, "contact storage returned a corrupt row");
        }
        ContactRecordsError::Query { .. } | ContactRecordsError::UniqueViolation { .. } => {
            debug!(operation, error = %error, "contact storage call failed");
        }
    }
    DomainError::internal(format!("{operation}: {error}"))
}
