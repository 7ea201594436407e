//! Driven port for contact row storage.
//!
//! Implementations translate between domain [`Contact`] values and storage
//! rows. They perform no normalization or validation; the contact store does
//! that before calling them. Uniqueness of `(user_id, channel, contact)` must
//! be enforced by the storage engine and reported as
//! [`ContactRecordsError::UniqueViolation`].
//!
//! The trait is implemented directly on connection handles so callers keep
//! ownership of the connection and any surrounding transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Channel, Contact, ContactId, UserId};

/// Errors raised by contact record adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactRecordsError {
    /// Storage connection failed or was closed.
    #[error("contact storage connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("contact storage query failed: {message}")]
    Query { message: String },
    /// A unique index rejected an insert or update.
    #[error("contact storage unique violation: {message}")]
    UniqueViolation { message: String },
    /// A stored row could not be mapped back to a domain contact.
    #[error("contact storage returned a corrupt row: {message}")]
    CorruptRow { message: String },
}

impl ContactRecordsError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a unique-violation error with the given message.
    pub fn unique_violation(message: impl Into<String>) -> Self {
        Self::UniqueViolation {
            message: message.into(),
        }
    }

    /// Create a corrupt-row error with the given message.
    pub fn corrupt_row(message: impl Into<String>) -> Self {
        Self::CorruptRow {
            message: message.into(),
        }
    }
}

/// Single-row lookup keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactLookup {
    /// Primary key.
    Id(ContactId),
    /// Verification token reference.
    VerifyId(Uuid),
    /// Channel and normalized value, across all owners.
    Value { channel: Channel, contact: String },
}

/// Port for contact row storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRecords: Send {
    /// Insert one row and return it as stored (id and timestamps assigned).
    async fn insert_contact(&mut self, contact: &Contact) -> Result<Contact, ContactRecordsError>;

    /// Insert all rows in one statement and return them as stored.
    async fn insert_contacts(
        &mut self,
        contacts: &[Contact],
    ) -> Result<Vec<Contact>, ContactRecordsError>;

    /// Overwrite the mutable columns of the row keyed by `contact.id`.
    ///
    /// Returns the number of affected rows.
    async fn update_contact(&mut self, contact: &Contact) -> Result<usize, ContactRecordsError>;

    /// Delete the row with the given id and return the number of affected rows.
    async fn delete_contact(&mut self, id: ContactId) -> Result<usize, ContactRecordsError>;

    /// Fetch the first row matching `lookup`.
    async fn find_contact(
        &mut self,
        lookup: &ContactLookup,
    ) -> Result<Option<Contact>, ContactRecordsError>;

    /// Fetch every row owned by `user_id`.
    async fn list_contacts_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<Contact>, ContactRecordsError>;

    /// Whether any email row holds `email`.
    async fn email_exists(&mut self, email: &str) -> Result<bool, ContactRecordsError>;
}
