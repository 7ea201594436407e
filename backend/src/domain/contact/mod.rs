//! Contact channels owned by a user.
//!
//! A [`Contact`] is a plain record: callers build it in memory, call
//! [`Contact::normalize`] (best effort, never fails) and then
//! [`Contact::validate`] (the single enforcement gate). The contact store
//! performs both steps on every write path.

mod channel;
mod collection;
mod normalization;

pub use self::channel::Channel;
pub use self::collection::Contacts;
pub use self::normalization::{DEFAULT_PHONE_REGION, is_email, normalize_phone};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, UserId};

/// Maximum contact value length in characters, after normalization.
pub const CONTACT_MAX_LEN: usize = 250;

/// Store-assigned contact identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(i64);

impl ContactId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contact information for a user.
///
/// ## Invariants (enforced by [`Contact::validate`])
/// - `contact` holds 1 to [`CONTACT_MAX_LEN`] characters.
/// - Email values match the email grammar.
/// - Phone values parse as a valid phone number.
///
/// `id`, `created_at` and `updated_at` stay `None` until the store persists
/// the record.
///
/// # Examples
/// ```
/// use accounts::domain::{Channel, Contact, UserId};
///
/// let mut contact = Contact::new(UserId::new(7), Channel::Phone, " 202-555-0158 ");
/// contact.normalize();
/// assert_eq!(contact.contact, "+12025550158");
/// assert!(contact.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Option<ContactId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub channel: Channel,
    pub contact: String,
    pub verified: bool,
    pub verify_id: Option<Uuid>,
    pub user_id: UserId,
    pub confirmation_requests: u32,
}

impl Contact {
    /// Build an unpersisted, unverified contact.
    pub fn new(user_id: UserId, channel: Channel, contact: impl Into<String>) -> Self {
        Self {
            id: None,
            created_at: None,
            updated_at: None,
            channel,
            contact: contact.into(),
            verified: false,
            verify_id: None,
            user_id,
            confirmation_requests: 0,
        }
    }

    /// Canonicalise the contact value in place.
    ///
    /// Trims surrounding whitespace and lower-cases the value. Phone values
    /// are additionally rewritten to E.164; values that cannot be parsed are
    /// left as they are so [`Contact::validate`] can reject them.
    pub fn normalize(&mut self) {
        let lowered = self.contact.trim().to_lowercase();
        self.contact = match self.channel {
            Channel::Email => lowered,
            Channel::Phone => normalize_phone(&lowered).unwrap_or(lowered),
        };
    }

    /// Reject malformed contact values.
    ///
    /// Call [`Contact::normalize`] first; validation does not canonicalise.
    pub fn validate(&self) -> Result<(), DomainError> {
        let length = self.contact.chars().count();
        if length == 0 || length > CONTACT_MAX_LEN {
            return Err(DomainError::invalid_argument(format!(
                "{} contact must be between 1 and {CONTACT_MAX_LEN} characters",
                self.channel
            )));
        }

        match self.channel {
            Channel::Email if !is_email(&self.contact) => {
                Err(DomainError::invalid_argument("invalid email address"))
            }
            Channel::Phone if normalize_phone(&self.contact).is_none() => {
                Err(DomainError::invalid_argument("invalid phone number"))
            }
            Channel::Email | Channel::Phone => Ok(()),
        }
    }
}
