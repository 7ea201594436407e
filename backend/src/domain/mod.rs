//! Domain primitives, aggregates and services.
//!
//! Purpose: define the contact identity model, the credential primitives it
//! relies on, and the [`ContactStore`] service that persists contacts through
//! the [`ports::ContactRecords`] port. Invariants and serialisation contracts
//! are documented on each type.
//!
//! Public surface:
//! - DomainError (alias to `error::DomainError`) — typed failure with a readable message.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Channel, Contact, Contacts — contact values and their collection.
//! - User, Users — the owning aggregate.
//! - ContactStore — normalize, validate and persist contacts.

pub mod contact;
pub mod contact_store;
pub mod context;
pub mod credentials;
pub mod error;
pub mod ports;
pub mod user;

pub use self::contact::{CONTACT_MAX_LEN, Channel, Contact, ContactId, Contacts};
pub use self::contact_store::ContactStore;
pub use self::context::{ContextState, OperationContext};
pub use self::credentials::{
    BearerTokens, PasswordHash, TokenError, compare_password, hash_password, issue_token,
    verify_token,
};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::user::{User, UserId, Users, parse_date_of_birth};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use accounts::domain::{DomainError, DomainResult};
///
/// fn lookup() -> DomainResult<()> {
///     Err(DomainError::not_found("no such contact"))
/// }
/// ```
pub type DomainResult<T> = Result<T, DomainError>;
