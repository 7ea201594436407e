//! Credential primitives: password digests and bearer tokens.
//!
//! Token failures keep their own [`TokenError`] type instead of folding into
//! [`crate::domain::DomainError`]; callers translate them at the session boundary.

mod password;
mod token;

pub use self::password::{
    DEFAULT_BCRYPT_COST, MIN_PASSWORD_LEN, PasswordHash, PasswordHashError, compare_password,
    hash_password, hash_password_with_cost,
};
pub use self::token::{BearerTokens, TokenError, issue_token, verify_token};
