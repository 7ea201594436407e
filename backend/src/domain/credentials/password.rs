//! Password hashing with bcrypt.

use std::fmt;

use zeroize::Zeroize;

/// Minimum accepted password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// bcrypt work factor used when callers do not configure one.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Failure raised by the hashing primitive.
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordHashError(#[from] bcrypt::BcryptError);

/// bcrypt digest of a password.
///
/// The digest is never printed by `Debug` and never serialised outward.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a digest loaded from storage.
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Encoded digest suitable for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Hash `password` with the default cost, then wipe the buffer.
///
/// The buffer is zeroed whether or not hashing succeeds.
pub fn hash_password(password: &mut [u8]) -> Result<PasswordHash, PasswordHashError> {
    hash_password_with_cost(password, DEFAULT_BCRYPT_COST)
}

/// Hash `password` with an explicit bcrypt cost, then wipe the buffer.
pub fn hash_password_with_cost(
    password: &mut [u8],
    cost: u32,
) -> Result<PasswordHash, PasswordHashError> {
    let result = bcrypt::hash(&*password, cost);
    password.zeroize();
    Ok(PasswordHash(result?))
}

/// Whether `password` matches `digest`.
///
/// Mismatches and malformed digests both yield `false`.
pub fn compare_password(digest: &PasswordHash, password: &[u8]) -> bool {
    bcrypt::verify(password, digest.as_str()).unwrap_or(false)
}
