//! HS256 bearer tokens carrying a user identifier.
//!
//! Claims are `{"Id": "<decimal user id>", "exp": <unix seconds>}`; `exp` is
//! omitted for tokens issued with a zero time-to-live, which never expire.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::UserId;

const BEARER_PREFIX: &str = "bearer ";

/// Failures raised while issuing or verifying bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The signature does not match the secret.
    #[error("signature is invalid")]
    SignatureInvalid,
    /// The `exp` claim lies in the past.
    #[error("token is expired")]
    Expired,
    /// The token or its claims could not be decoded.
    #[error("malformed token: {message}")]
    Malformed { message: String },
    /// The token could not be signed.
    #[error("failed to sign token: {message}")]
    Signing { message: String },
    /// The expiry would fall outside the representable date range.
    #[error("token ttl is out of range")]
    TtlOutOfRange,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "Id")]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Sign a token for `user_id`.
///
/// A zero `ttl` produces a token without an expiry claim. Negative values
/// produce a token that is already expired. A `ttl` whose expiry cannot be
/// represented fails with [`TokenError::TtlOutOfRange`].
///
/// # Examples
/// ```
/// use accounts::domain::{UserId, issue_token, verify_token};
/// use chrono::TimeDelta;
///
/// let token = issue_token(b"secret", UserId::new(1), TimeDelta::hours(1)).unwrap();
/// let user_id = verify_token(b"secret", &format!("Bearer {token}")).unwrap();
/// assert_eq!(user_id, UserId::new(1));
/// ```
pub fn issue_token(secret: &[u8], user_id: UserId, ttl: TimeDelta) -> Result<String, TokenError> {
    let exp = if ttl == TimeDelta::zero() {
        None
    } else {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(TokenError::TtlOutOfRange)?;
        Some(expires_at.timestamp())
    };
    let claims = Claims {
        id: user_id.get().to_string(),
        exp,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|err| TokenError::Signing {
        message: err.to_string(),
    })
}

/// Verify `token` and return the user identifier it carries.
///
/// A leading `Bearer ` marker is accepted in any letter case.
pub fn verify_token(secret: &[u8], token: &str) -> Result<UserId, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.leeway = 0;

    let data = jsonwebtoken::decode::<Claims>(
        strip_bearer(token),
        &DecodingKey::from_secret(secret),
        &validation,
    )
    .map_err(map_jwt_error)?;

    data.claims
        .id
        .parse::<i64>()
        .map(UserId::new)
        .map_err(|err| TokenError::Malformed {
            message: format!("invalid Id claim: {err}"),
        })
}

fn strip_bearer(token: &str) -> &str {
    match (token.get(..BEARER_PREFIX.len()), token.get(BEARER_PREFIX.len()..)) {
        (Some(prefix), Some(rest)) if prefix.eq_ignore_ascii_case(BEARER_PREFIX) => rest,
        _ => token,
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed {
            message: error.to_string(),
        },
    }
}

/// Token issuer bound to one secret and time-to-live.
#[derive(Clone)]
pub struct BearerTokens {
    secret: Zeroizing<Vec<u8>>,
    ttl: TimeDelta,
}

impl BearerTokens {
    /// Bind a secret and a time-to-live (zero for non-expiring tokens).
    pub fn new(secret: impl Into<Vec<u8>>, ttl: TimeDelta) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            ttl,
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a token for `user_id`.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        issue_token(&self.secret, user_id, self.ttl)
    }

    /// Verify a (possibly `Bearer`-prefixed) token.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        verify_token(&self.secret, token)
    }
}

impl std::fmt::Debug for BearerTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokens")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}
