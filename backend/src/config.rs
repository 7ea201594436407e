//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CREDENTIALS_*` / `DATABASE_*` environment
//! variables and configuration files, in OrthoConfig's usual precedence.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::credentials::BearerTokens;
use crate::domain::DomainError;
use crate::outbound::persistence::PoolConfig;

/// Lowest bcrypt cost the hashing library accepts.
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest bcrypt cost the hashing library accepts.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Credential settings: token signing and password hashing.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CREDENTIALS")]
pub struct CredentialSettings {
    /// HMAC secret used to sign bearer tokens.
    pub token_secret: Option<String>,
    /// Token lifetime in seconds; zero issues non-expiring tokens.
    #[ortho_config(default = 86_400)]
    pub token_ttl_secs: u64,
    /// bcrypt work factor for new password digests.
    #[ortho_config(default = 10)]
    pub bcrypt_cost: u32,
}

impl CredentialSettings {
    /// Token lifetime as a signed duration.
    ///
    /// Fails when an expiry that far from now cannot be represented.
    pub fn token_ttl(&self) -> Result<TimeDelta, DomainError> {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                DomainError::invalid_argument(format!(
                    "token ttl of {} seconds is out of range",
                    self.token_ttl_secs
                ))
            })
    }

    /// Configured bcrypt cost, checked against the supported range.
    pub fn password_cost(&self) -> Result<u32, DomainError> {
        if (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            Ok(self.bcrypt_cost)
        } else {
            Err(DomainError::invalid_argument(format!(
                "bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {}",
                self.bcrypt_cost
            )))
        }
    }

    /// Build the token issuer/verifier from these settings.
    ///
    /// Fails when no secret is configured or the secret is blank.
    pub fn bearer_tokens(&self) -> Result<BearerTokens, DomainError> {
        let secret = self
            .token_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| DomainError::invalid_argument("token secret is not configured"))?;
        Ok(BearerTokens::new(secret.as_bytes(), self.token_ttl()?))
    }
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Database settings for callers that open a contact storage pool.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DATABASE")]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL.
    pub url: Option<String>,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub max_connections: u32,
    /// Idle connections kept open.
    #[ortho_config(default = 2)]
    pub min_idle: u32,
    /// Connection checkout timeout in seconds.
    #[ortho_config(default = 30)]
    pub connect_timeout_secs: u64,
}

impl DatabaseSettings {
    /// Pool configuration for these settings; fails without a URL.
    pub fn pool_config(&self) -> Result<PoolConfig, DomainError> {
        let url = self
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| DomainError::invalid_argument("database url is not configured"))?;
        Ok(PoolConfig::new(url)
            .with_max_size(self.max_connections)
            .with_min_idle(Some(self.min_idle))
            .with_connection_timeout(Duration::from_secs(self.connect_timeout_secs)))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use crate::domain::{ErrorCode, UserId};
    use env_lock::lock_env;
    use rstest::rstest;

    fn credentials_from_empty_args() -> CredentialSettings {
        CredentialSettings::load_from_iter([OsString::from("accounts")])
            .expect("config should load")
    }

    fn database_from_empty_args() -> DatabaseSettings {
        DatabaseSettings::load_from_iter([OsString::from("accounts")])
            .expect("config should load")
    }

    #[rstest]
    fn credential_defaults_are_used_when_missing() {
        let _guard = lock_env([
            ("CREDENTIALS_TOKEN_SECRET", None::<String>),
            ("CREDENTIALS_TOKEN_TTL_SECS", None::<String>),
            ("CREDENTIALS_BCRYPT_COST", None::<String>),
        ]);

        let settings = credentials_from_empty_args();
        assert!(settings.token_secret.is_none());
        assert_eq!(settings.token_ttl_secs, 86_400);
        assert_eq!(settings.password_cost().expect("default cost"), 10);

        let err = settings.bearer_tokens().expect_err("secret required");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[rstest]
    fn credential_environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CREDENTIALS_TOKEN_SECRET", Some("s3cr3t".to_owned())),
            ("CREDENTIALS_TOKEN_TTL_SECS", Some("0".to_owned())),
            ("CREDENTIALS_BCRYPT_COST", Some("12".to_owned())),
        ]);

        let settings = credentials_from_empty_args();
        assert_eq!(settings.password_cost().expect("cost in range"), 12);

        let tokens = settings.bearer_tokens().expect("tokens configured");
        assert_eq!(tokens.ttl(), TimeDelta::zero());
        let token = tokens.issue(UserId::new(42)).expect("token issued");
        assert_eq!(tokens.verify(&token).expect("token verifies"), UserId::new(42));
        assert!(!format!("{settings:?}").contains("s3cr3t"));
    }

    #[rstest]
    #[case(3)]
    #[case(32)]
    fn out_of_range_cost_is_rejected(#[case] cost: u32) {
        let settings = CredentialSettings {
            token_secret: None,
            token_ttl_secs: 60,
            bcrypt_cost: cost,
        };

        assert!(settings.password_cost().is_err());
    }

    #[rstest]
    #[case(10_000_000_000_000)]
    #[case(u64::MAX)]
    fn unrepresentable_token_ttl_is_rejected(#[case] ttl_secs: u64) {
        let settings = CredentialSettings {
            token_secret: Some("s3cr3t".to_owned()),
            token_ttl_secs: ttl_secs,
            bcrypt_cost: 10,
        };

        let err = settings.token_ttl().expect_err("ttl out of range");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
        assert_eq!(
            err.message(),
            format!("token ttl of {ttl_secs} seconds is out of range")
        );
        let err = settings.bearer_tokens().expect_err("ttl out of range");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[rstest]
    fn century_long_token_ttl_still_issues() {
        let settings = CredentialSettings {
            token_secret: Some("s3cr3t".to_owned()),
            token_ttl_secs: 100 * 365 * 86_400,
            bcrypt_cost: 10,
        };

        let tokens = settings.bearer_tokens().expect("ttl in range");
        let token = tokens.issue(UserId::new(3)).expect("token issued");
        assert_eq!(tokens.verify(&token), Ok(UserId::new(3)));
    }

    #[rstest]
    fn database_settings_build_pool_config() {
        let _guard = lock_env([
            ("DATABASE_URL", Some("postgres://localhost/accounts".to_owned())),
            ("DATABASE_MAX_CONNECTIONS", Some("4".to_owned())),
            ("DATABASE_MIN_IDLE", None::<String>),
            ("DATABASE_CONNECT_TIMEOUT_SECS", None::<String>),
        ]);

        let settings = database_from_empty_args();
        let config = settings.pool_config().expect("pool config");
        assert_eq!(config.database_url(), "postgres://localhost/accounts");
        assert_eq!(config.max_size(), 4);
        assert_eq!(config.min_idle(), Some(2));
        assert_eq!(config.connection_timeout(), Duration::from_secs(30));
    }

    #[rstest]
    fn database_settings_require_url() {
        let _guard = lock_env([("DATABASE_URL", None::<String>)]);

        let err = database_from_empty_args()
            .pool_config()
            .expect_err("url required");
        assert_eq!(err.message(), "database url is not configured");
    }
}
