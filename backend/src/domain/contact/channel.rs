//! Contact channel variants and their wire/storage codecs.
//!
//! Wire tokens are lower-case (`email`, `phone`) and come from untrusted
//! input, so unknown tokens are rejected as invalid arguments. Storage tokens
//! are upper-case (`EMAIL`, `PHONE`) and come from our own rows, so unknown
//! tokens indicate corruption and are reported as internal errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Medium through which a user can be contacted.
///
/// Variants are ordered by ordinal: [`Channel::Email`] sorts before
/// [`Channel::Phone`].
///
/// # Examples
/// ```
/// use accounts::domain::Channel;
///
/// let channel: Channel = "phone".parse().unwrap();
/// assert_eq!(channel, Channel::Phone);
/// assert_eq!(channel.as_storage(), "PHONE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Channel {
    /// Email address.
    Email,
    /// Phone number in international format.
    Phone,
}

impl Channel {
    /// Lower-case wire token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Upper-case storage token.
    pub const fn as_storage(self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
        }
    }

    /// Decode an upper-case storage token.
    ///
    /// Unknown tokens fail with [`crate::domain::ErrorCode::Internal`].
    pub fn from_storage(value: &str) -> Result<Self, DomainError> {
        match value {
            "EMAIL" => Ok(Self::Email),
            "PHONE" => Ok(Self::Phone),
            other => Err(DomainError::internal(format!(
                "unknown contact channel value: {other}"
            ))),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    /// Decode a lower-case wire token.
    ///
    /// Unknown tokens fail with [`crate::domain::ErrorCode::InvalidArgument`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            other => Err(DomainError::invalid_argument(format!(
                "invalid channel value: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for Channel {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Channel> for String {
    fn from(value: Channel) -> Self {
        value.as_str().to_owned()
    }
}
