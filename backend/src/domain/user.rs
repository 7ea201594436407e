//! User aggregate.
//!
//! A [`User`] owns its [`Contacts`] and exposes the password operations used
//! at login. Contacts are not persisted through the user; each contact row
//! carries its owner's [`UserId`].

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::credentials::{
    DEFAULT_BCRYPT_COST, MIN_PASSWORD_LEN, PasswordHash, compare_password,
    hash_password_with_cost,
};
use crate::domain::{Channel, Contact, Contacts, DomainError};

/// Maximum length of first and last names in characters.
pub const NAME_MAX: usize = 200;
/// Minimum username length.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length.
pub const USERNAME_MAX: usize = 20;

const DATE_OF_BIRTH_FORMAT: &str = "%d/%m/%Y";

/// Store-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        // Length is enforced separately; one optional separator between alphanumerics.
        let pattern = "^[a-zA-Z][a-zA-Z0-9]*[._-]?[a-zA-Z0-9]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Whether `username` satisfies the username grammar and length bounds.
pub fn is_valid_username(username: &str) -> bool {
    (USERNAME_MIN..=USERNAME_MAX).contains(&username.len()) && username_regex().is_match(username)
}

/// Application user.
///
/// ## Invariants (enforced by [`User::validate`])
/// - first and last names hold at most [`NAME_MAX`] characters;
/// - `username` satisfies [`is_valid_username`];
/// - a user is never its own creator.
///
/// The password hash and the two-factor verification id are never
/// serialised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<UserId>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_signed_at: Option<DateTime<Utc>>,
    #[serde(rename = "firstname", default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(rename = "lastname", default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip)]
    pub password_hash: Option<PasswordHash>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Contacts::is_empty")]
    pub contacts: Contacts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_path: Option<String>,
    #[serde(rename = "2fa_id", default)]
    pub two_factor_id: Option<i64>,
    #[serde(skip)]
    pub two_factor_verify_id: Option<Uuid>,
}

impl User {
    /// Whether a password digest is set.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether `password` matches the stored digest; `false` when none is set.
    pub fn compare_password(&self, password: &str) -> bool {
        self.password_hash
            .as_ref()
            .is_some_and(|digest| compare_password(digest, password.as_bytes()))
    }

    /// Hash and store `password` with the default bcrypt cost.
    pub fn set_password(&mut self, password: &str) -> Result<(), DomainError> {
        self.set_password_with_cost(password, DEFAULT_BCRYPT_COST)
    }

    /// Hash and store `password` with an explicit bcrypt cost.
    ///
    /// Passwords shorter than [`MIN_PASSWORD_LEN`] characters are rejected.
    pub fn set_password_with_cost(
        &mut self,
        password: &str,
        cost: u32,
    ) -> Result<(), DomainError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::invalid_argument("password too weak"));
        }
        let mut buffer = Zeroizing::new(password.as_bytes().to_vec());
        let digest = hash_password_with_cost(&mut buffer, cost).map_err(|err| {
            DomainError::invalid_argument(format!("failed to encrypt password: {err}"))
        })?;
        self.password_hash = Some(digest);
        Ok(())
    }

    /// First email contact, if any.
    pub fn email_contact(&self) -> Option<&Contact> {
        self.contacts.find_by_channel(Channel::Email)
    }

    /// Contact to use for `channel`; see [`Contacts::preferred`].
    pub fn preferred_contact(&self, channel: Channel) -> Option<&Contact> {
        self.contacts.preferred(channel)
    }

    /// Full display name: first and last name joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Canonicalise names in place.
    ///
    /// The username is trimmed and lower-cased; first and last names are
    /// trimmed and title-cased.
    pub fn sanitize(&mut self) {
        self.username = self.username.trim().to_lowercase();
        self.first_name = title_case(self.first_name.trim());
        self.last_name = title_case(self.last_name.trim());
    }

    /// Enforce the aggregate invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [("firstname", &self.first_name), ("lastname", &self.last_name)] {
            if value.chars().count() > NAME_MAX {
                return Err(DomainError::invalid_argument(format!(
                    "{field} must be at most {NAME_MAX} characters"
                )));
            }
        }
        if !is_valid_username(&self.username) {
            return Err(DomainError::invalid_argument("invalid username"));
        }
        if self.creator_id.is_some() && self.creator_id == self.id {
            return Err(DomainError::invalid_argument("creator_id is self referencing"));
        }
        Ok(())
    }
}

fn title_case(value: &str) -> String {
    let mut previous_is_letter = false;
    value
        .chars()
        .flat_map(|ch| {
            let upper = !previous_is_letter;
            previous_is_letter = ch.is_alphanumeric();
            let mapped: Vec<char> = if upper {
                ch.to_uppercase().collect()
            } else {
                vec![ch]
            };
            mapped
        })
        .collect()
}

/// List of users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Users(Vec<User>);

impl Users {
    /// User with the given identifier.
    pub fn find_by_id(&self, id: UserId) -> Option<&User> {
        self.0.iter().find(|user| user.id == Some(id))
    }

    /// Identifiers of persisted users, in order.
    pub fn ids(&self) -> Vec<UserId> {
        self.0.iter().filter_map(|user| user.id).collect()
    }

    /// Validate every user, failing on the first invalid one.
    pub fn validate_all(&self) -> Result<(), DomainError> {
        self.0.iter().try_for_each(User::validate)
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<User>> for Users {
    fn from(value: Vec<User>) -> Self {
        Self(value)
    }
}

/// Parse a `DD/MM/YYYY` date of birth.
///
/// Dates before 1900-01-01 are rejected.
pub fn parse_date_of_birth(value: &str) -> Result<NaiveDate, DomainError> {
    let date = NaiveDate::parse_from_str(value, DATE_OF_BIRTH_FORMAT)
        .map_err(|err| DomainError::invalid_argument(format!("invalid date of birth: {err}")))?;
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1)
        .ok_or_else(|| DomainError::internal("invalid earliest date of birth"))?;
    if date < earliest {
        return Err(DomainError::invalid_argument("date of birth is not valid"));
    }
    Ok(date)
}
