//! Ordered contact collections.
//!
//! All operations are pure; persistence goes through the contact store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Channel, Contact, ContactId};
use crate::domain::DomainError;

/// Ordered list of contacts belonging to one user.
///
/// Order is significant for the "first match" lookups and for
/// [`Contacts::preferred`]'s fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contacts(Vec<Contact>);

impl Contacts {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of contacts.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection holds no contacts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a contact.
    pub fn push(&mut self, contact: Contact) {
        self.0.push(contact);
    }

    /// Iterate in current order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contact> {
        self.0.iter()
    }

    /// Borrow the contacts as a slice.
    pub fn as_slice(&self) -> &[Contact] {
        self.0.as_slice()
    }

    /// Take ownership of the underlying vector.
    pub fn into_inner(self) -> Vec<Contact> {
        self.0
    }

    /// Stable sort by channel ordinal (email before phone).
    pub fn sort_by_channel(&mut self) {
        self.0.sort_by_key(|contact| contact.channel);
    }

    /// First contact with the given identifier.
    pub fn find_by_id(&self, id: ContactId) -> Option<&Contact> {
        self.0.iter().find(|contact| contact.id == Some(id))
    }

    /// First contact of the given channel.
    pub fn find_by_channel(&self, channel: Channel) -> Option<&Contact> {
        self.0.iter().find(|contact| contact.channel == channel)
    }

    /// Contact to use when reaching the user over `channel`.
    ///
    /// Returns the first contact of that channel, falling back to the first
    /// contact of any channel. A contact on some channel beats none at all.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::{Channel, Contact, Contacts, UserId};
    ///
    /// let email = Contact::new(UserId::new(1), Channel::Email, "ada@example.com");
    /// let contacts = Contacts::from(vec![email.clone()]);
    /// assert_eq!(contacts.preferred(Channel::Phone), Some(&email));
    /// assert_eq!(Contacts::new().preferred(Channel::Phone), None);
    /// ```
    pub fn preferred(&self, channel: Channel) -> Option<&Contact> {
        self.find_by_channel(channel).or_else(|| self.0.first())
    }

    /// Normalize every contact in place.
    pub fn sanitize_all(&mut self) {
        self.0.iter_mut().for_each(Contact::normalize);
    }

    /// Validate every contact, failing on the first invalid one.
    pub fn validate_all(&self) -> Result<(), DomainError> {
        self.0.iter().try_for_each(Contact::validate)
    }

    /// Copy of the collection without repeated contact values.
    ///
    /// Keeps the first occurrence of each value. Only the value is compared:
    /// an email and a phone contact with the same text count as duplicates.
    pub fn dedupe(&self) -> Self {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .filter(|contact| seen.insert(contact.contact.as_str()))
            .cloned()
            .collect()
    }
}

impl From<Vec<Contact>> for Contacts {
    fn from(value: Vec<Contact>) -> Self {
        Self(value)
    }
}

impl FromIterator<Contact> for Contacts {
    fn from_iter<I: IntoIterator<Item = Contact>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Contacts {
    type Item = Contact;
    type IntoIter = std::vec::IntoIter<Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Contacts {
    type Item = &'a Contact;
    type IntoIter = std::slice::Iter<'a, Contact>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
