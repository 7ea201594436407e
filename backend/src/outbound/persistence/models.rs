//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::user_contacts;

/// Row struct for reading from the user_contacts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_contacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub channel: String,
    pub contact: String,
    pub verified: bool,
    pub verify_id: Option<Uuid>,
    pub user_id: i64,
    pub confirmation_requests: i32,
}

/// Insertable struct for creating new contact records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_contacts)]
pub(crate) struct NewContactRow<'a> {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub channel: &'a str,
    pub contact: &'a str,
    pub verified: bool,
    pub verify_id: Option<Uuid>,
    pub user_id: i64,
    pub confirmation_requests: i32,
}

/// Changeset for the mutable contact columns.
///
/// `verify_id` is written even when `None` so a consumed token is cleared.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = user_contacts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ContactUpdate<'a> {
    pub updated_at: DateTime<Utc>,
    pub verified: bool,
    pub verify_id: Option<Uuid>,
    pub contact: &'a str,
    pub confirmation_requests: i32,
}
