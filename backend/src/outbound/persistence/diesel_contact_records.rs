//! PostgreSQL-backed `ContactRecords` implementation using Diesel ORM.
//!
//! The port is implemented directly on [`AsyncPgConnection`], so any pooled
//! connection (`&mut *pooled`) or an open transaction can be handed to the
//! contact store. Uniqueness is enforced by the `user_contacts` unique index
//! and surfaces as [`ContactRecordsError::UniqueViolation`].

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{ContactLookup, ContactRecords, ContactRecordsError};
use crate::domain::{Channel, Contact, ContactId, UserId};

use super::models::{ContactRow, ContactUpdate, NewContactRow};
use super::schema::user_contacts;

/// Map Diesel errors to contact records errors.
fn map_diesel_error(error: diesel::result::Error) -> ContactRecordsError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => ContactRecordsError::query("record not found"),
        DieselError::QueryBuilderError(_) => ContactRecordsError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            ContactRecordsError::unique_violation(
                info.constraint_name()
                    .map_or_else(|| info.message().to_owned(), str::to_owned),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ContactRecordsError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => ContactRecordsError::query("database error"),
        _ => ContactRecordsError::query("database error"),
    }
}

/// Convert a database row to a domain contact.
fn row_to_contact(row: ContactRow) -> Result<Contact, ContactRecordsError> {
    let channel = Channel::from_storage(&row.channel)
        .map_err(|err| ContactRecordsError::corrupt_row(err.message()))?;
    let confirmation_requests = u32::try_from(row.confirmation_requests).map_err(|_| {
        ContactRecordsError::corrupt_row(format!(
            "negative confirmation_requests {} for contact {}",
            row.confirmation_requests, row.id
        ))
    })?;

    Ok(Contact {
        id: Some(ContactId::new(row.id)),
        created_at: Some(row.created_at),
        updated_at: Some(row.updated_at),
        channel,
        contact: row.contact,
        verified: row.verified,
        verify_id: row.verify_id,
        user_id: UserId::new(row.user_id),
        confirmation_requests,
    })
}

fn rows_to_contacts(rows: Vec<ContactRow>) -> Result<Vec<Contact>, ContactRecordsError> {
    rows.into_iter().map(row_to_contact).collect()
}

fn confirmation_requests_for_db(contact: &Contact) -> Result<i32, ContactRecordsError> {
    i32::try_from(contact.confirmation_requests).map_err(|_| {
        ContactRecordsError::query(format!(
            "confirmation_requests {} exceeds the column range",
            contact.confirmation_requests
        ))
    })
}

fn new_row(contact: &Contact) -> Result<NewContactRow<'_>, ContactRecordsError> {
    let now = Utc::now();
    Ok(NewContactRow {
        created_at: contact.created_at.unwrap_or(now),
        updated_at: contact.updated_at.unwrap_or(now),
        channel: contact.channel.as_storage(),
        contact: &contact.contact,
        verified: contact.verified,
        verify_id: contact.verify_id,
        user_id: contact.user_id.get(),
        confirmation_requests: confirmation_requests_for_db(contact)?,
    })
}

#[async_trait]
impl ContactRecords for AsyncPgConnection {
    async fn insert_contact(&mut self, contact: &Contact) -> Result<Contact, ContactRecordsError> {
        let row = new_row(contact)?;
        let stored: ContactRow = diesel::insert_into(user_contacts::table)
            .values(&row)
            .returning(ContactRow::as_returning())
            .get_result(self)
            .await
            .map_err(map_diesel_error)?;
        row_to_contact(stored)
    }

    async fn insert_contacts(
        &mut self,
        contacts: &[Contact],
    ) -> Result<Vec<Contact>, ContactRecordsError> {
        let rows = contacts
            .iter()
            .map(new_row)
            .collect::<Result<Vec<_>, _>>()?;
        let stored: Vec<ContactRow> = diesel::insert_into(user_contacts::table)
            .values(&rows)
            .returning(ContactRow::as_returning())
            .get_results(self)
            .await
            .map_err(map_diesel_error)?;
        rows_to_contacts(stored)
    }

    async fn update_contact(&mut self, contact: &Contact) -> Result<usize, ContactRecordsError> {
        let Some(id) = contact.id else {
            return Ok(0);
        };
        let changes = ContactUpdate {
            updated_at: contact.updated_at.unwrap_or_else(Utc::now),
            verified: contact.verified,
            verify_id: contact.verify_id,
            contact: &contact.contact,
            confirmation_requests: confirmation_requests_for_db(contact)?,
        };
        diesel::update(user_contacts::table.find(id.get()))
            .set(&changes)
            .execute(self)
            .await
            .map_err(map_diesel_error)
    }

    async fn delete_contact(&mut self, id: ContactId) -> Result<usize, ContactRecordsError> {
        diesel::delete(user_contacts::table.find(id.get()))
            .execute(self)
            .await
            .map_err(map_diesel_error)
    }

    async fn find_contact(
        &mut self,
        lookup: &ContactLookup,
    ) -> Result<Option<Contact>, ContactRecordsError> {
        let mut query = user_contacts::table
            .select(ContactRow::as_select())
            .order(user_contacts::id.asc())
            .into_boxed();
        query = match lookup {
            ContactLookup::Id(id) => query.filter(user_contacts::id.eq(id.get())),
            ContactLookup::VerifyId(verify_id) => {
                query.filter(user_contacts::verify_id.eq(*verify_id))
            }
            ContactLookup::Value { channel, contact } => query
                .filter(user_contacts::channel.eq(channel.as_storage()))
                .filter(user_contacts::contact.eq(contact.as_str())),
        };

        let row = query
            .first::<ContactRow>(self)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_contact).transpose()
    }

    async fn list_contacts_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<Contact>, ContactRecordsError> {
        let rows: Vec<ContactRow> = user_contacts::table
            .filter(user_contacts::user_id.eq(user_id.get()))
            .order(user_contacts::id.asc())
            .select(ContactRow::as_select())
            .load(self)
            .await
            .map_err(map_diesel_error)?;
        rows_to_contacts(rows)
    }

    async fn email_exists(&mut self, email: &str) -> Result<bool, ContactRecordsError> {
        diesel::select(diesel::dsl::exists(
            user_contacts::table
                .filter(user_contacts::channel.eq(Channel::Email.as_storage()))
                .filter(user_contacts::contact.eq(email)),
        ))
        .get_result(self)
        .await
        .map_err(map_diesel_error)
    }
}
