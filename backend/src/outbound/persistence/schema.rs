//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Contact channels owned by users.
    ///
    /// `(user_id, channel, contact)` is unique; the index is the authority
    /// for duplicate detection, including under concurrent inserts.
    user_contacts (id) {
        /// Primary key: database-assigned sequence value.
        id -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
        /// Upper-case channel token (`EMAIL` or `PHONE`).
        channel -> Varchar,
        /// Normalized contact value (max 250 characters).
        contact -> Varchar,
        /// Whether ownership of the contact has been confirmed.
        verified -> Bool,
        /// Outstanding verification token reference.
        verify_id -> Nullable<Uuid>,
        /// Owning user.
        user_id -> Int8,
        /// Number of confirmation messages sent.
        confirmation_requests -> Int4,
    }
}
