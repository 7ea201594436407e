//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL contact storage using Diesel ORM
//!
//! Adapters translate between domain types and storage rows. They contain no
//! business logic.

pub mod persistence;
