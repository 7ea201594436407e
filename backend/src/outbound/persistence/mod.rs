//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Contact rows live in the `user_contacts` table. The [`ContactRecords`]
//! port is implemented on `diesel_async::AsyncPgConnection` itself, so the
//! contact store runs against a pooled connection or inside a caller's
//! transaction without owning either.
//!
//! Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module.
//!
//! Pool construction belongs to the caller; [`PoolConfig`] carries the
//! settings it needs.
//!
//! [`ContactRecords`]: crate::domain::ports::ContactRecords

mod diesel_contact_records;
mod models;
mod pool;
mod schema;

pub use pool::PoolConfig;
