//! Contact identity and credentials for user accounts.
//!
//! - [`domain`]: contacts, users, credentials and the contact store service.
//! - [`outbound`]: Diesel adapters implementing the domain ports.
//! - [`config`]: settings loaded through OrthoConfig.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
