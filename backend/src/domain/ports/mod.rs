//! Domain ports for the hexagonal boundary.

mod contact_records;

#[cfg(test)]
pub use contact_records::MockContactRecords;
pub use contact_records::{ContactLookup, ContactRecords, ContactRecordsError};
