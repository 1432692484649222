//! SQLite persistence for verification records

mod records;

pub use records::SqliteRecordStore;
