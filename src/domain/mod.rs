//! Core domain types for DOV Bridge

mod record;

pub use record::{
    parse_timestamp, DashboardStats, MonthlyHistogram, NewRecord, RecordFilter,
    VerificationRecord, TIMESTAMP_FORMAT,
};
