//! DOV Bridge Library
//!
//! Bridge service for the XDS Digital Onboarding Verification (DOV)
//! product: consumer match, facial-verification sessions, result polling,
//! local persistence, and a filterable dashboard over the stored history.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (verification records, filters, stats)
//! - [`infra`] - Infrastructure (SQLite store, audit log, uploads, polling)
//! - [`xds`] - SOAP client for the XDS Connect web service
//! - [`flow`] - End-to-end verification flow orchestration
//! - [`reconcile`] - Audit-log-to-database reconciliation
//! - [`export`] - CSV / spreadsheet / PDF report rendering
//! - [`api`] - HTTP routes (dashboard, verification, exports)

pub mod api;
pub mod domain;
pub mod export;
pub mod flow;
pub mod infra;
pub mod migrations;
pub mod reconcile;
pub mod server;
pub mod xds;

// Re-export commonly used types
pub use domain::{DashboardStats, MonthlyHistogram, RecordFilter, VerificationRecord};
pub use infra::{AuditLog, BridgeError, Result, SqliteRecordStore, UploadStore};
pub use xds::XdsClient;
