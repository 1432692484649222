//! API layer for DOV Bridge
//!
//! Server-rendered dashboard views plus JSON endpoints for verification,
//! deletion, and export downloads.

pub mod error;
pub mod handlers;
mod rest;
pub mod types;

pub use error::{ApiError, ErrorCode};
pub use rest::router;
