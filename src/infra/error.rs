//! Error types for DOV Bridge infrastructure

use thiserror::Error;

/// Errors that can occur in the bridge infrastructure
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP transport error talking to the XDS service
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed XML in a SOAP response
    #[error("xml error: {0}")]
    Xml(String),

    /// The SOAP response did not carry the expected result element
    #[error("soap fault: {0}")]
    Soap(String),

    /// Record not found
    #[error("record not found: {0}")]
    RecordNotFound(i64),

    /// File I/O error (uploads, audit log)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Base64 photo payload could not be decoded
    #[error("photo decode error: {0}")]
    PhotoDecode(#[from] base64::DecodeError),

    /// Export rendering error
    #[error("export error: {0}")]
    Export(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<quick_xml::Error> for BridgeError {
    fn from(err: quick_xml::Error) -> Self {
        BridgeError::Xml(err.to_string())
    }
}

impl From<csv::Error> for BridgeError {
    fn from(err: csv::Error) -> Self {
        BridgeError::Export(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for BridgeError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        BridgeError::Export(err.to_string())
    }
}

impl From<lopdf::Error> for BridgeError {
    fn from(err: lopdf::Error) -> Self {
        BridgeError::Export(err.to_string())
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
