//! Report rendering for the stored verification history
//!
//! Three attachment formats, all rendered in memory: CSV for spreadsheets
//! and scripts, XLSX with embedded photo thumbnails, and a paginated PDF
//! report with embedded photos.

mod csv;
mod pdf;
mod xlsx;

pub use self::csv::render_csv;
pub use self::pdf::render_pdf;
pub use self::xlsx::render_xlsx;

/// Column headers shared by the tabular exports
pub(crate) const EXPORT_HEADERS: [&str; 8] = [
    "Timestamp",
    "Client ID",
    "Status",
    "Name",
    "ID Number",
    "Email",
    "ID Photo",
    "Selfie Photo",
];
