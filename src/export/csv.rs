//! CSV export

use crate::domain::VerificationRecord;
use crate::infra::{BridgeError, Result};

use super::EXPORT_HEADERS;

/// Render the record set as a CSV document.
pub fn render_csv(records: &[VerificationRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;

    for record in records {
        writer.write_record([
            record.timestamp.as_str(),
            record.client_id.as_str(),
            record.status.as_str(),
            record.name.as_str(),
            record.id_number.as_str(),
            record.email.as_str(),
            record.id_photo.as_deref().unwrap_or(""),
            record.selfie_photo.as_deref().unwrap_or(""),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| BridgeError::Export(e.to_string()))
}
