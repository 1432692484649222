//! Spreadsheet export with embedded photo thumbnails

use rust_xlsxwriter::{Image, Workbook};

use crate::domain::VerificationRecord;
use crate::infra::{Result, UploadStore};

use super::EXPORT_HEADERS;

const PHOTO_SCALE: f64 = 0.3;
const PHOTO_ROW_HEIGHT: f64 = 60.0;

/// Render the record set as an XLSX workbook.
///
/// Photos that resolve on disk are embedded as scaled thumbnails in the
/// photo columns; rows with photos are made taller to fit them.
pub fn render_xlsx(records: &[VerificationRecord], uploads: &UploadStore) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Verifications")?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = (index + 1) as u32;
        worksheet.write_string(row, 0, &record.timestamp)?;
        worksheet.write_string(row, 1, &record.client_id)?;
        worksheet.write_string(row, 2, &record.status)?;
        worksheet.write_string(row, 3, &record.name)?;
        worksheet.write_string(row, 4, &record.id_number)?;
        worksheet.write_string(row, 5, &record.email)?;

        for (col, stored) in [(6u16, &record.id_photo), (7u16, &record.selfie_photo)] {
            let Some(stored) = stored else { continue };
            let Some(path) = uploads.resolve(stored) else {
                continue;
            };
            match Image::new(&path) {
                Ok(mut image) => {
                    let image = image
                        .set_scale_width(PHOTO_SCALE)
                        .set_scale_height(PHOTO_SCALE);
                    worksheet.set_row_height(row, PHOTO_ROW_HEIGHT)?;
                    worksheet.insert_image(row, col, &image)?;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable photo");
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
