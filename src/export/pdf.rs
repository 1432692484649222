//! Paginated PDF report with embedded photos

use std::path::PathBuf;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::domain::VerificationRecord;
use crate::infra::{Result, UploadStore};

// US letter, points
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN_LEFT: f32 = 30.0;
const TOP_Y: f32 = PAGE_HEIGHT - 40.0;
const BOTTOM_Y: f32 = 90.0;

const PHOTO_WIDTH: f32 = 80.0;
const PHOTO_HEIGHT: f32 = 60.0;

struct QueuedImage {
    path: PathBuf,
    x: f32,
    y: f32,
}

fn text_op(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}

/// Render the record set as a paginated PDF report.
///
/// One summary line per record, with the ID and selfie photos embedded
/// below it when they resolve on disk. Unreadable photos are skipped.
pub fn render_pdf(records: &[VerificationRecord], uploads: &UploadStore) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut page_ids: Vec<Object> = Vec::new();
    let mut ops: Vec<Operation> = Vec::new();
    let mut images: Vec<QueuedImage> = Vec::new();
    let mut y = TOP_Y;

    text_op(&mut ops, "F2", 12.0, MARGIN_LEFT, y, "Verification Report");
    y -= 30.0;

    for record in records {
        if y < BOTTOM_Y {
            flush_page(
                &mut doc,
                pages_id,
                font_id,
                bold_font_id,
                std::mem::take(&mut ops),
                std::mem::take(&mut images),
                &mut page_ids,
            )?;
            y = TOP_Y;
        }

        let line = format!(
            "{} | {} | {} | {} | {} | {}",
            record.timestamp,
            record.client_id,
            record.status,
            record.name,
            record.id_number,
            record.email
        );
        text_op(&mut ops, "F1", 9.0, MARGIN_LEFT, y, &line);
        y -= 15.0;

        let mut has_photo = false;
        for (stored, x) in [
            (&record.id_photo, 50.0f32),
            (&record.selfie_photo, 150.0f32),
        ] {
            let Some(stored) = stored else { continue };
            if let Some(path) = uploads.resolve(stored) {
                images.push(QueuedImage {
                    path,
                    x,
                    y: y - PHOTO_HEIGHT,
                });
                has_photo = true;
            }
        }
        if has_photo {
            y -= PHOTO_HEIGHT + 10.0;
        }
        y -= 10.0;
    }

    flush_page(
        &mut doc,
        pages_id,
        font_id,
        bold_font_id,
        ops,
        images,
        &mut page_ids,
    )?;

    let count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn flush_page(
    doc: &mut Document,
    pages_id: lopdf::ObjectId,
    font_id: lopdf::ObjectId,
    bold_font_id: lopdf::ObjectId,
    ops: Vec<Operation>,
    images: Vec<QueuedImage>,
    page_ids: &mut Vec<Object>,
) -> Result<()> {
    let content = Content { operations: ops };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
                "F2" => bold_font_id,
            },
        },
    });

    for image in images {
        let bytes = match std::fs::read(&image.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %image.path.display(), error = %e, "Skipping unreadable photo");
                continue;
            }
        };
        match lopdf::xobject::image_from(bytes) {
            Ok(stream) => {
                doc.insert_image(
                    page_id,
                    stream,
                    (image.x, image.y),
                    (PHOTO_WIDTH, PHOTO_HEIGHT),
                )?;
            }
            Err(e) => {
                tracing::warn!(path = %image.path.display(), error = %e, "Skipping undecodable photo");
            }
        }
    }

    page_ids.push(page_id.into());
    Ok(())
}
