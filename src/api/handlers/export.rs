//! Export handlers producing downloadable attachments.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::export;
use crate::server::AppState;

fn attachment(bytes: Vec<u8>, content_type: &'static str, filename: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// GET /export/csv
pub async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let records = state.store.fetch_all().await?;
    let bytes = export::render_csv(&records)?;
    Ok(attachment(bytes, "text/csv", "verifications.csv"))
}

/// GET /export/xlsx
pub async fn export_xlsx(State(state): State<AppState>) -> Result<Response, ApiError> {
    let records = state.store.fetch_all().await?;
    let bytes = export::render_xlsx(&records, &state.uploads)?;
    Ok(attachment(
        bytes,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "verifications.xlsx",
    ))
}

/// GET /export/pdf
pub async fn export_pdf(State(state): State<AppState>) -> Result<Response, ApiError> {
    let records = state.store.fetch_all().await?;
    let bytes = export::render_pdf(&records, &state.uploads)?;
    Ok(attachment(bytes, "application/pdf", "verifications.pdf"))
}
