//! Client-facing verification endpoint.

use askama::Template;
use axum::extract::State;
use axum::response::Html;
use axum::Json;

use crate::api::error::{ApiError, ErrorCode};
use crate::api::types::{VerifyRequest, VerifyResponse};
use crate::server::AppState;

#[derive(Template)]
#[template(path = "verify.html")]
struct VerifyTemplate;

/// GET /verify - client verification page.
pub async fn verify_page() -> Result<Html<String>, ApiError> {
    VerifyTemplate
        .render()
        .map(Html)
        .map_err(|e| ApiError::new(ErrorCode::InternalError, e.to_string()))
}

/// POST /verify - start a verification for an ID number and cellphone.
pub async fn start_verification(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let id_number = request.id_number.unwrap_or_default().trim().to_string();
    if id_number.is_empty() {
        return Err(ApiError::new(
            ErrorCode::MissingRequiredField,
            "id_number is required",
        ));
    }
    let cellphone = request.cellphone.unwrap_or_default().trim().to_string();
    if cellphone.is_empty() {
        return Err(ApiError::new(
            ErrorCode::MissingRequiredField,
            "cellphone is required",
        ));
    }

    let outcome = state.flow.start(&id_number, &cellphone).await?;
    Ok(Json(VerifyResponse {
        success: outcome.accepted,
        message: outcome.message,
    }))
}
