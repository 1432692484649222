//! Record deletion handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::{ApiError, ErrorCode};
use crate::api::types::DeleteResponse;
use crate::flow;
use crate::server::AppState;

/// POST|DELETE /records/:id_number - delete every verification for an
/// id_number, including photo files and audit log blocks.
pub async fn delete_by_id_number(
    State(state): State<AppState>,
    Path(id_number): Path<String>,
) -> Result<(StatusCode, Json<DeleteResponse>), ApiError> {
    let removed =
        flow::purge_id_number(&state.store, &state.uploads, &state.audit, &id_number).await?;

    let (status, message) = if removed {
        (
            StatusCode::OK,
            format!(
                "Verification for ID Number {id_number} deleted from the database, audit log, and uploads."
            ),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("No verifications found for ID Number {id_number}."),
        )
    };

    Ok((
        status,
        Json(DeleteResponse {
            success: removed,
            message,
        }),
    ))
}

/// POST|DELETE /records/id/:id - delete a single record by row id.
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = flow::delete_record(&state.store, &state.uploads, id).await?;
    if !removed {
        return Err(
            ApiError::new(ErrorCode::RecordNotFound, format!("Record not found: {id}"))
                .with_resource_id(id.to_string()),
        );
    }
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Record {id} deleted."),
    }))
}
