//! HTTP routes for DOV Bridge.

use axum::routing::get;
use axum::Router;

use crate::api::handlers::{dashboard, export, records, verify};
use crate::server::AppState;

/// Build the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::root_redirect))
        .route("/admin/dashboard", get(dashboard::dashboard))
        .route(
            "/verify",
            get(verify::verify_page).post(verify::start_verification),
        )
        .route(
            "/records/:id_number",
            axum::routing::post(records::delete_by_id_number)
                .delete(records::delete_by_id_number),
        )
        .route(
            "/records/id/:id",
            axum::routing::post(records::delete_record).delete(records::delete_record),
        )
        .route("/export/csv", get(export::export_csv))
        .route("/export/xlsx", get(export::export_xlsx))
        .route("/export/pdf", get(export::export_pdf))
}
