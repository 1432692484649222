//! Dashboard view over the stored verification history.

use askama::Template;
use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use chrono::{Datelike, Local};

use crate::api::error::{ApiError, ErrorCode};
use crate::api::types::DashboardQuery;
use crate::domain::{DashboardStats, MonthlyHistogram, VerificationRecord};
use crate::server::AppState;

/// Echo of the active filters, for re-populating the filter form
struct FilterEcho {
    status: String,
    name: String,
    id_number: String,
    month: String,
    year: String,
    date_from: String,
    date_to: String,
}

/// One table row prepared for rendering
struct RecordRow {
    timestamp: String,
    client_id: String,
    status: String,
    status_class: &'static str,
    name: String,
    id_number: String,
    email: String,
    id_photo_url: String,
    selfie_photo_url: String,
}

/// One bar of the monthly histogram
struct MonthBar {
    label: &'static str,
    count: u32,
    percent: u32,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    stats: DashboardStats,
    last_date: String,
    rows: Vec<RecordRow>,
    bars: Vec<MonthBar>,
    filters: FilterEcho,
    current_year: i32,
}

fn to_uploads_url(stored: &Option<String>) -> String {
    match stored {
        Some(path) if !path.trim().is_empty() => format!("/{}", path.trim_start_matches('/')),
        _ => String::new(),
    }
}

fn row_from_record(record: VerificationRecord) -> RecordRow {
    let status_class = if record.is_success() {
        "success"
    } else if record.is_failed() {
        "failed"
    } else {
        "other"
    };
    RecordRow {
        id_photo_url: to_uploads_url(&record.id_photo),
        selfie_photo_url: to_uploads_url(&record.selfie_photo),
        timestamp: record.timestamp,
        client_id: record.client_id,
        status: record.status,
        status_class,
        name: record.name,
        id_number: record.id_number,
        email: record.email,
    }
}

/// GET / - redirect to the dashboard.
pub async fn root_redirect() -> Redirect {
    Redirect::to("/admin/dashboard")
}

/// GET /admin/dashboard - filtered verification history.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, ApiError> {
    let current_year = Local::now().year();
    let filter = query.to_filter(current_year);

    let records = state.store.fetch_all().await?;
    let records = filter.apply(records);

    let stats = DashboardStats::compute(&records);
    let last_date = stats.last_date.clone().unwrap_or_else(|| "N/A".to_string());

    let histogram = MonthlyHistogram::compute(&records);
    let scale = histogram.max().max(1);
    let bars = MonthlyHistogram::LABELS
        .into_iter()
        .zip(histogram.counts)
        .map(|(label, count)| MonthBar {
            label,
            count,
            percent: count * 100 / scale,
        })
        .collect();

    let filters = FilterEcho {
        status: query.status.clone().unwrap_or_else(|| "all".to_string()),
        name: query.name.clone().unwrap_or_default(),
        id_number: query.id_number.clone().unwrap_or_default(),
        month: query.month.clone().unwrap_or_else(|| "0".to_string()),
        year: query
            .year
            .clone()
            .unwrap_or_else(|| current_year.to_string()),
        date_from: query.date_from.clone().unwrap_or_default(),
        date_to: query.date_to.clone().unwrap_or_default(),
    };

    let template = DashboardTemplate {
        stats,
        last_date,
        rows: records.into_iter().map(row_from_record).collect(),
        bars,
        filters,
        current_year,
    };

    template
        .render()
        .map(Html)
        .map_err(|e| ApiError::new(ErrorCode::InternalError, e.to_string()))
}
