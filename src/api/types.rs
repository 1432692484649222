//! Shared request and response types for the HTTP handlers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::RecordFilter;

/// Query parameters accepted by the dashboard.
///
/// Everything arrives as optional strings and is parsed leniently;
/// unparsable values fall back to their defaults rather than erroring.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub status: Option<String>,
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl DashboardQuery {
    /// Convert the raw query into a record filter.
    ///
    /// `status=all` and `month=0` disable those dimensions; the year
    /// defaults to the current year and `year=0` disables it.
    pub fn to_filter(&self, current_year: i32) -> RecordFilter {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
            .map(str::to_string);

        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let id_number = self
            .id_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let month = self
            .month
            .as_deref()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m));

        let year = match self.year.as_deref().map(str::trim) {
            Some(raw) => match raw.parse::<i32>() {
                Ok(0) => None,
                Ok(year) => Some(year),
                Err(_) => Some(current_year),
            },
            None => Some(current_year),
        };

        let parse_date =
            |raw: &Option<String>| -> Option<NaiveDate> {
                raw.as_deref()
                    .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            };

        RecordFilter {
            status,
            name,
            id_number,
            month,
            year,
            date_from: parse_date(&self.date_from),
            date_to: parse_date(&self.date_to),
        }
    }
}

/// Request body for the client verification endpoint.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub id_number: Option<String>,
    pub cellphone: Option<String>,
}

/// Response for the client verification endpoint.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
}

/// Response for record deletion endpoints.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}
