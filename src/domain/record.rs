//! Verification records and dashboard projections

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Canonical timestamp format for stored records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a stored timestamp leniently.
///
/// Rows written by the live flow use [`TIMESTAMP_FORMAT`]; rows backfilled
/// from older logs occasionally carry fractional seconds or a `T`
/// separator.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in [TIMESTAMP_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    None
}

/// A stored verification outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Surrogate row id
    pub id: i64,
    /// When the verification completed, [`TIMESTAMP_FORMAT`]
    pub timestamp: String,
    /// Client identifier (the upstream enquiry id for live verifications)
    pub client_id: String,
    /// Outcome, conventionally "Success" or "Failed"
    pub status: String,
    /// Free-text detail line
    pub details: String,
    pub name: String,
    pub id_number: String,
    pub email: String,
    /// Normalized `uploads/…` path to the ID document photo
    pub id_photo: Option<String>,
    /// Normalized `uploads/…` path to the captured selfie
    pub selfie_photo: Option<String>,
}

impl VerificationRecord {
    /// The record timestamp, parsed leniently
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Case-insensitive status check against "success"
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }

    /// Case-insensitive status check against "failed"
    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case("failed")
    }
}

/// Fields for a record about to be inserted
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub timestamp: String,
    pub client_id: String,
    pub status: String,
    pub details: Option<String>,
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub email: Option<String>,
    pub id_photo: Option<String>,
    pub selfie_photo: Option<String>,
}

/// Dashboard query filters.
///
/// `None` disables a dimension. All dimensions are ANDed together.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive status equality
    pub status: Option<String>,
    /// Case-insensitive substring match on the name
    pub name: Option<String>,
    /// Exact id_number match
    pub id_number: Option<String>,
    /// Calendar month, 1-12
    pub month: Option<u32>,
    /// Calendar year
    pub year: Option<i32>,
    /// Inclusive lower date bound
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper date bound
    pub date_to: Option<NaiveDate>,
}

impl RecordFilter {
    /// Check whether a single record passes every active dimension.
    ///
    /// Date-based dimensions reject records whose timestamp cannot be
    /// parsed.
    pub fn matches(&self, record: &VerificationRecord) -> bool {
        if let Some(status) = &self.status {
            if !record.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !record.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        if let Some(id_number) = &self.id_number {
            if record.id_number.trim() != id_number.trim() {
                return false;
            }
        }

        let needs_date = self.month.is_some()
            || self.year.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some();
        if needs_date {
            let Some(ts) = record.parsed_timestamp() else {
                return false;
            };
            if let Some(month) = self.month {
                if ts.month() != month {
                    return false;
                }
            }
            if let Some(year) = self.year {
                if ts.year() != year {
                    return false;
                }
            }
            if let Some(from) = self.date_from {
                if ts.date() < from {
                    return false;
                }
            }
            if let Some(to) = self.date_to {
                if ts.date() > to {
                    return false;
                }
            }
        }

        true
    }

    /// Apply the filter to a record set, preserving order.
    pub fn apply(&self, records: Vec<VerificationRecord>) -> Vec<VerificationRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Summary statistics over a (filtered) record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// Most recent record timestamp, if any
    pub last_date: Option<String>,
}

impl DashboardStats {
    pub fn compute(records: &[VerificationRecord]) -> Self {
        let last_date = records
            .iter()
            .filter_map(|r| r.parsed_timestamp().map(|ts| (ts, &r.timestamp)))
            .max_by_key(|(ts, _)| *ts)
            .map(|(_, raw)| raw.clone());
        Self {
            total: records.len(),
            success: records.iter().filter(|r| r.is_success()).count(),
            failed: records.iter().filter(|r| r.is_failed()).count(),
            last_date,
        }
    }
}

/// Verification counts bucketed by calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyHistogram {
    pub counts: [u32; 12],
}

impl MonthlyHistogram {
    pub const LABELS: [&'static str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    /// Bucket records by the month of their timestamp; unparsable
    /// timestamps are skipped.
    pub fn compute(records: &[VerificationRecord]) -> Self {
        let mut counts = [0u32; 12];
        for record in records {
            if let Some(ts) = record.parsed_timestamp() {
                counts[ts.month0() as usize] += 1;
            }
        }
        Self { counts }
    }

    /// Largest bucket, used to scale chart bars
    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, timestamp: &str, status: &str, name: &str, id_number: &str) -> VerificationRecord {
        VerificationRecord {
            id,
            timestamp: timestamp.to_string(),
            client_id: format!("{id}"),
            status: status.to_string(),
            details: String::new(),
            name: name.to_string(),
            id_number: id_number.to_string(),
            email: String::new(),
            id_photo: None,
            selfie_photo: None,
        }
    }

    fn sample() -> Vec<VerificationRecord> {
        vec![
            record(1, "2024-03-01 10:00:00", "Success", "Thandi Mokoena", "9001015800087"),
            record(2, "2024-03-15 14:30:00", "Failed", "Sipho Dlamini", "8505055123081"),
            record(3, "2024-07-20 09:00:00", "SUCCESS", "Anna Smith", "9104036161082"),
            record(4, "2023-11-02 16:45:00", "Success", "Thandi Mokoena", "9001015800087"),
        ]
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01 10:00:00").is_some());
        assert!(parse_timestamp("2024-03-01 10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00").is_some());
        assert!(parse_timestamp("01/03/2024").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_status_filter_is_case_insensitive() {
        let filter = RecordFilter {
            status: Some("success".to_string()),
            ..Default::default()
        };
        let kept = filter.apply(sample());
        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.status.eq_ignore_ascii_case("success")));
    }

    #[test]
    fn test_name_filter_is_substring() {
        let filter = RecordFilter {
            name: Some("mokoena".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(sample()).len(), 2);
    }

    #[test]
    fn test_id_number_filter_is_exact() {
        let filter = RecordFilter {
            id_number: Some("9001015800087".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.apply(sample()).len(), 2);

        let filter = RecordFilter {
            id_number: Some("900101".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_month_year_filters() {
        let filter = RecordFilter {
            month: Some(3),
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(filter.apply(sample()).len(), 2);

        let filter = RecordFilter {
            year: Some(2023),
            ..Default::default()
        };
        assert_eq!(filter.apply(sample()).len(), 1);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filter = RecordFilter {
            date_from: Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            date_to: Some(NaiveDate::from_ymd_opt(2024, 7, 20).unwrap()),
            ..Default::default()
        };
        let kept = filter.apply(sample());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id, 2);
        assert_eq!(kept[1].id, 3);
    }

    #[test]
    fn test_date_filter_rejects_unparsable_timestamps() {
        let mut records = sample();
        records.push(record(5, "not-a-date", "Success", "X", "1"));
        let filter = RecordFilter {
            year: Some(2024),
            ..Default::default()
        };
        assert!(filter.apply(records).iter().all(|r| r.id != 5));
    }

    #[test]
    fn test_stats() {
        let stats = DashboardStats::compute(&sample());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success, 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.last_date.as_deref(), Some("2024-07-20 09:00:00"));
    }

    #[test]
    fn test_stats_empty() {
        let stats = DashboardStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.last_date, None);
    }

    #[test]
    fn test_monthly_histogram() {
        let histogram = MonthlyHistogram::compute(&sample());
        assert_eq!(histogram.counts[2], 2); // March
        assert_eq!(histogram.counts[6], 1); // July
        assert_eq!(histogram.counts[10], 1); // November
        assert_eq!(histogram.max(), 2);
    }
}
