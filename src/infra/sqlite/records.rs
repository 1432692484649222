//! SQLite store for the verification history
//!
//! One table holds the entire persisted state. Rows are created by the live
//! verification flow or backfilled by log reconciliation, mutated only by
//! the photo retrofill, and deleted by row id or id_number.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Row};

use crate::domain::{NewRecord, VerificationRecord};
use crate::infra::uploads::normalize_path;
use crate::infra::Result;

/// SQLite-backed verification record store
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL, creating the file if missing
    pub async fn from_url(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(sqlx::Error::from)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// The underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ensure the schema exists and is current.
    ///
    /// Runs the embedded migrations, then adopts legacy databases that
    /// predate the photo columns by adding any that are missing.
    pub async fn initialize(&self) -> Result<()> {
        crate::migrations::run_sqlite(&self.pool)
            .await
            .map_err(|e| crate::infra::BridgeError::Internal(e.to_string()))?;
        self.ensure_photo_columns().await
    }

    async fn ensure_photo_columns(&self) -> Result<()> {
        let rows = sqlx::query("PRAGMA table_info(verifications)")
            .fetch_all(&self.pool)
            .await?;
        let existing: Vec<String> = rows
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();

        for column in ["id_photo", "selfie_photo"] {
            if !existing.iter().any(|c| c == column) {
                tracing::info!(column, "Adding missing column to verifications");
                sqlx::query(&format!(
                    "ALTER TABLE verifications ADD COLUMN {column} TEXT"
                ))
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    /// Insert a new verification record, normalizing photo paths.
    ///
    /// Returns the new row id.
    pub async fn insert(&self, record: &NewRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO verifications (
                timestamp, client_id, status, details,
                name, id_number, email, id_photo, selfie_photo
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.timestamp)
        .bind(&record.client_id)
        .bind(&record.status)
        .bind(&record.details)
        .bind(&record.name)
        .bind(&record.id_number)
        .bind(&record.email)
        .bind(record.id_photo.as_deref().and_then(normalize_path))
        .bind(record.selfie_photo.as_deref().and_then(normalize_path))
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch every record, most recent first.
    pub async fn fetch_all(&self) -> Result<Vec<VerificationRecord>> {
        let rows = sqlx::query_as::<_, VerificationRow>(
            r#"
            SELECT id, timestamp, client_id, status, details,
                   name, id_number, email, id_photo, selfie_photo
            FROM verifications
            ORDER BY datetime(timestamp) DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VerificationRecord::from).collect())
    }

    /// Most recent record for an id_number, if any.
    pub async fn latest_for_id_number(
        &self,
        id_number: &str,
    ) -> Result<Option<VerificationRecord>> {
        let row = sqlx::query_as::<_, VerificationRow>(
            r#"
            SELECT id, timestamp, client_id, status, details,
                   name, id_number, email, id_photo, selfie_photo
            FROM verifications
            WHERE TRIM(id_number) = ?
            ORDER BY datetime(timestamp) DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(id_number.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VerificationRecord::from))
    }

    /// Whether a row already exists for a (timestamp, client_id) pair.
    pub async fn exists(&self, timestamp: &str, client_id: &str) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM verifications WHERE timestamp = ? AND client_id = ? LIMIT 1",
        )
        .bind(timestamp)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Photo columns for a (timestamp, client_id) row, if it exists.
    pub async fn photos_for(
        &self,
        timestamp: &str,
        client_id: &str,
    ) -> Result<Option<(Option<String>, Option<String>)>> {
        let row = sqlx::query(
            "SELECT id_photo, selfie_photo FROM verifications WHERE timestamp = ? AND client_id = ?",
        )
        .bind(timestamp)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                r.get::<Option<String>, _>("id_photo"),
                r.get::<Option<String>, _>("selfie_photo"),
            )
        }))
    }

    /// Overwrite the photo columns for a (timestamp, client_id) row.
    ///
    /// Returns the number of rows updated.
    pub async fn set_photos(
        &self,
        timestamp: &str,
        client_id: &str,
        id_photo: Option<&str>,
        selfie_photo: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE verifications
            SET id_photo = ?, selfie_photo = ?
            WHERE timestamp = ? AND client_id = ?
            "#,
        )
        .bind(id_photo.and_then(normalize_path))
        .bind(selfie_photo.and_then(normalize_path))
        .bind(timestamp)
        .bind(client_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one record by row id.
    ///
    /// Returns the row's photo paths when it existed, so the caller can
    /// remove the files.
    pub async fn delete_by_id(
        &self,
        id: i64,
    ) -> Result<Option<(Option<String>, Option<String>)>> {
        let row = sqlx::query("SELECT id_photo, selfie_photo FROM verifications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let photos = (
            row.get::<Option<String>, _>("id_photo"),
            row.get::<Option<String>, _>("selfie_photo"),
        );

        sqlx::query("DELETE FROM verifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Some(photos))
    }

    /// Delete all records matching a trimmed id_number.
    ///
    /// Returns the number of rows deleted and the photo paths they held.
    pub async fn delete_by_id_number(&self, id_number: &str) -> Result<(u64, Vec<String>)> {
        let rows = sqlx::query(
            "SELECT id_photo, selfie_photo FROM verifications WHERE TRIM(id_number) = ?",
        )
        .bind(id_number.trim())
        .fetch_all(&self.pool)
        .await?;

        let mut photos = Vec::new();
        for row in &rows {
            for column in ["id_photo", "selfie_photo"] {
                if let Some(path) = row.get::<Option<String>, _>(column) {
                    if !path.trim().is_empty() {
                        photos.push(path);
                    }
                }
            }
        }

        let result = sqlx::query("DELETE FROM verifications WHERE TRIM(id_number) = ?")
            .bind(id_number.trim())
            .execute(&self.pool)
            .await?;

        Ok((result.rows_affected(), photos))
    }

    /// Total number of stored records.
    pub async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM verifications")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

/// Database row for a verification record
#[derive(Debug, FromRow)]
struct VerificationRow {
    id: i64,
    timestamp: Option<String>,
    client_id: Option<String>,
    status: Option<String>,
    details: Option<String>,
    name: Option<String>,
    id_number: Option<String>,
    email: Option<String>,
    id_photo: Option<String>,
    selfie_photo: Option<String>,
}

impl From<VerificationRow> for VerificationRecord {
    fn from(row: VerificationRow) -> Self {
        Self {
            id: row.id,
            timestamp: row.timestamp.unwrap_or_default(),
            client_id: row.client_id.unwrap_or_default(),
            status: row.status.unwrap_or_default(),
            details: row.details.unwrap_or_default(),
            name: row.name.unwrap_or_default(),
            id_number: row.id_number.unwrap_or_default(),
            email: row.email.unwrap_or_default(),
            id_photo: row.id_photo.as_deref().and_then(normalize_path),
            selfie_photo: row.selfie_photo.as_deref().and_then(normalize_path),
        }
    }
}
