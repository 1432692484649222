//! Audit-log-to-database reconciliation
//!
//! The plain-text audit log and the SQLite store describe the same
//! verification history from two angles. Reconciliation merges the log
//! into the store:
//!
//! - `sync_log` inserts a row for every session block whose
//!   (timestamp, client_id) pair is not already stored;
//! - `retrofill_photos` fills photo columns that only the log captured,
//!   never overwriting a photo the store already has.

use crate::domain::NewRecord;
use crate::infra::{normalize_path, AuditLog, Result, SessionBlock, SqliteRecordStore};

/// Outcome of a log sync pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Rows inserted for blocks not yet in the store
    pub inserted: usize,
    /// Blocks skipped because their (timestamp, client_id) pair exists
    pub skipped: usize,
    /// Blocks ignored for lacking a timestamp or client id
    pub incomplete: usize,
}

fn record_from_block(block: &SessionBlock) -> NewRecord {
    NewRecord {
        timestamp: block.timestamp.clone().unwrap_or_default(),
        client_id: block.client_id.clone().unwrap_or_default(),
        status: block.status.clone().unwrap_or_default(),
        details: block.details.clone(),
        name: block.name.clone(),
        id_number: block.id_number.clone(),
        email: block.email.clone(),
        id_photo: block.id_photo.clone(),
        selfie_photo: block.selfie_photo.clone(),
    }
}

/// Insert new audit log sessions into the store.
pub async fn sync_log(
    store: &SqliteRecordStore,
    audit: &AuditLog,
    dry_run: bool,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    for block in audit.read_blocks()? {
        if !block.is_complete() {
            report.incomplete += 1;
            continue;
        }
        let timestamp = block.timestamp.as_deref().unwrap_or_default();
        let client_id = block.client_id.as_deref().unwrap_or_default();

        if store.exists(timestamp, client_id).await? {
            report.skipped += 1;
            continue;
        }

        if dry_run {
            tracing::info!(timestamp, client_id, "Would insert session block");
        } else {
            store.insert(&record_from_block(&block)).await?;
            tracing::debug!(timestamp, client_id, "Inserted session block");
        }
        report.inserted += 1;
    }

    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        incomplete = report.incomplete,
        dry_run,
        "Log sync complete"
    );
    Ok(report)
}

fn merged_photo(current: &Option<String>, from_log: &Option<String>) -> Option<String> {
    current
        .as_deref()
        .and_then(normalize_path)
        .or_else(|| from_log.as_deref().and_then(normalize_path))
}

/// Fill missing photo columns from the audit log.
///
/// Returns the number of rows updated.
pub async fn retrofill_photos(
    store: &SqliteRecordStore,
    audit: &AuditLog,
    dry_run: bool,
) -> Result<usize> {
    let mut updated = 0;

    for block in audit.read_blocks()? {
        if !block.is_complete() {
            continue;
        }
        let timestamp = block.timestamp.as_deref().unwrap_or_default();
        let client_id = block.client_id.as_deref().unwrap_or_default();

        let Some((current_id, current_selfie)) = store.photos_for(timestamp, client_id).await?
        else {
            continue;
        };

        let current_id = current_id.as_deref().and_then(normalize_path);
        let current_selfie = current_selfie.as_deref().and_then(normalize_path);
        let new_id = merged_photo(&current_id, &block.id_photo);
        let new_selfie = merged_photo(&current_selfie, &block.selfie_photo);

        if new_id != current_id || new_selfie != current_selfie {
            if dry_run {
                tracing::info!(timestamp, client_id, "Would retrofill photos");
            } else {
                store
                    .set_photos(
                        timestamp,
                        client_id,
                        new_id.as_deref(),
                        new_selfie.as_deref(),
                    )
                    .await?;
            }
            updated += 1;
        }
    }

    tracing::info!(updated, dry_run, "Photo retrofill complete");
    Ok(updated)
}

/// Run both reconciliation passes: sync, then retrofill.
pub async fn run(
    store: &SqliteRecordStore,
    audit: &AuditLog,
    dry_run: bool,
) -> Result<(SyncReport, usize)> {
    let report = sync_log(store, audit, dry_run).await?;
    let retrofilled = retrofill_photos(store, audit, dry_run).await?;
    Ok((report, retrofilled))
}
