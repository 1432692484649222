//! Integration tests for audit-log reconciliation and purge
//!
//! Exercises the text-log-to-database merge end to end: block parsing,
//! duplicate suppression, photo retrofill, and the combined purge of
//! rows, files, and audit blocks for an id_number.

mod common;

use base64::Engine;

use common::*;
use dov_bridge::flow;
use dov_bridge::infra::{AuditEntry, AuditLog, UploadStore};
use dov_bridge::reconcile;

fn audit_entry(timestamp: &str, client_id: &str, id_number: &str) -> AuditEntry {
    AuditEntry {
        timestamp: timestamp.to_string(),
        client_id: client_id.to_string(),
        enquiry_id: Some(client_id.to_string()),
        enquiry_result_id: None,
        status: "Success".to_string(),
        details: Some("Verification for Thandi Mokoena - Success".to_string()),
        name: Some("Thandi Mokoena".to_string()),
        id_number: Some(id_number.to_string()),
        email: Some("thandi@example.com".to_string()),
        id_photo: Some(format!("uploads/ids/id_{client_id}.jpg")),
        selfie_photo: None,
    }
}

#[tokio::test]
async fn test_sync_inserts_new_blocks_once() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let audit = AuditLog::new(dir.path().join("audit.txt"));

    audit
        .append(&audit_entry("2024-03-01 10:00:00", "151", "111"))
        .unwrap();
    audit
        .append(&audit_entry("2024-03-02 11:00:00", "152", "222"))
        .unwrap();

    let report = reconcile::sync_log(&store, &audit, false).await.unwrap();
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(store.count().await.unwrap(), 2);

    // A second pass inserts no duplicates for existing pairs.
    let report = reconcile::sync_log(&store, &audit, false).await.unwrap();
    assert_eq!(report.inserted, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_sync_ignores_incomplete_blocks() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.txt");
    std::fs::write(
        &path,
        "Verification Status: Failed\n--- Verification Session ---\n\
         Timestamp: 2024-03-01 10:00:00\nClientID: 151\nVerification Status: Success\n\
         --- Verification Session ---\n",
    )
    .unwrap();
    let audit = AuditLog::new(&path);

    let report = reconcile::sync_log(&store, &audit, false).await.unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(report.incomplete, 1);
}

#[tokio::test]
async fn test_sync_dry_run_writes_nothing() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let audit = AuditLog::new(dir.path().join("audit.txt"));
    audit
        .append(&audit_entry("2024-03-01 10:00:00", "151", "111"))
        .unwrap();

    let report = reconcile::sync_log(&store, &audit, true).await.unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_retrofill_fills_only_missing_photos() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let audit = AuditLog::new(dir.path().join("audit.txt"));

    // Row without photos; the log has one.
    store
        .insert(&new_record("2024-03-01 10:00:00", "151", "Success", "111"))
        .await
        .unwrap();
    audit
        .append(&audit_entry("2024-03-01 10:00:00", "151", "111"))
        .unwrap();

    // Row that already has a photo; the log block points elsewhere.
    let mut existing = new_record("2024-03-02 11:00:00", "152", "Success", "222");
    existing.id_photo = Some("uploads/ids/original_152.jpg".to_string());
    store.insert(&existing).await.unwrap();
    audit
        .append(&audit_entry("2024-03-02 11:00:00", "152", "222"))
        .unwrap();

    let updated = reconcile::retrofill_photos(&store, &audit, false)
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let (filled, _) = store
        .photos_for("2024-03-01 10:00:00", "151")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(filled.as_deref(), Some("uploads/ids/id_151.jpg"));

    let (kept, _) = store
        .photos_for("2024-03-02 11:00:00", "152")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.as_deref(), Some("uploads/ids/original_152.jpg"));
}

#[tokio::test]
async fn test_retrofill_is_idempotent() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let audit = AuditLog::new(dir.path().join("audit.txt"));

    store
        .insert(&new_record("2024-03-01 10:00:00", "151", "Success", "111"))
        .await
        .unwrap();
    audit
        .append(&audit_entry("2024-03-01 10:00:00", "151", "111"))
        .unwrap();

    assert_eq!(
        reconcile::retrofill_photos(&store, &audit, false)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        reconcile::retrofill_photos(&store, &audit, false)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_purge_removes_rows_files_and_blocks() {
    let store = memory_store().await;
    let dir = tempfile::tempdir().unwrap();
    let uploads = UploadStore::new(dir.path().join("uploads"));
    uploads.ensure_layout().unwrap();
    let audit = AuditLog::new(dir.path().join("audit.txt"));

    // A verification with a photo on disk, in the store, and in the log.
    let payload = base64::engine::general_purpose::STANDARD.encode(b"jpeg");
    let stored_photo = uploads.save_base64(&payload, "ids/id_151.jpg").unwrap();
    let mut record = new_record("2024-03-01 10:00:00", "151", "Success", "111");
    record.id_photo = Some(stored_photo.clone());
    store.insert(&record).await.unwrap();
    audit
        .append(&audit_entry("2024-03-01 10:00:00", "151", "111"))
        .unwrap();

    // An unrelated verification that must survive.
    store
        .insert(&new_record("2024-03-02 11:00:00", "152", "Success", "222"))
        .await
        .unwrap();
    audit
        .append(&audit_entry("2024-03-02 11:00:00", "152", "222"))
        .unwrap();

    let removed = flow::purge_id_number(&store, &uploads, &audit, "111")
        .await
        .unwrap();
    assert!(removed);

    // Rows gone, file gone, audit block gone; the other id_number intact.
    let remaining = store.fetch_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id_number, "222");
    assert!(uploads.resolve(&stored_photo).is_none());
    let blocks = audit.read_blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id_number.as_deref(), Some("222"));

    // Nothing matched on the second pass.
    let removed = flow::purge_id_number(&store, &uploads, &audit, "111")
        .await
        .unwrap();
    assert!(!removed);
}
