//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;

use dov_bridge::domain::NewRecord;
use dov_bridge::infra::SqliteRecordStore;

/// In-memory record store with the schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn memory_store() -> SqliteRecordStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should connect");
    let store = SqliteRecordStore::new(pool);
    store.initialize().await.expect("schema should apply");
    store
}

/// A populated record ready for insertion.
pub fn new_record(timestamp: &str, client_id: &str, status: &str, id_number: &str) -> NewRecord {
    NewRecord {
        timestamp: timestamp.to_string(),
        client_id: client_id.to_string(),
        status: status.to_string(),
        details: Some(format!("Verification for client {client_id}")),
        name: Some("Thandi Mokoena".to_string()),
        id_number: Some(id_number.to_string()),
        email: Some("thandi@example.com".to_string()),
        id_photo: None,
        selfie_photo: None,
    }
}
