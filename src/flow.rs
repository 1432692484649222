//! End-to-end verification flow
//!
//! Ties the XDS client, record store, uploads, and audit log together:
//! eligibility (recent-verification suppression), the live
//! login -> match -> facial-request sequence, and background completion
//! once the consumer finishes the SMS-driven facial match.

use chrono::{Duration, Local};

use crate::domain::{parse_timestamp, NewRecord, TIMESTAMP_FORMAT};
use crate::infra::{
    AuditEntry, AuditLog, BridgeError, PollConfig, PollOutcome, Result, SqliteRecordStore,
    UploadStore,
};
use crate::xds::{extract_photos, ConsumerSummary, XdsClient};

/// Days within which a previous verification suppresses a new one
pub const SUPPRESSION_WINDOW_DAYS: i64 = 90;

/// Answer to a verification start request
#[derive(Debug, Clone)]
pub struct StartOutcome {
    /// Whether a facial-match session was started
    pub accepted: bool,
    /// Human-readable message for the client
    pub message: String,
}

impl StartOutcome {
    fn rejected(message: impl Into<String>) -> Self {
        Self {
            accepted: false,
            message: message.into(),
        }
    }
}

/// Orchestrates the live verification flow
#[derive(Debug, Clone)]
pub struct VerificationFlow {
    store: SqliteRecordStore,
    client: XdsClient,
    uploads: UploadStore,
    audit: AuditLog,
    poll: PollConfig,
}

impl VerificationFlow {
    pub fn new(
        store: SqliteRecordStore,
        client: XdsClient,
        uploads: UploadStore,
        audit: AuditLog,
        poll: PollConfig,
    ) -> Self {
        Self {
            store,
            client,
            uploads,
            audit,
            poll,
        }
    }

    /// Whether the id_number was verified within the suppression window.
    ///
    /// Store errors and unparsable timestamps read as "not verified".
    pub async fn recently_verified(&self, id_number: &str) -> bool {
        let record = match self.store.latest_for_id_number(id_number).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(id_number, error = %e, "Suppression lookup failed");
                return false;
            }
        };
        let Some(record) = record else {
            return false;
        };
        let Some(last_verified) = parse_timestamp(&record.timestamp) else {
            return false;
        };
        let cutoff = Local::now().naive_local() - Duration::days(SUPPRESSION_WINDOW_DAYS);
        last_verified >= cutoff
    }

    /// Start a verification for an id_number and cellphone.
    ///
    /// Runs the consumer match and facial-verification request inline, then
    /// spawns a background task that polls for the session result and
    /// persists the outcome.
    pub async fn start(&self, id_number: &str, cell_number: &str) -> Result<StartOutcome> {
        if self.recently_verified(id_number).await {
            tracing::info!(id_number, "Already verified within the suppression window");
            return Ok(StartOutcome::rejected(
                "This ID number was already verified recently.",
            ));
        }

        let ticket = self.client.login().await?;
        if ticket.is_empty() {
            return Err(BridgeError::Soap("login returned no ticket".to_string()));
        }
        match self.client.is_ticket_valid(&ticket).await {
            Ok(validity) => tracing::debug!(validity = %validity, "Ticket validity checked"),
            Err(e) => tracing::warn!(error = %e, "Ticket validity check failed"),
        }

        let reference = uuid::Uuid::new_v4().to_string();
        let matched = self
            .client
            .match_consumer(&ticket, id_number, cell_number, &reference, "")
            .await?;

        let Some((enquiry_id, enquiry_result_id)) = matched.enquiry_ids() else {
            tracing::warn!(id_number, "Consumer match returned no enquiry ids");
            return Ok(StartOutcome::rejected("ID or cellphone not recognized."));
        };
        tracing::info!(enquiry_id, enquiry_result_id, "Consumer matched");

        let link = self
            .client
            .request_facial_verification(&ticket, enquiry_id, enquiry_result_id)
            .await?;
        if link.is_empty() {
            tracing::warn!(enquiry_id, "Facial verification request was not accepted");
            return Ok(StartOutcome::rejected(
                "Facial verification could not be requested.",
            ));
        }
        tracing::info!(enquiry_id, "SMS verification link requested");

        let flow = self.clone();
        let enquiry_id = enquiry_id.to_string();
        let summary = matched.summary.clone();
        tokio::spawn(async move {
            if let Err(e) = flow.complete(&ticket, &enquiry_id, summary).await {
                tracing::error!(enquiry_id = %enquiry_id, error = %e, "Verification completion failed");
            }
        });

        Ok(StartOutcome {
            accepted: true,
            message: "Verification started successfully.".to_string(),
        })
    }

    /// Poll for the DOV result and persist the outcome.
    pub async fn complete(
        &self,
        ticket: &str,
        enquiry_id: &str,
        match_summary: Option<ConsumerSummary>,
    ) -> Result<()> {
        let result = self.client.poll_dov_result(ticket, enquiry_id, &self.poll).await;

        match result.outcome {
            PollOutcome::Conclusive(xml) => {
                self.persist_result(enquiry_id, &xml, match_summary).await
            }
            PollOutcome::TimedOut => {
                self.persist_timeout(enquiry_id, match_summary, result.attempts)
                    .await
            }
        }
    }

    async fn persist_result(
        &self,
        enquiry_id: &str,
        xml: &str,
        match_summary: Option<ConsumerSummary>,
    ) -> Result<()> {
        let summary = ConsumerSummary::parse(xml).or(match_summary).unwrap_or_default();

        let (id_photo_b64, selfie_b64) = extract_photos(xml);
        let id_photo = match id_photo_b64 {
            Some(data) => self
                .save_photo(&data, &format!("ids/id_{enquiry_id}.jpg"))
                .await,
            None => None,
        };
        let selfie_photo = match selfie_b64 {
            Some(data) => self
                .save_photo(&data, &format!("selfies/selfie_{enquiry_id}.jpg"))
                .await,
            None => None,
        };

        let name = summary.full_name();
        let record = NewRecord {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            client_id: enquiry_id.to_string(),
            status: "Success".to_string(),
            details: Some(format!("Verification for {name} - Success")),
            name: Some(name),
            id_number: Some(summary.id_number.clone()),
            email: Some(summary.email.clone()),
            id_photo: id_photo.clone(),
            selfie_photo: selfie_photo.clone(),
        };
        self.store.insert(&record).await?;
        tracing::info!(enquiry_id, "Verification stored with photos");

        self.append_audit(&record, enquiry_id, None);
        Ok(())
    }

    async fn persist_timeout(
        &self,
        enquiry_id: &str,
        match_summary: Option<ConsumerSummary>,
        attempts: u32,
    ) -> Result<()> {
        let summary = match_summary.unwrap_or_default();
        let name = summary.full_name();
        let record = NewRecord {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            client_id: enquiry_id.to_string(),
            status: "Failed".to_string(),
            details: Some(format!(
                "DOV result polling timed out after {attempts} attempts"
            )),
            name: Some(name),
            id_number: Some(summary.id_number.clone()),
            email: Some(summary.email.clone()),
            id_photo: None,
            selfie_photo: None,
        };
        self.store.insert(&record).await?;
        tracing::warn!(enquiry_id, attempts, "Verification recorded as timed out");

        self.append_audit(&record, enquiry_id, None);
        Ok(())
    }

    async fn save_photo(&self, data: &str, relative: &str) -> Option<String> {
        match self.uploads.save_base64(data, relative) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!(relative, error = %e, "Failed to save photo");
                None
            }
        }
    }

    fn append_audit(&self, record: &NewRecord, enquiry_id: &str, enquiry_result_id: Option<&str>) {
        let entry = AuditEntry {
            timestamp: record.timestamp.clone(),
            client_id: record.client_id.clone(),
            enquiry_id: Some(enquiry_id.to_string()),
            enquiry_result_id: enquiry_result_id.map(str::to_string),
            status: record.status.clone(),
            details: record.details.clone(),
            name: record.name.clone(),
            id_number: record.id_number.clone(),
            email: record.email.clone(),
            id_photo: record.id_photo.clone(),
            selfie_photo: record.selfie_photo.clone(),
        };
        if let Err(e) = self.audit.append(&entry) {
            tracing::warn!(error = %e, "Could not write to audit log");
        }
    }
}

/// Delete everything stored for an id_number: rows, photo files, and audit
/// log blocks. Returns whether anything was removed.
pub async fn purge_id_number(
    store: &SqliteRecordStore,
    uploads: &UploadStore,
    audit: &AuditLog,
    id_number: &str,
) -> Result<bool> {
    tracing::info!(id_number, "Deleting verifications by id_number");

    let (rows_deleted, photos) = store.delete_by_id_number(id_number).await?;
    for photo in &photos {
        uploads.remove(photo);
    }
    let blocks_removed = audit.prune_by_id_number(id_number);

    tracing::info!(
        id_number,
        rows_deleted,
        files = photos.len(),
        blocks_removed,
        "Delete by id_number complete"
    );
    Ok(rows_deleted > 0 || blocks_removed > 0)
}

/// Delete one record by row id, removing its photo files.
pub async fn delete_record(
    store: &SqliteRecordStore,
    uploads: &UploadStore,
    id: i64,
) -> Result<bool> {
    match store.delete_by_id(id).await? {
        Some((id_photo, selfie_photo)) => {
            for photo in [id_photo, selfie_photo].into_iter().flatten() {
                uploads.remove(&photo);
            }
            Ok(true)
        }
        None => Ok(false),
    }
}
