//! Plain-text audit log for verification sessions
//!
//! Every verification attempt appends one human-readable block of
//! `Field: value` lines, terminated by the session delimiter. The same
//! format is read back by the reconciliation pass and pruned on deletion,
//! so writer, reader, and pruner all share [`SESSION_DELIMITER`].

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::infra::Result;

/// Terminator line between session blocks
pub const SESSION_DELIMITER: &str = "--- Verification Session ---";

/// One verification attempt as written to the audit log
#[derive(Debug, Clone, Default)]
pub struct AuditEntry {
    pub timestamp: String,
    pub client_id: String,
    pub enquiry_id: Option<String>,
    pub enquiry_result_id: Option<String>,
    pub status: String,
    pub details: Option<String>,
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub email: Option<String>,
    pub id_photo: Option<String>,
    pub selfie_photo: Option<String>,
}

/// A session block parsed back out of the audit log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionBlock {
    pub timestamp: Option<String>,
    pub client_id: Option<String>,
    pub status: Option<String>,
    pub details: Option<String>,
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub email: Option<String>,
    pub id_photo: Option<String>,
    pub selfie_photo: Option<String>,
}

impl SessionBlock {
    /// Extract session fields from one log block by literal line prefix.
    pub fn parse(block: &str) -> Self {
        let mut session = SessionBlock::default();
        for line in block.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("Timestamp:") {
                session.timestamp = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("ClientID:") {
                session.client_id = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("Verification Status:") {
                session.status = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("Details:") {
                session.details = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("Name:") {
                session.name = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("ID Number:") {
                session.id_number = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("Email:") {
                session.email = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("ConsumerIDPhoto:") {
                session.id_photo = non_empty(rest);
            } else if let Some(rest) = line.strip_prefix("ConsumerCapturedPhoto:") {
                session.selfie_photo = non_empty(rest);
            }
        }
        session
    }

    /// A block is usable for reconciliation when it carries both the
    /// timestamp and the client identifier.
    pub fn is_complete(&self) -> bool {
        self.timestamp.is_some() && self.client_id.is_some()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Append-only text audit log
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Create an audit log handle for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The audit log path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log file if it does not exist yet
    pub fn ensure_exists(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        OpenOptions::new().create(true).append(true).open(&self.path)?;
        Ok(())
    }

    /// Append one session block for a verification attempt
    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut block = String::new();
        let _ = writeln!(block, "Timestamp: {}", entry.timestamp);
        let _ = writeln!(block, "ClientID: {}", entry.client_id);
        if let Some(enquiry_id) = &entry.enquiry_id {
            let _ = writeln!(block, "Enquiry ID: {enquiry_id}");
        }
        if let Some(enquiry_result_id) = &entry.enquiry_result_id {
            let _ = writeln!(block, "Enquiry Result ID: {enquiry_result_id}");
        }
        let _ = writeln!(block, "Verification Status: {}", entry.status);
        for (label, value) in [
            ("Details", &entry.details),
            ("Name", &entry.name),
            ("ID Number", &entry.id_number),
            ("Email", &entry.email),
            ("ConsumerIDPhoto", &entry.id_photo),
            ("ConsumerCapturedPhoto", &entry.selfie_photo),
        ] {
            if let Some(value) = value {
                let _ = writeln!(block, "{label}: {value}");
            }
        }
        let _ = writeln!(block, "{SESSION_DELIMITER}");

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(block.as_bytes())?;
        Ok(())
    }

    /// Read and parse every session block in the log.
    ///
    /// A missing log file reads as empty.
    pub fn read_blocks(&self) -> Result<Vec<SessionBlock>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(content
            .split(SESSION_DELIMITER)
            .filter(|block| !block.trim().is_empty())
            .map(SessionBlock::parse)
            .collect())
    }

    /// Remove every block whose ID Number matches, rewriting the file.
    ///
    /// Best effort: failures are logged and reported as zero removals.
    pub fn prune_by_id_number(&self, id_number: &str) -> usize {
        match self.prune_inner(id_number) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(id_number, error = %e, "Audit log pruning failed");
                0
            }
        }
    }

    fn prune_inner(&self, id_number: &str) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let needle = format!("ID Number: {}", id_number.trim());

        let mut kept = String::new();
        let mut removed = 0;
        for block in content.split(SESSION_DELIMITER) {
            if block.trim().is_empty() {
                continue;
            }
            if block.lines().any(|line| line.trim() == needle) {
                removed += 1;
                continue;
            }
            kept.push_str(block.trim_end_matches('\n'));
            kept.push('\n');
            kept.push_str(SESSION_DELIMITER);
            kept.push('\n');
        }

        if removed > 0 {
            std::fs::write(&self.path, kept)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: &str, client_id: &str, id_number: &str) -> AuditEntry {
        AuditEntry {
            timestamp: timestamp.to_string(),
            client_id: client_id.to_string(),
            enquiry_id: Some("152".to_string()),
            enquiry_result_id: Some("8871".to_string()),
            status: "Success".to_string(),
            details: Some("Verification for Thandi Mokoena - Success".to_string()),
            name: Some("Thandi Mokoena".to_string()),
            id_number: Some(id_number.to_string()),
            email: Some("thandi@example.com".to_string()),
            id_photo: Some("uploads/ids/id_152.jpg".to_string()),
            selfie_photo: None,
        }
    }

    #[test]
    fn test_append_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.txt"));
        log.append(&entry("2024-03-01 10:00:00", "152", "9001015800087"))
            .unwrap();
        log.append(&entry("2024-03-02 11:30:00", "153", "8505055123081"))
            .unwrap();

        let blocks = log.read_blocks().unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_complete());
        assert_eq!(blocks[0].timestamp.as_deref(), Some("2024-03-01 10:00:00"));
        assert_eq!(blocks[0].client_id.as_deref(), Some("152"));
        assert_eq!(blocks[0].status.as_deref(), Some("Success"));
        assert_eq!(blocks[0].id_number.as_deref(), Some("9001015800087"));
        assert_eq!(
            blocks[0].id_photo.as_deref(),
            Some("uploads/ids/id_152.jpg")
        );
        assert_eq!(blocks[0].selfie_photo, None);
    }

    #[test]
    fn test_parse_ignores_unknown_lines() {
        let block = "\
Timestamp: 2024-01-05 09:15:00
ClientID: 99
Some unrelated line
Verification Status: Failed
";
        let session = SessionBlock::parse(block);
        assert!(session.is_complete());
        assert_eq!(session.status.as_deref(), Some("Failed"));
        assert_eq!(session.name, None);
    }

    #[test]
    fn test_incomplete_block_detected() {
        let session = SessionBlock::parse("Verification Status: Failed\n");
        assert!(!session.is_complete());
    }

    #[test]
    fn test_prune_removes_matching_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.txt"));
        log.append(&entry("2024-03-01 10:00:00", "152", "9001015800087"))
            .unwrap();
        log.append(&entry("2024-03-02 11:30:00", "153", "8505055123081"))
            .unwrap();
        log.append(&entry("2024-03-03 12:00:00", "154", "9001015800087"))
            .unwrap();

        let removed = log.prune_by_id_number("9001015800087");
        assert_eq!(removed, 2);

        let blocks = log.read_blocks().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].client_id.as_deref(), Some("153"));
    }

    #[test]
    fn test_prune_missing_file_returns_zero() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("absent.txt"));
        assert_eq!(log.prune_by_id_number("123"), 0);
    }

    #[test]
    fn test_read_blocks_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("absent.txt"));
        assert!(log.read_blocks().unwrap().is_empty());
    }
}
