//! Photo upload storage
//!
//! Verification photos (ID document and captured selfie) are decoded from
//! the base64 payloads in a DOV result and kept on disk under the uploads
//! root. Records and audit blocks store the web-friendly relative
//! `uploads/…` path; [`normalize_path`] is the single place that shape is
//! enforced.

use std::path::{Path, PathBuf};

use base64::Engine;

use crate::infra::{BridgeError, Result};

/// Normalize a stored photo path to the relative `uploads/…` form.
///
/// Backslashes become forward slashes, a leading slash is stripped, and any
/// path not already under `uploads/` is reduced to `uploads/<basename>`.
/// Normalizing twice yields the same result.
pub fn normalize_path(path: &str) -> Option<String> {
    let p = path.replace('\\', "/");
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    let p = p.trim_start_matches('/');
    if p.starts_with("uploads/") {
        return Some(p.to_string());
    }
    let basename = p.rsplit('/').next().unwrap_or(p);
    Some(format!("uploads/{basename}"))
}

/// Filesystem store for uploaded verification photos
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at the given uploads directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The uploads root directory on disk
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the uploads root if it does not exist yet
    pub fn ensure_layout(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Decode a base64 photo payload and write it under the uploads root.
    ///
    /// `relative` may contain subdirectories (e.g. `ids/id_123.jpg`), which
    /// are created as needed. Returns the normalized stored path.
    pub fn save_base64(&self, data: &str, relative: &str) -> Result<String> {
        if data.is_empty() {
            return Err(BridgeError::Internal("empty photo payload".to_string()));
        }
        let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytes)?;
        Ok(format!("uploads/{}", relative.replace('\\', "/")))
    }

    /// Resolve a stored `uploads/…` path to an absolute path on disk.
    ///
    /// Returns `None` when the path is empty or the file does not exist.
    pub fn resolve(&self, stored: &str) -> Option<PathBuf> {
        let normalized = normalize_path(stored)?;
        let relative = normalized.strip_prefix("uploads/")?;
        let full = self.root.join(relative);
        if full.exists() {
            return Some(full);
        }
        // Legacy rows sometimes hold a bare filename for a photo that was
        // saved under a subdirectory; fall back to a basename lookup there.
        let basename = relative.rsplit('/').next()?;
        for subdir in ["ids", "selfies"] {
            let candidate = self.root.join(subdir).join(basename);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }

    /// Delete the file behind a stored path, best effort.
    pub fn remove(&self, stored: &str) {
        let Some(full) = self.resolve(stored) else {
            return;
        };
        match std::fs::remove_file(&full) {
            Ok(()) => tracing::debug!(path = %full.display(), "Removed upload"),
            Err(e) => {
                tracing::warn!(path = %full.display(), error = %e, "Failed to remove upload")
            }
        }
    }
}
