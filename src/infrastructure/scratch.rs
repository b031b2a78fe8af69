//! Scratch storage - infrastructure layer
//!
//! Owns the staging directory for uploaded documents and exposes one
//! capability: writing bytes under a collision-free name. The returned
//! guard deletes its file when discarded or dropped. Nothing in here
//! knows about papers or requests.

use std::path::{Path, PathBuf};

use chrono::Utc;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, ScratchError};

/// Scratch storage
pub struct ScratchStore {
    dir: PathBuf,
}

impl ScratchStore {
    /// Creates a store over the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes bytes under a timestamped, sanitized file name.
    ///
    /// # Returns
    /// A guard owning the staged path. The file disappears when the
    /// guard is discarded or dropped.
    pub async fn stage(&self, original_name: &str, bytes: &[u8]) -> AppResult<StagedFile> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ScratchError::CreateDirFailed {
                path: self.dir.display().to_string(),
                source: e,
            })?;

        let staged_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        let path = self.dir.join(staged_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::stage_write_failed(path.display().to_string(), e))?;

        debug!("staged {} bytes at {}", bytes.len(), path.display());

        Ok(StagedFile {
            path,
            removed: false,
        })
    }
}

/// Guard over one staged file.
///
/// The pipeline holds it while the file is in use, then calls
/// `discard`. Dropping an undiscarded guard deletes the file as a
/// fallback. Either way the deletion is attempted exactly once and a
/// deletion failure is logged, never escalated.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    removed: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the staged file.
    pub async fn discard(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!(
                "failed to clean up staged file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                "failed to clean up staged file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Staged name for an upload: every character outside `[a-zA-Z0-9.-]`
/// becomes an underscore.
fn sanitize_file_name(name: &str) -> String {
    if let Ok(re) = Regex::new(r"[^a-zA-Z0-9.-]") {
        re.replace_all(name, "_").to_string()
    } else {
        name.to_string()
    }
}
