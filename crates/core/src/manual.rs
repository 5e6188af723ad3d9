use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One registered step: a catalog image and its description.
/// Unknown keys are rejected so a rewrite can never drop data it did not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Catalog file name of the scene image.
    pub image: String,
    pub text: String,
}

impl Step {
    pub fn new(image: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            text: text.into(),
        }
    }
}

/// Ordered list of steps persisted as a single JSON file.
///
/// Every mutation rewrites the whole file. The ledger holds no steps in memory;
/// callers receive the current sequence from [`load`](Self::load) or as the return
/// value of [`append`](Self::append) and keep their own working copy.
pub struct ManualLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ManualLedger {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every step. A missing file is an empty manual, not an error.
    pub fn load(&self) -> Result<Vec<Step>> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no manual file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let steps: Vec<Step> =
            serde_json::from_slice(&content).map_err(|source| Error::LedgerParse {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(steps = steps.len(), "loaded manual");
        Ok(steps)
    }

    /// Append `step` to the stored manual and return the resulting sequence.
    ///
    /// Load, push and persist happen under one lock, so appends from the same
    /// process never overwrite each other. On failure nothing is written.
    pub fn append(&self, step: Step) -> Result<Vec<Step>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut steps = self.load()?;
        steps.push(step);
        self.write(&steps)?;
        tracing::info!(steps = steps.len(), "registered step");
        Ok(steps)
    }

    /// Replace the stored manual with an empty one. Irreversible.
    pub fn reset(&self) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(&[])?;
        tracing::info!(path = %self.path.display(), "manual reset");
        Ok(())
    }

    /// Overwrite the stored manual with `steps`.
    pub fn persist(&self, steps: &[Step]) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write(steps)
    }

    /// Non-ASCII text is written literally. The file is replaced via a synced
    /// sibling temp file and rename so a failed write leaves the old content.
    /// The temp name carries the process id so two processes never share it.
    fn write(&self, steps: &[Step]) -> Result<()> {
        let content = serde_json::to_string_pretty(steps).map_err(Error::LedgerEncode)?;
        let storage_err = |source: std::io::Error| Error::StorageWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let tmp = self.tmp_path();
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(storage_err(e));
        }
        tracing::debug!(steps = steps.len(), path = %self.path.display(), "persisted manual");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path
            .with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }
}
