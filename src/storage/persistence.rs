//! Collection files on disk.
//!
//! Each collection is one JSON array file at `<root>/<database>/<Name>.json`.
//! Loads and saves always cover the whole file; saves go through a sibling
//! temp file and a rename, so readers never observe a half-written file.
//! File operations that fail transiently (the file is held elsewhere) are
//! retried up to the configured bound; undecodable content is fatal and
//! never retried.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;

use serde_json::Value;

use crate::config::{RetryPolicy, StoreConfig, COLLECTION_EXTENSION};
use crate::error::{StoreError, StoreResult};

/// Handle to one collection's backing file.
///
/// Carries the derived path and the retry bound. Holds no open file handle
/// and no cache; cheap to construct per operation.
#[derive(Debug, Clone)]
pub struct CollectionFile {
    path: PathBuf,
    retry: RetryPolicy,
}

impl CollectionFile {
    /// Resolve the backing file for a collection name under this configuration.
    pub fn new(config: &StoreConfig, name: &str) -> Self {
        let path = config
            .database_dir()
            .join(format!("{}.{}", name, COLLECTION_EXTENSION));
        Self {
            path,
            retry: config.retry().clone(),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the backing file with an empty collection if it is absent.
    ///
    /// Safe against concurrent creation: the file is created exclusively,
    /// and a caller that finds it already present treats that as success,
    /// so the final state is a valid collection file either way.
    pub fn create(&self) -> StoreResult<()> {
        if self.exists() {
            return Ok(());
        }
        self.ensure_dir()?;
        let created = self.with_retry(|| {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.path)
            {
                Ok(mut file) => file.write_all(b"[]").map(|()| true),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
                Err(e) => Err(e),
            }
        })?;
        if created {
            tracing::debug!("Created empty collection file {}", self.path.display());
        }
        Ok(())
    }

    /// Load the entire collection, creating the file first if absent.
    pub fn load(&self) -> StoreResult<Vec<Value>> {
        self.create()?;
        let text = self.with_retry(|| fs::read_to_string(&self.path))?;
        let records: Vec<Value> = serde_json::from_str(&text)
            .map_err(|e| StoreError::decode(&self.path, e.to_string()))?;
        tracing::trace!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Overwrite the collection with `records`. Always a whole-file
    /// replace, never an append.
    pub fn save(&self, records: &[Value]) -> StoreResult<()> {
        self.ensure_dir()?;
        let encoded =
            serde_json::to_string(records).map_err(|e| StoreError::Encode(e.to_string()))?;
        let tmp_path = self
            .path
            .with_extension(format!("{}.tmp", COLLECTION_EXTENSION));
        self.with_retry(|| {
            fs::write(&tmp_path, encoded.as_bytes())?;
            fs::rename(&tmp_path, &self.path)
        })?;
        tracing::debug!(
            "Saved {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        Ok(())
    }

    /// Run a file operation, retrying transient failures up to the bound.
    fn with_retry<T>(&self, mut op: impl FnMut() -> io::Result<T>) -> StoreResult<T> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if is_transient(&e) => {
                    if attempt >= attempts {
                        return Err(StoreError::Unavailable {
                            path: self.path.clone(),
                            attempts: attempt,
                        });
                    }
                    tracing::debug!(
                        "Transient error on {} (attempt {}/{}): {}",
                        self.path.display(),
                        attempt,
                        attempts,
                        e
                    );
                    thread::sleep(self.retry.backoff);
                }
                Err(e) => return Err(StoreError::io(&self.path, e)),
            }
        }
    }
}

/// Whether an I/O error is expected to clear on retry.
///
/// `PermissionDenied` is included because Windows reports a sharing
/// violation on a file held by another process as access denied.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock
            | io::ErrorKind::Interrupted
            | io::ErrorKind::TimedOut
            | io::ErrorKind::PermissionDenied
    )
}
