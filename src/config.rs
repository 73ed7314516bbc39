//! Store configuration: defaults and per-instance settings.
//!
//! All tunables live on [`StoreConfig`], built once before any operation and
//! moved into the store. Operations resolve collection paths from the
//! configuration at call time; the configuration itself is immutable once
//! the store owns it.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default identifier field name looked up on stored records.
pub const DEFAULT_ID_FIELD: &str = "Id";

/// Default number of attempts for transiently failing file operations.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 32;

/// Default pause between retry attempts, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 5;

/// File extension of collection files.
pub const COLLECTION_EXTENSION: &str = "json";

/// Retry bound for transient file-access failures.
///
/// A collection file held by a reader or writer in another process shows up
/// as a transient I/O error. The affected operation is retried up to
/// `attempts` times, sleeping `backoff` in between, before
/// [`StoreError::Unavailable`](crate::error::StoreError::Unavailable) is
/// surfaced to the caller.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub attempts: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

/// Per-store configuration: storage root, database namespace, identifier
/// field name, and retry bound.
///
/// Collection paths are derived as `<root>/<database>/<Name>.json`. Two
/// distinct record types must not share a declared name under the same
/// database; the store does not enforce this.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    root: PathBuf,
    database: String,
    id_field: String,
    retry: RetryPolicy,
}

impl StoreConfig {
    /// Configuration with the default identifier field and retry bound.
    pub fn new(root: impl Into<PathBuf>, database: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            database: database.into(),
            id_field: DEFAULT_ID_FIELD.to_owned(),
            retry: RetryPolicy::default(),
        }
    }

    /// Use a different identifier field name (case-sensitive exact match).
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    /// Use a different retry bound for transient file errors.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Base storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Database namespace name.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Identifier field name looked up on stored records.
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Retry bound for transient file errors.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Directory holding this database's collection files.
    pub fn database_dir(&self) -> PathBuf {
        self.root.join(&self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("/data", "app");
        assert_eq!(config.id_field(), DEFAULT_ID_FIELD);
        assert_eq!(config.retry().attempts, DEFAULT_RETRY_ATTEMPTS);
        assert_eq!(config.database_dir(), PathBuf::from("/data/app"));
    }

    #[test]
    fn test_builders() {
        let config = StoreConfig::new("/data", "app")
            .with_id_field("_Id")
            .with_retry(RetryPolicy {
                attempts: 3,
                backoff: Duration::from_millis(1),
            });
        assert_eq!(config.id_field(), "_Id");
        assert_eq!(config.retry().attempts, 3);
    }
}
