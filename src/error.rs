//! Error taxonomy for store operations.
//!
//! Missing identifiers and absent update/delete targets are absorbed as
//! silent no-ops and never appear here. Everything that does reach the
//! caller is a genuine failure of the operation: a non-transient I/O error,
//! undecodable collection content, an exhausted retry bound, or an
//! identifier collision observed on read.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Non-transient I/O failure on a collection file or directory.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Collection file content is not a valid encoded collection.
    ///
    /// Fatal for the operation; never retried.
    #[error("invalid collection data at {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// A record could not be encoded to JSON.
    #[error("failed to encode record: {0}")]
    Encode(String),

    /// More than one record in a collection shares an identifier.
    ///
    /// Reported rather than resolved to an arbitrary match.
    #[error("ambiguous id {id:?} in collection {collection:?}: {count} records share it")]
    AmbiguousId {
        collection: String,
        id: String,
        count: usize,
    },

    /// Transient-access retries exhausted; the file stayed busy throughout.
    #[error("collection file {path} still unavailable after {attempts} attempts")]
    Unavailable { path: PathBuf, attempts: u32 },
}

impl StoreError {
    /// I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Decode error with path context.
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
