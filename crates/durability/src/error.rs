//! Snapshot error types
//!
//! Every failure during export or import surfaces as a [`SnapshotError`].
//! I/O errors are propagated unchanged; record store and codec failures from
//! `ibc-snapshot-core` are wrapped with the context they occurred in.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for snapshot operations
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Snapshot export/import errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// File create/open/read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be marshalled or unmarshalled
    #[error("cannot encode {record}: {detail}")]
    Encoding {
        /// Record or section being encoded
        record: String,
        /// Codec error message
        detail: String,
    },

    /// Export was cancelled before the record at `index` of `section`
    #[error("cancelled before record {index} of section {section}")]
    Cancelled {
        /// Section being written
        section: String,
        /// Number of records of the section already written
        index: u64,
    },

    /// The snapshot would install state the importing chain forbids
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Snapshot file is undecodable, truncated or has trailing data
    #[error("corrupt snapshot {}: {detail}", path.display())]
    CorruptSnapshot {
        /// File or chunk base path
        path: PathBuf,
        /// What was wrong
        detail: String,
    },

    /// Snapshot contents failed structural validation
    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    /// The record store reported an error
    #[error("record store error: {0}")]
    Store(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A frame does not fit the 4-byte length prefix
    #[error("frame of {len} bytes exceeds the maximum frame length")]
    FrameTooLarge {
        /// Payload length
        len: usize,
    },
}

impl SnapshotError {
    /// Build an `Encoding` error for `record`
    pub fn encoding(record: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SnapshotError::Encoding {
            record: record.into(),
            detail: err.to_string(),
        }
    }

    /// Build a `CorruptSnapshot` error for `path`
    pub fn corrupt(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        SnapshotError::CorruptSnapshot {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// True for data problems that retrying will not fix
    ///
    /// Cancellation and I/O failures are not fatal: the same snapshot may
    /// succeed on a later attempt.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SnapshotError::Io(_) | SnapshotError::Cancelled { .. })
    }
}

impl From<ibc_snapshot_core::Error> for SnapshotError {
    fn from(err: ibc_snapshot_core::Error) -> Self {
        match err {
            ibc_snapshot_core::Error::IoError(e) => SnapshotError::Io(e),
            other => SnapshotError::Store(other.to_string()),
        }
    }
}
