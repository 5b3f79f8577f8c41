//! Durability layer for IBC state snapshots
//!
//! This crate handles everything that touches disk:
//!
//! - Chunked framing: length-prefixed records split across size-bounded files
//! - Legacy format: ordered sections over chunked files, with cancellation
//! - Envelope format: self-describing single file written crash-safely
//! - Snapshot configuration and error types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel; // Cooperative cancellation token
pub mod chunked; // Chunked file writer and reader
pub mod config; // SnapshotConfig, ConfigError
pub mod error; // SnapshotError, SnapshotResult
pub mod format; // Legacy sections and genesis envelope

// === Re-exports ===
pub use cancel::CancellationToken;
pub use chunked::{chunk_path, ChunkedFileInfo, ChunkedFileReader, ChunkedFileWriter};
pub use config::{ConfigError, SnapshotConfig, DEFAULT_FILE_SIZE_LIMIT};
pub use error::{SnapshotError, SnapshotResult};
pub use format::{
    genesis_file_name, genesis_path, read_envelope, write_envelope, SectionReader, SectionWriter,
};
