//! Error types for the record layer
//!
//! Errors raised by record stores and record codecs. We use `thiserror`
//! for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for record-layer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for record stores and codecs
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (file operations, etc.)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Stored bytes could not be interpreted
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Invalid identifier or argument
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Record store error
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl Error {
    /// True for failures to encode or decode a record
    pub fn is_encoding(&self) -> bool {
        matches!(self, Error::SerializationError(_) | Error::Corruption(_))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let err = Error::IoError(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
    }

    #[test]
    fn test_error_display_serialization() {
        let err = Error::SerializationError("invalid format".to_string());
        let msg = err.to_string();
        assert!(msg.contains("Serialization error"));
        assert!(msg.contains("invalid format"));
    }

    #[test]
    fn test_error_display_corruption() {
        let err = Error::Corruption("bad client state".to_string());
        assert!(err.to_string().contains("Data corruption"));
        assert!(err.is_encoding());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
        assert!(!err.is_encoding());
    }

    #[test]
    fn test_error_from_bincode() {
        let invalid_data = vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let result: std::result::Result<String, bincode::Error> =
            bincode::deserialize(&invalid_data);
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}
