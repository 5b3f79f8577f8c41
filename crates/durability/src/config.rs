//! Snapshot configuration.
//!
//! This module provides configuration for chunked snapshot export.

/// Default soft ceiling on the size of one chunk file (100 MB).
pub const DEFAULT_FILE_SIZE_LIMIT: u64 = 100_000_000;

/// Smallest chunk size accepted by [`SnapshotConfig::validate`].
pub const MIN_FILE_SIZE_LIMIT: u64 = 1024;

/// Snapshot export parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Soft ceiling on bytes per chunk file (default: 100,000,000).
    ///
    /// Checked after each write, so a file may exceed it by at most one
    /// frame. A frame is never split across files.
    pub file_size_limit: u64,

    /// fsync every chunk file before closing it (default: true).
    pub sync_on_rotate: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            file_size_limit: DEFAULT_FILE_SIZE_LIMIT,
            sync_on_rotate: true,
        }
    }
}

impl SnapshotConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk file size limit (builder pattern).
    pub fn with_file_size_limit(mut self, limit: u64) -> Self {
        self.file_size_limit = limit;
        self
    }

    /// Enable or disable fsync on close (builder pattern).
    pub fn with_sync_on_rotate(mut self, sync: bool) -> Self {
        self.sync_on_rotate = sync;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_size_limit < MIN_FILE_SIZE_LIMIT {
            return Err(ConfigError::FileSizeLimitTooSmall {
                limit: self.file_size_limit,
            });
        }
        Ok(())
    }

    /// Create a configuration for tests (small chunks, no fsync).
    pub fn for_testing() -> Self {
        SnapshotConfig {
            file_size_limit: 4 * 1024,
            sync_on_rotate: false,
        }
    }
}

/// Snapshot configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// File size limit is below [`MIN_FILE_SIZE_LIMIT`].
    #[error("file size limit {limit} is below the 1KB minimum")]
    FileSizeLimitTooSmall {
        /// Configured limit
        limit: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SnapshotConfig::default();
        assert_eq!(config.file_size_limit, 100_000_000);
        assert!(config.sync_on_rotate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = SnapshotConfig::new()
            .with_file_size_limit(8 * 1024)
            .with_sync_on_rotate(false);

        assert_eq!(config.file_size_limit, 8 * 1024);
        assert!(!config.sync_on_rotate);
    }

    #[test]
    fn test_validation_limit_too_small() {
        let config = SnapshotConfig::new().with_file_size_limit(512);
        assert_eq!(
            config.validate(),
            Err(ConfigError::FileSizeLimitTooSmall { limit: 512 })
        );
    }

    #[test]
    fn test_testing_config_is_valid() {
        assert!(SnapshotConfig::for_testing().validate().is_ok());
    }
}
