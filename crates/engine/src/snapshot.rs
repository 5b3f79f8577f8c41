//! Per-subsystem snapshot export and import
//!
//! Two on-disk formats are supported for every [`Subsystem`]:
//!
//! - **Legacy**: ordered sections over size-bounded chunk files
//!   `<dir>/<subsystem>0`, `<dir>/<subsystem>1`, ...
//! - **Envelope**: the whole genesis state in `<dir>/genesis_<subsystem>.bin`
//!
//! Both go through the same validation and replay on import, so the
//! allowlist and metadata-before-state rules hold whichever format is used.
//!
//! Export reads the subsystem's whole genesis state from the store before
//! the first chunk is opened, so peak memory is one subsystem's state.
//! The cancellation token is checked before that read and then before
//! every record written; store reads themselves are not interruptible.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use ibc_snapshot_durability::{
    read_envelope, write_envelope, CancellationToken, ChunkedFileInfo, ChunkedFileWriter,
    SectionReader, SectionWriter, SnapshotConfig, SnapshotError, SnapshotResult,
};
use tracing::info;

use crate::genesis::Subsystem;

/// Base path of a subsystem's legacy chunk files under `dir`
pub fn legacy_base_path<S: Subsystem>(dir: &Path) -> PathBuf {
    dir.join(S::NAME)
}

/// Writes snapshots of one subsystem
pub struct SnapshotExporter<S: Subsystem> {
    config: SnapshotConfig,
    cancel: CancellationToken,
    _subsystem: PhantomData<fn() -> S>,
}

impl<S: Subsystem> SnapshotExporter<S> {
    /// Create an exporter
    pub fn new(config: SnapshotConfig, cancel: CancellationToken) -> Self {
        SnapshotExporter {
            config,
            cancel,
            _subsystem: PhantomData,
        }
    }

    /// Export `store` in the legacy chunked format under `dir`
    ///
    /// Fails with [`SnapshotError::Cancelled`] if the token is cancelled
    /// mid-export; chunk files written so far are left in place.
    pub fn export_to(&self, store: &S::Store, dir: &Path) -> SnapshotResult<ChunkedFileInfo> {
        self.config.validate()?;
        self.check_cancelled()?;
        let genesis = S::export_genesis(store)?;

        let writer = ChunkedFileWriter::with_config(legacy_base_path::<S>(dir), &self.config)?;
        let mut sections = SectionWriter::new(writer, self.cancel.clone());
        S::write_sections(&genesis, &mut sections)?;
        let info = sections.finish()?;

        info!(
            subsystem = S::NAME,
            dir = %dir.display(),
            files = info.files.len(),
            bytes = info.bytes_written,
            records = info.frames,
            "Exported legacy snapshot"
        );
        Ok(info)
    }

    /// Export `store` as a single envelope file under `dir`
    pub fn export_genesis_to(&self, store: &S::Store, dir: &Path) -> SnapshotResult<PathBuf> {
        self.check_cancelled()?;
        let genesis = S::export_genesis(store)?;
        self.check_cancelled()?;
        write_envelope(dir, S::NAME, &genesis)
    }

    fn check_cancelled(&self) -> SnapshotResult<()> {
        if self.cancel.is_cancelled() {
            return Err(SnapshotError::Cancelled {
                section: S::NAME.to_string(),
                index: 0,
            });
        }
        Ok(())
    }
}

impl<S: Subsystem> fmt::Debug for SnapshotExporter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotExporter")
            .field("subsystem", &S::NAME)
            .field("config", &self.config)
            .finish()
    }
}

/// Reads snapshots of one subsystem and replays them into a store
pub struct SnapshotImporter<S: Subsystem> {
    _subsystem: PhantomData<fn() -> S>,
}

impl<S: Subsystem> Default for SnapshotImporter<S> {
    fn default() -> Self {
        SnapshotImporter {
            _subsystem: PhantomData,
        }
    }
}

impl<S: Subsystem> SnapshotImporter<S> {
    /// Create an importer
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the legacy chunk files under `dir`
    ///
    /// Trailing bytes after the last section are `CorruptSnapshot`.
    pub fn read_legacy(&self, dir: &Path) -> SnapshotResult<S::Genesis> {
        let mut reader = SectionReader::open(legacy_base_path::<S>(dir))?;
        let genesis = S::read_sections(&mut reader)?;
        reader.finish()?;
        Ok(genesis)
    }

    /// Decode the envelope file under `dir`
    pub fn read_genesis(&self, dir: &Path) -> SnapshotResult<S::Genesis> {
        read_envelope(dir, S::NAME)
    }

    /// Import the legacy chunk files under `dir` into `store`
    pub fn import_legacy_from(&self, store: &S::Store, dir: &Path) -> SnapshotResult<()> {
        let genesis = self.read_legacy(dir)?;
        S::init_genesis(store, &genesis)?;
        info!(subsystem = S::NAME, dir = %dir.display(), "Imported legacy snapshot");
        Ok(())
    }

    /// Import the envelope file under `dir` into `store`
    ///
    /// Nothing is written to `store` unless the whole envelope decodes and
    /// validates.
    pub fn init_genesis_from(&self, store: &S::Store, dir: &Path) -> SnapshotResult<()> {
        let genesis = self.read_genesis(dir)?;
        S::init_genesis(store, &genesis)?;
        info!(subsystem = S::NAME, dir = %dir.display(), "Imported genesis envelope");
        Ok(())
    }
}

impl<S: Subsystem> fmt::Debug for SnapshotImporter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotImporter")
            .field("subsystem", &S::NAME)
            .finish()
    }
}
