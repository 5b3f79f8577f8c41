//! Size-bounded chunk writer
//!
//! # Rotation
//!
//! After every write the writer compares the bytes written to the current
//! file against the limit. Once exceeded, the file is flushed, optionally
//! fsynced and closed. The next file is opened lazily on the following
//! write, so an export that ends exactly on a rotation leaves no empty file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use super::chunk_path;
use crate::config::SnapshotConfig;
use crate::error::{SnapshotError, SnapshotResult};

/// Summary of a finished chunked write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedFileInfo {
    /// Chunk files written, in index order
    pub files: Vec<PathBuf>,
    /// Total bytes written across all files
    pub bytes_written: u64,
    /// Number of length-prefixed frames written
    pub frames: u64,
}

/// Writer that splits a framed byte stream across size-bounded files
///
/// Dropping the writer without calling [`finish`](Self::finish) closes the
/// current file; buffered bytes are flushed best-effort.
pub struct ChunkedFileWriter {
    base_path: PathBuf,
    size_limit: u64,
    sync_on_rotate: bool,

    /// Open file, `None` between a rotation and the next write
    current: Option<BufWriter<File>>,
    /// Index of the open file, or of the next file to open
    file_index: u32,
    bytes_in_file: u64,

    files: Vec<PathBuf>,
    bytes_written: u64,
    frames: u64,
}

impl ChunkedFileWriter {
    /// Open `<base>0` for writing with a size limit
    ///
    /// Creates the parent directory if needed and truncates an existing
    /// first chunk. Closed chunks are fsynced.
    pub fn open(base_path: impl Into<PathBuf>, size_limit: u64) -> SnapshotResult<Self> {
        Self::open_with(base_path.into(), size_limit, true)
    }

    /// Open `<base>0` using a validated configuration
    pub fn with_config(
        base_path: impl Into<PathBuf>,
        config: &SnapshotConfig,
    ) -> SnapshotResult<Self> {
        config.validate()?;
        Self::open_with(
            base_path.into(),
            config.file_size_limit,
            config.sync_on_rotate,
        )
    }

    fn open_with(base_path: PathBuf, size_limit: u64, sync_on_rotate: bool) -> SnapshotResult<Self> {
        if let Some(parent) = base_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = ChunkedFileWriter {
            base_path,
            size_limit,
            sync_on_rotate,
            current: None,
            file_index: 0,
            bytes_in_file: 0,
            files: Vec::new(),
            bytes_written: 0,
            frames: 0,
        };
        writer.ensure_open()?;
        Ok(writer)
    }

    /// Base path the chunk indices are appended to
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Total bytes written so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Write one length-prefixed frame
    pub fn write_framed(&mut self, bytes: &[u8]) -> SnapshotResult<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| SnapshotError::FrameTooLarge { len: bytes.len() })?;
        let file = self.ensure_open()?;
        file.write_u32::<LittleEndian>(len)?;
        file.write_all(bytes)?;
        self.frames += 1;
        self.advance(4 + bytes.len() as u64)
    }

    /// Write an 8-byte section count
    pub fn write_count(&mut self, count: u64) -> SnapshotResult<()> {
        self.write_u64(count)
    }

    /// Write an 8-byte little-endian integer
    pub fn write_u64(&mut self, value: u64) -> SnapshotResult<()> {
        let file = self.ensure_open()?;
        file.write_u64::<LittleEndian>(value)?;
        self.advance(8)
    }

    /// Write a single flag byte
    pub fn write_flag(&mut self, flag: bool) -> SnapshotResult<()> {
        let file = self.ensure_open()?;
        file.write_u8(u8::from(flag))?;
        self.advance(1)
    }

    /// Write a scalar, framed when `with_length_prefix` is set
    pub fn write_scalar(&mut self, bytes: &[u8], with_length_prefix: bool) -> SnapshotResult<()> {
        if with_length_prefix {
            return self.write_framed(bytes);
        }
        let file = self.ensure_open()?;
        file.write_all(bytes)?;
        self.advance(bytes.len() as u64)
    }

    /// Close the last file and summarize the write
    ///
    /// Chunk files left over from an earlier, longer export under the same
    /// base path are removed so they cannot be read back as trailing data.
    pub fn finish(mut self) -> SnapshotResult<ChunkedFileInfo> {
        self.close_current()?;
        let removed = self.remove_stale_chunks()?;

        debug!(
            base = %self.base_path.display(),
            files = self.files.len(),
            bytes = self.bytes_written,
            frames = self.frames,
            removed,
            "Chunked write finished"
        );

        Ok(ChunkedFileInfo {
            files: std::mem::take(&mut self.files),
            bytes_written: self.bytes_written,
            frames: self.frames,
        })
    }

    fn ensure_open(&mut self) -> SnapshotResult<&mut BufWriter<File>> {
        let writer = match self.current.take() {
            Some(writer) => writer,
            None => {
                let path = chunk_path(&self.base_path, self.file_index);
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&path)?;
                debug!(path = %path.display(), index = self.file_index, "Opened chunk file");
                self.files.push(path);
                self.bytes_in_file = 0;
                BufWriter::new(file)
            }
        };
        Ok(self.current.insert(writer))
    }

    fn advance(&mut self, len: u64) -> SnapshotResult<()> {
        self.bytes_in_file += len;
        self.bytes_written += len;
        if self.bytes_in_file > self.size_limit {
            self.rotate()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> SnapshotResult<()> {
        debug!(
            base = %self.base_path.display(),
            index = self.file_index,
            bytes = self.bytes_in_file,
            limit = self.size_limit,
            "Rotating chunk file"
        );
        self.close_current()?;
        self.file_index += 1;
        Ok(())
    }

    fn close_current(&mut self) -> SnapshotResult<()> {
        if let Some(writer) = self.current.take() {
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            if self.sync_on_rotate {
                file.sync_all()?;
            }
        }
        Ok(())
    }

    fn remove_stale_chunks(&self) -> SnapshotResult<usize> {
        let mut index = self.files.len() as u32;
        let mut removed = 0;
        loop {
            let path = chunk_path(&self.base_path, index);
            if !path.is_file() {
                return Ok(removed);
            }
            fs::remove_file(&path)?;
            removed += 1;
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_first_chunk() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("nested").join("client");
        let writer = ChunkedFileWriter::open(&base, 1024).unwrap();
        assert!(chunk_path(&base, 0).is_file());
        let info = writer.finish().unwrap();
        assert_eq!(info.files, vec![chunk_path(&base, 0)]);
        assert_eq!(info.bytes_written, 0);
    }

    #[test]
    fn test_frame_layout() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("channel");
        let mut writer = ChunkedFileWriter::open(&base, 1024).unwrap();
        writer.write_count(2).unwrap();
        writer.write_framed(b"ab").unwrap();
        writer.write_flag(true).unwrap();
        writer.finish().unwrap();

        let bytes = fs::read(chunk_path(&base, 0)).unwrap();
        let mut expected = 2u64.to_le_bytes().to_vec();
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(b"ab");
        expected.push(1);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_rotation_after_exceeding_limit() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("connection");
        let mut writer = ChunkedFileWriter::open(&base, 10).unwrap();
        // 4 + 8 = 12 bytes, over the limit after the first frame
        writer.write_framed(&[1; 8]).unwrap();
        writer.write_framed(&[2; 8]).unwrap();
        let info = writer.finish().unwrap();

        assert_eq!(info.files.len(), 2);
        assert_eq!(info.frames, 2);
        assert_eq!(fs::metadata(&info.files[0]).unwrap().len(), 12);
        assert_eq!(fs::metadata(&info.files[1]).unwrap().len(), 12);
        // Rotation after the last frame does not open an empty file
        assert!(!chunk_path(&base, 2).exists());
    }

    #[test]
    fn test_frame_at_limit_does_not_rotate() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("client");
        let mut writer = ChunkedFileWriter::open(&base, 12).unwrap();
        writer.write_framed(&[1; 8]).unwrap();
        writer.write_framed(&[2; 8]).unwrap();
        let info = writer.finish().unwrap();
        assert_eq!(info.files.len(), 1);
        assert_eq!(fs::metadata(&info.files[0]).unwrap().len(), 24);
    }

    #[test]
    fn test_finish_removes_stale_chunks() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("client");
        fs::write(chunk_path(&base, 1), b"old").unwrap();
        fs::write(chunk_path(&base, 2), b"old").unwrap();

        let mut writer = ChunkedFileWriter::open(&base, 1024).unwrap();
        writer.write_u64(5).unwrap();
        writer.finish().unwrap();

        assert!(chunk_path(&base, 0).is_file());
        assert!(!chunk_path(&base, 1).exists());
        assert!(!chunk_path(&base, 2).exists());
    }

    #[test]
    fn test_with_config_validates() {
        let dir = tempdir().unwrap();
        let config = SnapshotConfig::new().with_file_size_limit(10);
        let result = ChunkedFileWriter::with_config(dir.path().join("client"), &config);
        assert!(matches!(result, Err(SnapshotError::Config(_))));
    }
}
