//! Chunk reader
//!
//! Presents the contiguous run of chunk files `<base>0..<base>N` as one
//! byte stream. Sizes are taken when the reader opens, which lets frame
//! lengths be checked against the bytes actually remaining before anything
//! is allocated.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::{chunk_path, FRAME_LEN_SIZE};
use crate::error::{SnapshotError, SnapshotResult};

/// Reader over a chunked byte stream
pub struct ChunkedFileReader {
    base_path: PathBuf,
    files: Vec<PathBuf>,
    next_file: usize,
    current: Option<BufReader<File>>,
    position: u64,
    remaining: u64,
}

impl ChunkedFileReader {
    /// Open the chunk run starting at `<base>0`
    ///
    /// A missing first chunk is an I/O `NotFound` error.
    pub fn open(base_path: impl Into<PathBuf>) -> SnapshotResult<Self> {
        let base_path = base_path.into();
        let mut files = Vec::new();
        let mut total = 0u64;
        loop {
            let path = chunk_path(&base_path, files.len() as u32);
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {
                    total += meta.len();
                    files.push(path);
                }
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::NotFound => break,
                Err(e) => return Err(e.into()),
            }
        }

        if files.is_empty() {
            return Err(SnapshotError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no chunk file at {}", chunk_path(&base_path, 0).display()),
            )));
        }

        debug!(
            base = %base_path.display(),
            files = files.len(),
            bytes = total,
            "Opened chunked snapshot"
        );

        Ok(ChunkedFileReader {
            base_path,
            files,
            next_file: 0,
            current: None,
            position: 0,
            remaining: total,
        })
    }

    /// Base path the chunk indices are appended to
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Chunk files in read order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Offset into the logical stream
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes left in the logical stream
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Read one length-prefixed frame
    pub fn read_framed(&mut self) -> SnapshotResult<Vec<u8>> {
        let offset = self.position;
        let len = self
            .read_u32::<LittleEndian>()
            .map_err(|e| self.truncated("frame length", e))?;
        if u64::from(len) > self.remaining {
            return Err(self.corrupt(format!(
                "frame at offset {offset} claims {len} bytes, {} remain",
                self.remaining
            )));
        }
        let mut payload = vec![0u8; len as usize];
        self.read_exact(&mut payload)
            .map_err(|e| self.truncated("frame payload", e))?;
        Ok(payload)
    }

    /// Read an 8-byte section count
    pub fn read_count(&mut self) -> SnapshotResult<u64> {
        let count = self.read_u64()?;
        // Every record costs at least its length prefix
        if count > self.remaining / FRAME_LEN_SIZE as u64 {
            return Err(self.corrupt(format!(
                "section count {count} cannot fit in {} remaining bytes",
                self.remaining
            )));
        }
        Ok(count)
    }

    /// Read an 8-byte little-endian integer
    pub fn read_u64(&mut self) -> SnapshotResult<u64> {
        ReadBytesExt::read_u64::<LittleEndian>(self).map_err(|e| self.truncated("u64 field", e))
    }

    /// Read a single flag byte
    pub fn read_flag(&mut self) -> SnapshotResult<bool> {
        let offset = self.position;
        match self.read_u8().map_err(|e| self.truncated("flag", e))? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.corrupt(format!("invalid flag byte {other} at offset {offset}"))),
        }
    }

    /// Read a fixed-length scalar
    pub fn read_scalar(&mut self, len: usize) -> SnapshotResult<Vec<u8>> {
        if len as u64 > self.remaining {
            return Err(self.corrupt(format!(
                "scalar of {len} bytes at offset {}, {} remain",
                self.position, self.remaining
            )));
        }
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes)
            .map_err(|e| self.truncated("scalar", e))?;
        Ok(bytes)
    }

    /// True when the whole stream has been consumed
    pub fn is_at_end(&self) -> bool {
        self.remaining == 0
    }

    /// Fail with `CorruptSnapshot` if unread bytes remain
    pub fn expect_end(&self) -> SnapshotResult<()> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.corrupt(format!(
                "{} trailing bytes after offset {}",
                self.remaining, self.position
            )))
        }
    }

    /// Build a `CorruptSnapshot` error for this stream
    pub fn corrupt(&self, detail: impl Into<String>) -> SnapshotError {
        SnapshotError::corrupt(&self.base_path, detail)
    }

    fn truncated(&self, field: &str, err: io::Error) -> SnapshotError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            self.corrupt(format!("truncated {field} at offset {}", self.position))
        } else {
            SnapshotError::Io(err)
        }
    }
}

impl Read for ChunkedFileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.current.is_none() {
                let Some(path) = self.files.get(self.next_file) else {
                    return Ok(0);
                };
                let file = File::open(path)?;
                self.next_file += 1;
                self.current = Some(BufReader::new(file));
            }
            let n = match self.current.as_mut() {
                Some(reader) => reader.read(buf)?,
                None => 0,
            };
            if n == 0 {
                self.current = None;
                continue;
            }
            self.position += n as u64;
            self.remaining = self.remaining.saturating_sub(n as u64);
            return Ok(n);
        }
    }
}
