//! Legacy multi-section format
//!
//! A snapshot is a fixed sequence of fields written through a
//! [`ChunkedFileWriter`]. Scalars (params, flags, sequence counters) are
//! written bare or length-prefixed; each section is a `u64` record count
//! followed by one frame per record. The field order is defined by the
//! caller and is part of the wire contract: readers must consume fields in
//! exactly the order they were written.

use std::path::PathBuf;

use ibc_snapshot_core::BinaryCodec;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::chunked::{ChunkedFileInfo, ChunkedFileReader, ChunkedFileWriter};
use crate::error::{SnapshotError, SnapshotResult};

/// Writes snapshot fields with cooperative cancellation
pub struct SectionWriter {
    writer: ChunkedFileWriter,
    cancel: CancellationToken,
}

impl SectionWriter {
    /// Wrap a chunk writer
    pub fn new(writer: ChunkedFileWriter, cancel: CancellationToken) -> Self {
        SectionWriter { writer, cancel }
    }

    /// Write a length-prefixed parameter record
    pub fn write_params<P, C>(&mut self, name: &str, params: &P, codec: &C) -> SnapshotResult<()>
    where
        C: BinaryCodec<P> + ?Sized,
    {
        let bytes = codec
            .encode(params)
            .map_err(|e| SnapshotError::encoding(name, e))?;
        self.writer.write_scalar(&bytes, true)
    }

    /// Write a flag byte
    pub fn write_flag(&mut self, flag: bool) -> SnapshotResult<()> {
        self.writer.write_flag(flag)
    }

    /// Write a sequence counter
    pub fn write_sequence(&mut self, sequence: u64) -> SnapshotResult<()> {
        self.writer.write_u64(sequence)
    }

    /// Write a counted section of records
    ///
    /// Cancellation is checked before each record. If it is observed before
    /// record `k`, exactly `k` records of this section have been written and
    /// the call fails with [`SnapshotError::Cancelled`].
    pub fn write_section<T, C>(&mut self, name: &str, records: &[T], codec: &C) -> SnapshotResult<u64>
    where
        C: BinaryCodec<T> + ?Sized,
    {
        self.writer.write_count(records.len() as u64)?;
        for (index, record) in records.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(section = name, index, "Snapshot export cancelled");
                return Err(SnapshotError::Cancelled {
                    section: name.to_string(),
                    index: index as u64,
                });
            }
            let bytes = codec
                .encode(record)
                .map_err(|e| SnapshotError::encoding(format!("{name}[{index}]"), e))?;
            self.writer.write_framed(&bytes)?;
        }
        debug!(section = name, records = records.len(), "Wrote section");
        Ok(records.len() as u64)
    }

    /// Close the chunk writer
    pub fn finish(self) -> SnapshotResult<ChunkedFileInfo> {
        self.writer.finish()
    }
}

/// Reads snapshot fields in write order
pub struct SectionReader {
    reader: ChunkedFileReader,
}

impl SectionReader {
    /// Wrap a chunk reader
    pub fn new(reader: ChunkedFileReader) -> Self {
        SectionReader { reader }
    }

    /// Open the chunk run at `base_path`
    pub fn open(base_path: impl Into<PathBuf>) -> SnapshotResult<Self> {
        Ok(Self::new(ChunkedFileReader::open(base_path)?))
    }

    /// Read a length-prefixed parameter record
    pub fn read_params<P, C>(&mut self, name: &str, codec: &C) -> SnapshotResult<P>
    where
        C: BinaryCodec<P> + ?Sized,
    {
        let bytes = self.reader.read_framed()?;
        codec
            .decode(&bytes)
            .map_err(|e| self.reader.corrupt(format!("{name}: {e}")))
    }

    /// Read a flag byte
    pub fn read_flag(&mut self) -> SnapshotResult<bool> {
        self.reader.read_flag()
    }

    /// Read a sequence counter
    pub fn read_sequence(&mut self) -> SnapshotResult<u64> {
        self.reader.read_u64()
    }

    /// Read a counted section of records
    pub fn read_section<T, C>(&mut self, name: &str, codec: &C) -> SnapshotResult<Vec<T>>
    where
        C: BinaryCodec<T> + ?Sized,
    {
        let count = self.reader.read_count()?;
        let mut records = Vec::with_capacity(count.min(1024) as usize);
        for index in 0..count {
            let bytes = self.reader.read_framed()?;
            let record = codec
                .decode(&bytes)
                .map_err(|e| self.reader.corrupt(format!("{name}[{index}]: {e}")))?;
            records.push(record);
        }
        debug!(section = name, records = records.len(), "Read section");
        Ok(records)
    }

    /// Verify the whole stream was consumed
    pub fn finish(self) -> SnapshotResult<()> {
        self.reader.expect_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_snapshot_core::{BincodeCodec, ClientParams, PacketSequence};
    use tempfile::tempdir;

    fn sequences(n: u64) -> Vec<PacketSequence> {
        (0..n)
            .map(|i| PacketSequence::new("transfer", format!("channel-{i}"), i + 1))
            .collect()
    }

    #[test]
    fn test_fields_read_back_in_order() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("client");
        let params = ClientParams::new(["07-tendermint"]);
        let records = sequences(3);

        let mut writer = SectionWriter::new(
            ChunkedFileWriter::open(&base, 1024).unwrap(),
            CancellationToken::new(),
        );
        writer
            .write_params("params", &params, &BincodeCodec::new())
            .unwrap();
        writer.write_flag(false).unwrap();
        writer.write_sequence(42).unwrap();
        assert_eq!(
            writer
                .write_section("sequences", &records, &BincodeCodec::new())
                .unwrap(),
            3
        );
        writer.finish().unwrap();

        let mut reader = SectionReader::open(&base).unwrap();
        let read_params: ClientParams = reader.read_params("params", &BincodeCodec::new()).unwrap();
        assert_eq!(read_params, params);
        assert!(!reader.read_flag().unwrap());
        assert_eq!(reader.read_sequence().unwrap(), 42);
        let read: Vec<PacketSequence> = reader
            .read_section("sequences", &BincodeCodec::new())
            .unwrap();
        assert_eq!(read, records);
        reader.finish().unwrap();
    }

    #[test]
    fn test_cancelled_before_first_record() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("channel");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut writer =
            SectionWriter::new(ChunkedFileWriter::open(&base, 1024).unwrap(), cancel);
        let err = writer
            .write_section("sequences", &sequences(2), &BincodeCodec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Cancelled { ref section, index: 0 } if section == "sequences"
        ));
    }

    #[test]
    fn test_empty_section() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("connection");
        let mut writer = SectionWriter::new(
            ChunkedFileWriter::open(&base, 1024).unwrap(),
            CancellationToken::new(),
        );
        writer
            .write_section::<PacketSequence, _>("sequences", &[], &BincodeCodec::new())
            .unwrap();
        let info = writer.finish().unwrap();
        assert_eq!(info.bytes_written, 8);
        assert_eq!(info.frames, 0);

        let mut reader = SectionReader::open(&base).unwrap();
        let read: Vec<PacketSequence> = reader
            .read_section("sequences", &BincodeCodec::new())
            .unwrap();
        assert!(read.is_empty());
        reader.finish().unwrap();
    }

    #[test]
    fn test_undecodable_record_is_corrupt() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("client");
        let mut writer = ChunkedFileWriter::open(&base, 1024).unwrap();
        writer.write_count(1).unwrap();
        writer.write_framed(&[0xff]).unwrap();
        writer.finish().unwrap();

        let mut reader = SectionReader::open(&base).unwrap();
        let result: SnapshotResult<Vec<PacketSequence>> =
            reader.read_section("sequences", &BincodeCodec::new());
        assert!(matches!(result, Err(SnapshotError::CorruptSnapshot { .. })));
    }
}
