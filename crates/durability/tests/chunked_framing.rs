//! Chunked framing tests
//!
//! Exercises rotation against the on-disk layout and cancellation against
//! the number of frames that reach disk.

use std::cell::Cell;
use std::fs;

use ibc_snapshot_core::{BinaryCodec, BincodeCodec, Error, PacketState, Result};
use ibc_snapshot_durability::{
    chunk_path, CancellationToken, ChunkedFileReader, ChunkedFileWriter, SectionReader,
    SectionWriter, SnapshotError,
};
use proptest::prelude::*;
use tempfile::TempDir;

/// Codec that cancels a token when asked to encode record `cancel_at`
struct CancellingCodec {
    inner: BincodeCodec<PacketState>,
    token: CancellationToken,
    cancel_at: usize,
    encoded: Cell<usize>,
}

impl BinaryCodec<PacketState> for CancellingCodec {
    fn encode(&self, record: &PacketState) -> Result<Vec<u8>> {
        let n = self.encoded.get();
        self.encoded.set(n + 1);
        if n + 1 == self.cancel_at {
            self.token.cancel();
        }
        self.inner.encode(record)
    }

    fn decode(&self, bytes: &[u8]) -> Result<PacketState> {
        self.inner.decode(bytes)
    }

    fn codec_id(&self) -> &str {
        "cancelling"
    }
}

/// Codec whose encoder always fails
struct FailingCodec;

impl BinaryCodec<PacketState> for FailingCodec {
    fn encode(&self, _record: &PacketState) -> Result<Vec<u8>> {
        Err(Error::SerializationError("unsupported".into()))
    }

    fn decode(&self, _bytes: &[u8]) -> Result<PacketState> {
        Err(Error::Corruption("unsupported".into()))
    }

    fn codec_id(&self) -> &str {
        "failing"
    }
}

fn packets(n: usize) -> Vec<PacketState> {
    (0..n)
        .map(|i| PacketState::new("transfer", "channel-0", i as u64 + 1, vec![i as u8; 16]))
        .collect()
}

fn frames_on_disk(base: &std::path::Path) -> u64 {
    let mut reader = ChunkedFileReader::open(base).unwrap();
    let count = reader.read_count().unwrap();
    let mut frames = 0;
    while !reader.is_at_end() {
        reader.read_framed().unwrap();
        frames += 1;
    }
    assert!(frames <= count);
    frames
}

#[test]
fn test_cancellation_stops_after_k_frames() {
    for k in 1..=5usize {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("channel");
        let token = CancellationToken::new();
        let codec = CancellingCodec {
            inner: BincodeCodec::new(),
            token: token.clone(),
            cancel_at: k,
            encoded: Cell::new(0),
        };

        let mut writer =
            SectionWriter::new(ChunkedFileWriter::open(&base, 64).unwrap(), token.clone());
        let err = writer
            .write_section("commitments", &packets(10), &codec)
            .unwrap_err();
        drop(writer);

        // Token flips while encoding record k-1; record k is never encoded
        match err {
            SnapshotError::Cancelled { section, index } => {
                assert_eq!(section, "commitments");
                assert_eq!(index, k as u64);
            }
            other => panic!("expected Cancelled, got {other:?}"),
        }
        assert_eq!(codec.encoded.get(), k);
        assert_eq!(frames_on_disk(&base), k as u64);
    }
}

#[test]
fn test_encode_failure_names_record() {
    let dir = TempDir::new().unwrap();
    let mut writer = SectionWriter::new(
        ChunkedFileWriter::open(dir.path().join("channel"), 1024).unwrap(),
        CancellationToken::new(),
    );
    let err = writer
        .write_section("receipts", &packets(1), &FailingCodec)
        .unwrap_err();
    match err {
        SnapshotError::Encoding { record, .. } => assert_eq!(record, "receipts[0]"),
        other => panic!("expected Encoding, got {other:?}"),
    }
}

#[test]
fn test_stale_chunk_reported_as_trailing_data() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("connection");
    let records = packets(3);

    let mut writer = SectionWriter::new(
        ChunkedFileWriter::open(&base, 1024).unwrap(),
        CancellationToken::new(),
    );
    writer
        .write_section("acks", &records, &BincodeCodec::new())
        .unwrap();
    let info = writer.finish().unwrap();
    assert_eq!(info.files.len(), 1);

    // A chunk left behind by an interrupted, larger export
    fs::write(chunk_path(&base, 1), [0u8; 12]).unwrap();

    let mut reader = SectionReader::open(&base).unwrap();
    let read: Vec<PacketState> = reader.read_section("acks", &BincodeCodec::new()).unwrap();
    assert_eq!(read, records);
    assert!(matches!(
        reader.finish(),
        Err(SnapshotError::CorruptSnapshot { .. })
    ));
}

#[test]
fn test_gap_in_chunk_run_ends_stream() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("client");
    let mut writer = ChunkedFileWriter::open(&base, 4).unwrap();
    writer.write_u64(1).unwrap();
    writer.write_u64(2).unwrap();
    writer.finish().unwrap();
    fs::write(chunk_path(&base, 3), [9u8; 8]).unwrap();

    let reader = ChunkedFileReader::open(&base).unwrap();
    assert_eq!(reader.files().len(), 2);
    assert_eq!(reader.remaining(), 16);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn rotation_bounds_files_and_preserves_order(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 0..40),
        limit in 16u64..512,
    ) {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("client");
        let max_frame = payloads.iter().map(|p| p.len() as u64 + 4).max().unwrap_or(0);

        let mut writer = ChunkedFileWriter::open(&base, limit).unwrap();
        writer.write_count(payloads.len() as u64).unwrap();
        for payload in &payloads {
            writer.write_framed(payload).unwrap();
        }
        let info = writer.finish().unwrap();
        prop_assert_eq!(info.frames, payloads.len() as u64);

        let mut total = 0;
        for file in &info.files {
            let len = fs::metadata(file).unwrap().len();
            prop_assert!(len <= limit + max_frame.max(8));
            total += len;
        }
        prop_assert_eq!(total, info.bytes_written);

        let mut reader = ChunkedFileReader::open(&base).unwrap();
        prop_assert_eq!(reader.read_count().unwrap(), payloads.len() as u64);
        for payload in &payloads {
            prop_assert_eq!(&reader.read_framed().unwrap(), payload);
        }
        prop_assert!(reader.expect_end().is_ok());
    }
}
