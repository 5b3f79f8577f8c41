//! Self-describing single-file format
//!
//! # File Layout
//!
//! ```text
//! genesis_<subsystem>.bin
//! +----------------------+---------------------------+
//! | u32 LE payload length | JSON-encoded genesis state |
//! +----------------------+---------------------------+
//! ```
//!
//! The file is written through `.genesis_<subsystem>.bin.tmp`, fsynced and
//! renamed into place, then the directory is fsynced. A reader never sees a
//! half-written envelope at the final path.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::chunked::FRAME_LEN_SIZE;
use crate::error::{SnapshotError, SnapshotResult};

/// File name of a subsystem's envelope
pub fn genesis_file_name(subsystem: &str) -> String {
    format!("genesis_{subsystem}.bin")
}

/// Path of a subsystem's envelope under `dir`
pub fn genesis_path(dir: &Path, subsystem: &str) -> PathBuf {
    dir.join(genesis_file_name(subsystem))
}

fn temp_path(dir: &Path, subsystem: &str) -> PathBuf {
    dir.join(format!(".{}.tmp", genesis_file_name(subsystem)))
}

/// Write `state` as the envelope of `subsystem` under `dir`
///
/// Creates `dir` if needed. Returns the final path.
pub fn write_envelope<T: Serialize>(
    dir: &Path,
    subsystem: &str,
    state: &T,
) -> SnapshotResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let payload = serde_json::to_vec(state)
        .map_err(|e| SnapshotError::encoding(format!("{subsystem} genesis"), e))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| SnapshotError::FrameTooLarge { len: payload.len() })?;

    let final_path = genesis_path(dir, subsystem);
    let tmp_path = temp_path(dir, subsystem);

    if let Err(e) = write_and_rename(&tmp_path, &final_path, len, &payload) {
        // Best effort; the original error is what matters
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            debug!(path = %tmp_path.display(), error = %cleanup, "Temp envelope not removed");
        }
        return Err(e.into());
    }

    // Step 4: fsync the parent directory
    File::open(dir)?.sync_all()?;

    info!(
        path = %final_path.display(),
        bytes = payload.len() + FRAME_LEN_SIZE,
        "Wrote genesis envelope"
    );
    Ok(final_path)
}

fn write_and_rename(tmp_path: &Path, final_path: &Path, len: u32, payload: &[u8]) -> io::Result<()> {
    // Step 1: write to the temporary file
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp_path)?;
    file.write_u32::<LittleEndian>(len)?;
    file.write_all(payload)?;

    // Step 2: fsync the file
    file.sync_all()?;
    drop(file);

    // Step 3: atomic rename
    fs::rename(tmp_path, final_path)
}

/// Read the envelope of `subsystem` under `dir`
///
/// A missing file is an I/O error. A frame whose length does not match the
/// file, or a payload that does not decode, is `CorruptSnapshot`.
pub fn read_envelope<T: DeserializeOwned>(dir: &Path, subsystem: &str) -> SnapshotResult<T> {
    let path = genesis_path(dir, subsystem);
    let bytes = fs::read(&path)?;

    if bytes.len() < FRAME_LEN_SIZE {
        return Err(SnapshotError::corrupt(
            &path,
            format!("{} bytes is shorter than the frame header", bytes.len()),
        ));
    }
    let (header, payload) = bytes.split_at(FRAME_LEN_SIZE);
    let len = LittleEndian::read_u32(header) as usize;
    if len != payload.len() {
        return Err(SnapshotError::corrupt(
            &path,
            format!("frame claims {len} bytes, file holds {}", payload.len()),
        ));
    }

    let state = serde_json::from_slice(payload)
        .map_err(|e| SnapshotError::corrupt(&path, format!("undecodable envelope: {e}")))?;
    debug!(path = %path.display(), bytes = len, "Read genesis envelope");
    Ok(state)
}
