//! Chunked file framing
//!
//! A logical byte stream split across files `<base>0`, `<base>1`, ... with
//! no header, magic or checksum. The stream is a sequence of:
//!
//! - frames: `u32` little-endian length followed by that many bytes
//! - counts and sequences: `u64` little-endian
//! - flags: one byte, `0` or `1`
//!
//! The writer rotates to the next file once the current one exceeds the size
//! limit. A frame is never split, so concatenating the files in index order
//! reproduces the stream exactly.

pub mod reader;
pub mod writer;

use std::path::{Path, PathBuf};

pub use reader::ChunkedFileReader;
pub use writer::{ChunkedFileInfo, ChunkedFileWriter};

/// Size of a frame length prefix
pub const FRAME_LEN_SIZE: usize = 4;

/// Size of a count or sequence field
pub const COUNT_SIZE: usize = 8;

/// Path of chunk `index` for `base` (`<base><index>`)
pub fn chunk_path(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(index.to_string());
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_path_appends_index() {
        let base = Path::new("/tmp/export/client");
        assert_eq!(chunk_path(base, 0), PathBuf::from("/tmp/export/client0"));
        assert_eq!(chunk_path(base, 12), PathBuf::from("/tmp/export/client12"));
    }
}
