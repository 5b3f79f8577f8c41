//! Snapshot file formats
//!
//! - `legacy`: raw multi-section stream over chunked files (`<subsystem><index>`)
//! - `envelope`: self-describing single file (`genesis_<subsystem>.bin`)

pub mod envelope;
pub mod legacy;

pub use envelope::{genesis_file_name, genesis_path, read_envelope, write_envelope};
pub use legacy::{SectionReader, SectionWriter};
