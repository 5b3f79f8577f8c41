//! Per-subsystem genesis state
//!
//! Each IBC registry (client, connection, channel) is a [`Subsystem`]: it
//! knows how to read its genesis state out of a record store, validate it,
//! replay it into a store, and lay it out as legacy sections. The exporter,
//! importer and coordinator are generic over this trait.
//!
//! # Import
//!
//! [`Subsystem::init_genesis`] is all-or-nothing for data problems: the
//! whole decoded state is validated (including the client allowlist) before
//! the first store write. A store failure during replay still leaves the
//! writes made so far in place.

pub mod channel;
pub mod client;
pub mod connection;

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use ibc_snapshot_durability::{SectionReader, SectionWriter, SnapshotError, SnapshotResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use channel::{ChannelGenesis, ChannelSubsystem};
pub use client::{ClientGenesis, ClientSubsystem};
pub use connection::{ConnectionGenesis, ConnectionSubsystem};

/// One independently snapshotted registry
pub trait Subsystem {
    /// File name stem (`<NAME><index>`, `genesis_<NAME>.bin`)
    const NAME: &'static str;

    /// Record store capability this subsystem reads and writes
    type Store: ?Sized;

    /// Genesis state of this subsystem
    type Genesis: Serialize + DeserializeOwned + Clone + Default + PartialEq + Debug;

    /// Read the full genesis state from `store`
    fn export_genesis(store: &Self::Store) -> SnapshotResult<Self::Genesis>;

    /// Check `genesis` before any of it is written
    fn validate(genesis: &Self::Genesis) -> SnapshotResult<()>;

    /// Write `genesis` into `store` in dependency order
    fn replay(store: &Self::Store, genesis: &Self::Genesis) -> SnapshotResult<()>;

    /// Lay out `genesis` as legacy sections
    fn write_sections(genesis: &Self::Genesis, writer: &mut SectionWriter) -> SnapshotResult<()>;

    /// Parse legacy sections written by [`write_sections`](Self::write_sections)
    fn read_sections(reader: &mut SectionReader) -> SnapshotResult<Self::Genesis>;

    /// Validate, then replay `genesis` into `store`
    fn init_genesis(store: &Self::Store, genesis: &Self::Genesis) -> SnapshotResult<()> {
        Self::validate(genesis)?;
        Self::replay(store, genesis)
    }
}

/// Reject the first repeated key in `keys`
pub(crate) fn ensure_unique<K, I>(what: &str, keys: I) -> SnapshotResult<()>
where
    K: Hash + Eq + Debug,
    I: IntoIterator<Item = K>,
{
    let mut seen = HashSet::new();
    for key in keys {
        if seen.contains(&key) {
            return Err(SnapshotError::InvalidGenesis(format!(
                "duplicate {what} {key:?}"
            )));
        }
        seen.insert(key);
    }
    Ok(())
}

/// Check an identifier carried in genesis state
pub(crate) fn ensure_identifier(what: &str, id: &str) -> SnapshotResult<()> {
    ibc_snapshot_core::validate_identifier(id)
        .map_err(|e| SnapshotError::InvalidGenesis(format!("{what} {id:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_unique() {
        assert!(ensure_unique("client", ["a", "b"]).is_ok());
        let err = ensure_unique("client", ["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidGenesis(msg) if msg.contains("\"a\"")));
    }

    #[test]
    fn test_ensure_identifier() {
        assert!(ensure_identifier("client", "07-tendermint-0").is_ok());
        assert!(matches!(
            ensure_identifier("client", ""),
            Err(SnapshotError::InvalidGenesis(_))
        ));
    }
}
