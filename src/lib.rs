//! ibc-snapshot - bounded-size snapshots of IBC client, connection and channel state
//!
//! Exports each IBC registry either as a stream of length-prefixed records
//! split across size-capped chunk files, or as one self-describing envelope
//! file, and imports either format back into a record store.
//!
//! # Quick Start
//!
//! ```ignore
//! use ibc_snapshot::{IbcStores, MemoryStore, SnapshotConfig, SubsystemCoordinator};
//!
//! let store = MemoryStore::new();
//! let coordinator = SubsystemCoordinator::new(SnapshotConfig::default());
//!
//! // client0.., connection0.., channel0.. under ./export
//! coordinator.export_to(&IbcStores::shared(&store), "export".as_ref())?;
//!
//! let restored = MemoryStore::new();
//! coordinator.import_legacy_from(&IbcStores::shared(&restored), "export".as_ref())?;
//! ```
//!
//! # Architecture
//!
//! - `ibc-snapshot-core`: records, store traits, codec seam
//! - `ibc-snapshot-storage`: in-memory reference store
//! - `ibc-snapshot-durability`: chunked framing and file formats
//! - `ibc-snapshot-engine`: per-registry genesis and the coordinator

pub use ibc_snapshot_durability as durability;
pub use ibc_snapshot_engine as engine;
pub use ibc_snapshot_storage as storage;

pub use ibc_snapshot_core::{
    BinaryCodec, BincodeCodec, ChannelStore, ClientStore, ConnectionStore, Height,
};
pub use ibc_snapshot_durability::{CancellationToken, SnapshotConfig, SnapshotError, SnapshotResult};
pub use ibc_snapshot_engine::{
    ChannelGenesis, ClientGenesis, ConnectionGenesis, IbcGenesisState, IbcStores, SnapshotExporter,
    SnapshotImporter, Subsystem, SubsystemCoordinator,
};
pub use ibc_snapshot_storage::MemoryStore;
