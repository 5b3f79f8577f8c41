//! Snapshot engine for IBC state
//!
//! This crate orchestrates the lower layers:
//! - Genesis: per-registry genesis state, validation and ordered replay
//! - Snapshot: per-registry export and import in the legacy and envelope formats
//! - Coordinator: client → connection → channel sequencing across registries
//!
//! The engine only sees record stores through the `ibc-snapshot-core`
//! traits and only touches disk through `ibc-snapshot-durability`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod genesis;
pub mod snapshot;
pub mod testing;

pub use coordinator::{IbcGenesisState, IbcStores, SubsystemCoordinator};
pub use genesis::{
    ChannelGenesis, ChannelSubsystem, ClientGenesis, ClientSubsystem, ConnectionGenesis,
    ConnectionSubsystem, Subsystem,
};
pub use snapshot::{legacy_base_path, SnapshotExporter, SnapshotImporter};
