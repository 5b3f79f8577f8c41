//! Subsystem coordinator
//!
//! Runs export and import across the client, connection and channel
//! registries in that fixed order, for both snapshot formats. Each subsystem
//! writes its own files under the shared target directory.
//!
//! The first failing subsystem aborts the run and its error is returned
//! unchanged. Subsystems that already completed are not rolled back.

use std::path::{Path, PathBuf};

use ibc_snapshot_core::{ChannelStore, ClientStore, ConnectionStore};
use ibc_snapshot_durability::{
    CancellationToken, ChunkedFileInfo, SnapshotConfig, SnapshotResult,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::genesis::{
    ChannelGenesis, ChannelSubsystem, ClientGenesis, ClientSubsystem, ConnectionGenesis,
    ConnectionSubsystem, Subsystem,
};
use crate::snapshot::{SnapshotExporter, SnapshotImporter};

/// Combined genesis state of all IBC registries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcGenesisState {
    /// Client registry state
    pub client_genesis: ClientGenesis,
    /// Connection registry state
    pub connection_genesis: ConnectionGenesis,
    /// Channel registry state
    pub channel_genesis: ChannelGenesis,
}

/// The record stores of all IBC registries
#[derive(Clone, Copy)]
pub struct IbcStores<'a> {
    /// Client registry store
    pub client: &'a (dyn ClientStore + 'static),
    /// Connection registry store
    pub connection: &'a (dyn ConnectionStore + 'static),
    /// Channel registry store
    pub channel: &'a (dyn ChannelStore + 'static),
}

impl<'a> IbcStores<'a> {
    /// Use one backend for all three registries
    pub fn shared<T>(store: &'a T) -> Self
    where
        T: ClientStore + ConnectionStore + ChannelStore + 'static,
    {
        IbcStores {
            client: store,
            connection: store,
            channel: store,
        }
    }
}

/// Drives snapshot export and import across all registries
#[derive(Debug, Clone, Default)]
pub struct SubsystemCoordinator {
    config: SnapshotConfig,
    cancel: CancellationToken,
}

impl SubsystemCoordinator {
    /// Create a coordinator with its own cancellation token
    pub fn new(config: SnapshotConfig) -> Self {
        Self::with_cancellation(config, CancellationToken::new())
    }

    /// Create a coordinator observing `cancel`
    pub fn with_cancellation(config: SnapshotConfig, cancel: CancellationToken) -> Self {
        SubsystemCoordinator { config, cancel }
    }

    /// Snapshot configuration
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Token that cancels in-flight exports when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn exporter<S: Subsystem>(&self) -> SnapshotExporter<S> {
        SnapshotExporter::new(self.config.clone(), self.cancel.clone())
    }

    /// Read the genesis state of every registry
    pub fn export_genesis(&self, stores: &IbcStores<'_>) -> SnapshotResult<IbcGenesisState> {
        Ok(IbcGenesisState {
            client_genesis: ClientSubsystem::export_genesis(stores.client)?,
            connection_genesis: ConnectionSubsystem::export_genesis(stores.connection)?,
            channel_genesis: ChannelSubsystem::export_genesis(stores.channel)?,
        })
    }

    /// Validate and replay every registry's genesis state
    pub fn init_genesis(&self, stores: &IbcStores<'_>, genesis: &IbcGenesisState) -> SnapshotResult<()> {
        ClientSubsystem::init_genesis(stores.client, &genesis.client_genesis)?;
        ConnectionSubsystem::init_genesis(stores.connection, &genesis.connection_genesis)?;
        ChannelSubsystem::init_genesis(stores.channel, &genesis.channel_genesis)
    }

    /// Export every registry in the legacy chunked format under `dir`
    ///
    /// Returns the chunk summary of each registry in export order.
    pub fn export_to(&self, stores: &IbcStores<'_>, dir: &Path) -> SnapshotResult<Vec<ChunkedFileInfo>> {
        info!(dir = %dir.display(), "Starting legacy export");
        let infos = vec![
            self.exporter::<ClientSubsystem>().export_to(stores.client, dir)?,
            self.exporter::<ConnectionSubsystem>().export_to(stores.connection, dir)?,
            self.exporter::<ChannelSubsystem>().export_to(stores.channel, dir)?,
        ];
        info!(
            dir = %dir.display(),
            files = infos.iter().map(|i| i.files.len()).sum::<usize>(),
            "Legacy export finished"
        );
        Ok(infos)
    }

    /// Import every registry from legacy chunk files under `dir`
    pub fn import_legacy_from(&self, stores: &IbcStores<'_>, dir: &Path) -> SnapshotResult<()> {
        SnapshotImporter::<ClientSubsystem>::new().import_legacy_from(stores.client, dir)?;
        SnapshotImporter::<ConnectionSubsystem>::new().import_legacy_from(stores.connection, dir)?;
        SnapshotImporter::<ChannelSubsystem>::new().import_legacy_from(stores.channel, dir)
    }

    /// Export every registry as an envelope file under `dir`
    ///
    /// Returns the envelope paths in export order.
    pub fn export_genesis_to(&self, stores: &IbcStores<'_>, dir: &Path) -> SnapshotResult<Vec<PathBuf>> {
        Ok(vec![
            self.exporter::<ClientSubsystem>().export_genesis_to(stores.client, dir)?,
            self.exporter::<ConnectionSubsystem>().export_genesis_to(stores.connection, dir)?,
            self.exporter::<ChannelSubsystem>().export_genesis_to(stores.channel, dir)?,
        ])
    }

    /// Import every registry from envelope files under `dir`
    pub fn init_genesis_from(&self, stores: &IbcStores<'_>, dir: &Path) -> SnapshotResult<()> {
        SnapshotImporter::<ClientSubsystem>::new().init_genesis_from(stores.client, dir)?;
        SnapshotImporter::<ConnectionSubsystem>::new().init_genesis_from(stores.connection, dir)?;
        SnapshotImporter::<ChannelSubsystem>::new().init_genesis_from(stores.channel, dir)
    }
}
