//! Connection registry genesis
//!
//! Legacy section order (`connection0`, `connection1`, ...):
//!
//! 1. connection params (length-prefixed)
//! 2. next connection sequence
//! 3. connection ends
//! 4. client connection paths

use ibc_snapshot_core::{
    BincodeCodec, ConnectionParams, ConnectionPaths, ConnectionStore, IdentifiedConnection,
};
use ibc_snapshot_durability::{SectionReader, SectionWriter, SnapshotResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ensure_identifier, ensure_unique, Subsystem};

const SECTION_PARAMS: &str = "connection params";
const SECTION_CONNECTIONS: &str = "connections";
const SECTION_PATHS: &str = "client connection paths";

/// Genesis state of the connection registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionGenesis {
    /// Connection ends in key order
    pub connections: Vec<IdentifiedConnection>,
    /// Connection identifiers per client
    pub client_connection_paths: Vec<ConnectionPaths>,
    /// Next connection sequence counter
    pub next_connection_sequence: u64,
    /// Registry parameters
    pub params: ConnectionParams,
}

/// The connection registry
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionSubsystem;

impl Subsystem for ConnectionSubsystem {
    const NAME: &'static str = "connection";
    type Store = dyn ConnectionStore;
    type Genesis = ConnectionGenesis;

    fn export_genesis(store: &Self::Store) -> SnapshotResult<ConnectionGenesis> {
        Ok(ConnectionGenesis {
            connections: store.get_all_connections()?,
            client_connection_paths: store.get_all_client_connection_paths()?,
            next_connection_sequence: store.next_connection_sequence()?,
            params: store.connection_params()?,
        })
    }

    fn validate(genesis: &ConnectionGenesis) -> SnapshotResult<()> {
        for connection in &genesis.connections {
            ensure_identifier("connection", &connection.connection_id)?;
            ensure_identifier("connection client", &connection.connection_end.client_id)?;
        }
        ensure_unique(
            "connection",
            genesis.connections.iter().map(|c| &c.connection_id),
        )?;

        for paths in &genesis.client_connection_paths {
            ensure_identifier("connection paths client", &paths.client_id)?;
            for path in &paths.paths {
                ensure_identifier("connection path", path)?;
            }
        }
        ensure_unique(
            "connection paths client",
            genesis.client_connection_paths.iter().map(|p| &p.client_id),
        )
    }

    fn replay(store: &Self::Store, genesis: &ConnectionGenesis) -> SnapshotResult<()> {
        for connection in &genesis.connections {
            store.set_connection(&connection.connection_id, &connection.connection_end)?;
        }
        for paths in &genesis.client_connection_paths {
            store.set_client_connection_paths(&paths.client_id, &paths.paths)?;
        }
        store.set_next_connection_sequence(genesis.next_connection_sequence)?;
        store.set_connection_params(&genesis.params)?;

        info!(
            connections = genesis.connections.len(),
            client_paths = genesis.client_connection_paths.len(),
            next_sequence = genesis.next_connection_sequence,
            "Connection genesis initialized"
        );
        Ok(())
    }

    fn write_sections(genesis: &ConnectionGenesis, writer: &mut SectionWriter) -> SnapshotResult<()> {
        writer.write_params(SECTION_PARAMS, &genesis.params, &BincodeCodec::new())?;
        writer.write_sequence(genesis.next_connection_sequence)?;
        writer.write_section(SECTION_CONNECTIONS, &genesis.connections, &BincodeCodec::new())?;
        writer.write_section(SECTION_PATHS, &genesis.client_connection_paths, &BincodeCodec::new())?;
        Ok(())
    }

    fn read_sections(reader: &mut SectionReader) -> SnapshotResult<ConnectionGenesis> {
        let params = reader.read_params(SECTION_PARAMS, &BincodeCodec::new())?;
        let next_connection_sequence = reader.read_sequence()?;
        let connections = reader.read_section(SECTION_CONNECTIONS, &BincodeCodec::new())?;
        let client_connection_paths = reader.read_section(SECTION_PATHS, &BincodeCodec::new())?;

        Ok(ConnectionGenesis {
            connections,
            client_connection_paths,
            next_connection_sequence,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibc_snapshot_core::ConnectionEnd;
    use ibc_snapshot_durability::SnapshotError;
    use ibc_snapshot_storage::MemoryStore;

    fn genesis() -> ConnectionGenesis {
        ConnectionGenesis {
            connections: vec![IdentifiedConnection::new(
                "connection-0",
                ConnectionEnd::new("07-tendermint-0", vec![3; 12]),
            )],
            client_connection_paths: vec![ConnectionPaths {
                client_id: "07-tendermint-0".into(),
                paths: vec!["connection-0".into()],
            }],
            next_connection_sequence: 1,
            params: ConnectionParams {
                max_expected_time_per_block: 30_000_000_000,
            },
        }
    }

    #[test]
    fn test_init_then_export() {
        let store = MemoryStore::new();
        ConnectionSubsystem::init_genesis(&store, &genesis()).unwrap();
        assert_eq!(ConnectionSubsystem::export_genesis(&store).unwrap(), genesis());
    }

    #[test]
    fn test_empty_store_exports_default() {
        let store = MemoryStore::new();
        assert_eq!(
            ConnectionSubsystem::export_genesis(&store).unwrap(),
            ConnectionGenesis::default()
        );
    }

    #[test]
    fn test_invalid_path_rejected_before_writes() {
        let store = MemoryStore::new();
        let mut genesis = genesis();
        genesis.client_connection_paths[0].paths.push("bad/path".into());

        assert!(matches!(
            ConnectionSubsystem::init_genesis(&store, &genesis),
            Err(SnapshotError::InvalidGenesis(_))
        ));
        assert!(store.is_empty());
    }
}
