//! Client registry genesis
//!
//! Legacy section order (`client0`, `client1`, ...):
//!
//! 1. client params (length-prefixed)
//! 2. `create_localhost` flag byte, always `0`
//! 3. next client sequence
//! 4. client states
//! 5. client metadata
//! 6. consensus states, grouped by client

use ibc_snapshot_core::key::{self, KEY_CLIENT_STATE};
use ibc_snapshot_core::{
    BincodeCodec, ClientConsensusStates, ClientParams, ClientStore, IdentifiedClientState,
    IdentifiedGenesisMetadata,
};
use ibc_snapshot_durability::{SectionReader, SectionWriter, SnapshotError, SnapshotResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ensure_identifier, ensure_unique, Subsystem};

const SECTION_PARAMS: &str = "client params";
const SECTION_CLIENTS: &str = "clients";
const SECTION_METADATA: &str = "client metadata";
const SECTION_CONSENSUS: &str = "consensus states";

/// Genesis state of the client registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientGenesis {
    /// Client states in key order
    pub clients: Vec<IdentifiedClientState>,
    /// Consensus states grouped by client
    pub clients_consensus: Vec<ClientConsensusStates>,
    /// Per-client metadata
    pub clients_metadata: Vec<IdentifiedGenesisMetadata>,
    /// Registry parameters, including the client type allowlist
    pub params: ClientParams,
    /// Reserved. Exported as `false`; ignored on import.
    pub create_localhost: bool,
    /// Next client sequence counter
    pub next_client_sequence: u64,
}

/// The client registry
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientSubsystem;

impl ClientSubsystem {
    /// Fail with `InvalidState` if any client type is not on the allowlist
    pub fn check_allowlist(genesis: &ClientGenesis) -> SnapshotResult<()> {
        for client in &genesis.clients {
            let client_type = &client.client_state.client_type;
            if !genesis.params.is_allowed_client(client_type) {
                return Err(SnapshotError::InvalidState(format!(
                    "client {} has type {client_type:?} which is not on the allowlist",
                    client.client_id
                )));
            }
        }
        Ok(())
    }

    /// Reject metadata that aliases a reserved client key nothing overwrites
    ///
    /// Metadata is replayed first, so an alias of `clientState` or of a
    /// consensus height is harmless when the same genesis installs that
    /// record. Any other alias would leave a value the store cannot decode
    /// or would resurface as a consensus state on the next export.
    fn check_reserved_metadata(genesis: &ClientGenesis) -> SnapshotResult<()> {
        for metadata in &genesis.clients_metadata {
            let client_id = &metadata.client_id;
            for entry in &metadata.client_metadata {
                if !key::is_reserved_client_path(&entry.key) {
                    continue;
                }
                let overwritten = if entry.key == KEY_CLIENT_STATE {
                    genesis.clients.iter().any(|c| &c.client_id == client_id)
                } else if let Some(height) = key::parse_consensus_state_path(&entry.key) {
                    genesis
                        .clients_consensus
                        .iter()
                        .filter(|g| &g.client_id == client_id)
                        .flat_map(|g| &g.consensus_states)
                        .any(|cs| cs.height == height)
                } else {
                    false
                };
                if !overwritten {
                    return Err(SnapshotError::InvalidGenesis(format!(
                        "metadata key {:?} of client {client_id} aliases a reserved client key",
                        entry.key
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Subsystem for ClientSubsystem {
    const NAME: &'static str = "client";
    type Store = dyn ClientStore;
    type Genesis = ClientGenesis;

    fn export_genesis(store: &Self::Store) -> SnapshotResult<ClientGenesis> {
        let clients = store.get_all_clients()?;
        let clients_metadata = store.get_all_client_metadata(&clients)?;
        let clients_consensus = store.get_all_consensus_states()?;

        Ok(ClientGenesis {
            clients,
            clients_consensus,
            clients_metadata,
            params: store.client_params()?,
            // A localhost client created on this chain is already in `clients`
            create_localhost: false,
            next_client_sequence: store.next_client_sequence()?,
        })
    }

    fn validate(genesis: &ClientGenesis) -> SnapshotResult<()> {
        for client in &genesis.clients {
            ensure_identifier("client", &client.client_id)?;
        }
        ensure_unique("client", genesis.clients.iter().map(|c| &c.client_id))?;

        for group in &genesis.clients_consensus {
            ensure_identifier("consensus state client", &group.client_id)?;
            ensure_unique(
                &format!("consensus height of {}", group.client_id),
                group.consensus_states.iter().map(|cs| cs.height),
            )?;
        }
        ensure_unique(
            "consensus state client",
            genesis.clients_consensus.iter().map(|g| &g.client_id),
        )?;

        for metadata in &genesis.clients_metadata {
            ensure_identifier("metadata client", &metadata.client_id)?;
            if metadata.client_metadata.iter().any(|m| m.key.is_empty()) {
                return Err(SnapshotError::InvalidGenesis(format!(
                    "empty metadata key for client {}",
                    metadata.client_id
                )));
            }
            ensure_unique(
                &format!("metadata key of {}", metadata.client_id),
                metadata.client_metadata.iter().map(|m| &m.key),
            )?;
        }
        ensure_unique(
            "metadata client",
            genesis.clients_metadata.iter().map(|m| &m.client_id),
        )?;
        Self::check_reserved_metadata(genesis)?;

        Self::check_allowlist(genesis)
    }

    fn replay(store: &Self::Store, genesis: &ClientGenesis) -> SnapshotResult<()> {
        store.set_client_params(&genesis.params)?;

        // Metadata first: client state writes must win over metadata that
        // aliases reserved client keys.
        if !genesis.clients_metadata.is_empty() {
            store.set_all_client_metadata(&genesis.clients_metadata)?;
        }

        for client in &genesis.clients {
            store.set_client_state(&client.client_id, &client.client_state)?;
        }

        let mut consensus_states = 0usize;
        for group in &genesis.clients_consensus {
            for cs in &group.consensus_states {
                store.set_client_consensus_state(&group.client_id, cs.height, &cs.consensus_state)?;
                consensus_states += 1;
            }
        }

        store.set_next_client_sequence(genesis.next_client_sequence)?;

        if genesis.create_localhost {
            warn!("create_localhost is set; localhost client creation is disallowed, ignoring");
        }

        info!(
            clients = genesis.clients.len(),
            metadata = genesis.clients_metadata.len(),
            consensus_states,
            next_sequence = genesis.next_client_sequence,
            "Client genesis initialized"
        );
        Ok(())
    }

    fn write_sections(genesis: &ClientGenesis, writer: &mut SectionWriter) -> SnapshotResult<()> {
        writer.write_params(SECTION_PARAMS, &genesis.params, &BincodeCodec::new())?;
        writer.write_flag(false)?;
        writer.write_sequence(genesis.next_client_sequence)?;
        writer.write_section(SECTION_CLIENTS, &genesis.clients, &BincodeCodec::new())?;
        writer.write_section(SECTION_METADATA, &genesis.clients_metadata, &BincodeCodec::new())?;
        writer.write_section(SECTION_CONSENSUS, &genesis.clients_consensus, &BincodeCodec::new())?;
        Ok(())
    }

    fn read_sections(reader: &mut SectionReader) -> SnapshotResult<ClientGenesis> {
        let params = reader.read_params(SECTION_PARAMS, &BincodeCodec::new())?;
        let create_localhost = reader.read_flag()?;
        let next_client_sequence = reader.read_sequence()?;
        let clients = reader.read_section(SECTION_CLIENTS, &BincodeCodec::new())?;
        let clients_metadata = reader.read_section(SECTION_METADATA, &BincodeCodec::new())?;
        let clients_consensus = reader.read_section(SECTION_CONSENSUS, &BincodeCodec::new())?;

        Ok(ClientGenesis {
            clients,
            clients_consensus,
            clients_metadata,
            params,
            create_localhost,
            next_client_sequence,
        })
    }
}
