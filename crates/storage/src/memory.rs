//! MemoryStore: ordered in-memory record store
//!
//! This module implements the record store traits using:
//! - `BTreeMap<String, Vec<u8>>` for the ordered key space (see `ibc_snapshot_core::key`)
//! - `parking_lot::RwLock` for interior mutability behind `&self`
//! - bincode for structured values, big-endian `u64` for sequence counters
//!
//! # Design Notes
//!
//! - **Flat key space**: client metadata shares `clients/{id}/` with the
//!   client state, so a metadata write can alias `clientState`. This is the
//!   behavior the import ordering rules protect against.
//! - **Ordered reads**: every `get_all_*` returns records in key order, so
//!   two stores with equal contents export identical snapshots.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use ibc_snapshot_core::key::{
    self, KEY_CHANNEL_END_PREFIX, KEY_CLIENT_CONNECTIONS, KEY_CLIENT_PARAMS, KEY_CLIENT_STATE,
    KEY_CLIENT_STORE_PREFIX, KEY_CONNECTION_PARAMS, KEY_CONNECTION_PREFIX,
    KEY_NEXT_CHANNEL_SEQUENCE, KEY_NEXT_CLIENT_SEQUENCE, KEY_NEXT_CONNECTION_SEQUENCE,
    KEY_NEXT_SEQ_ACK_PREFIX, KEY_NEXT_SEQ_RECV_PREFIX, KEY_NEXT_SEQ_SEND_PREFIX,
    KEY_PACKET_ACK_PREFIX, KEY_PACKET_COMMITMENT_PREFIX, KEY_PACKET_RECEIPT_PREFIX,
};
use ibc_snapshot_core::{
    validate_identifier, ChannelStore, ClientConsensusStates, ClientParams, ClientState,
    ClientStore, ConnectionEnd, ConnectionParams, ConnectionPaths, ConnectionStore,
    ConsensusStateWithHeight, Error, GenesisMetadata, Height, IdentifiedChannel,
    IdentifiedClientState, IdentifiedConnection, IdentifiedGenesisMetadata, PacketSequence,
    PacketState, Result,
};

/// Marker value stored for packet receipts
pub const RECEIPT_MARKER: &[u8] = &[1];

/// Ordered in-memory record store
///
/// Thread-safe through `parking_lot::RwLock`. Cheap to create; intended for
/// tests, tooling and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if no keys are stored
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Raw value at `key`
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    /// Write a raw value
    pub fn put(&self, key: impl Into<String>, value: Vec<u8>) {
        self.data.write().insert(key.into(), value);
    }

    /// Copy of the whole key space
    ///
    /// Two stores are observably equal when their entries are equal.
    pub fn entries(&self) -> BTreeMap<String, Vec<u8>> {
        self.data.read().clone()
    }

    /// All entries whose key starts with `prefix`, in key order
    pub fn scan_prefix(&self, prefix: &str) -> Vec<(String, Vec<u8>)> {
        self.data
            .read()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn get_decoded<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(bytes) => decode_value(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn put_encoded<T: Serialize>(&self, key: String, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)?;
        self.put(key, bytes);
        Ok(())
    }

    fn get_sequence(&self, key: &str) -> Result<u64> {
        match self.get(key) {
            Some(bytes) => decode_sequence(key, &bytes),
            None => Ok(0),
        }
    }

    fn put_sequence(&self, key: String, sequence: u64) {
        self.put(key, sequence.to_be_bytes().to_vec());
    }

    /// Per-client entries `(client_id, path, value)` under `clients/`
    fn scan_client_entries(&self) -> Vec<(String, String, Vec<u8>)> {
        self.scan_prefix(&format!("{KEY_CLIENT_STORE_PREFIX}/"))
            .into_iter()
            .filter_map(|(k, v)| {
                let (client_id, path) = key::parse_client_key(&k)?;
                Some((client_id.to_string(), path.to_string(), v))
            })
            .collect()
    }

    fn scan_packets(&self, prefix: &str) -> Result<Vec<PacketState>> {
        let mut packets = Vec::new();
        for (k, v) in self.scan_prefix(&format!("{prefix}/")) {
            let (port_id, channel_id, sequence) = key::parse_packet_key(prefix, &k)
                .ok_or_else(|| Error::Corruption(format!("malformed packet key {k:?}")))?;
            packets.push(PacketState::new(port_id, channel_id, sequence, v));
        }
        Ok(packets)
    }

    fn scan_sequences(&self, prefix: &str) -> Result<Vec<PacketSequence>> {
        let mut sequences = Vec::new();
        for (k, v) in self.scan_prefix(&format!("{prefix}/")) {
            let (port_id, channel_id) = key::parse_channel_key(prefix, &k)
                .ok_or_else(|| Error::Corruption(format!("malformed sequence key {k:?}")))?;
            sequences.push(PacketSequence::new(
                port_id,
                channel_id,
                decode_sequence(&k, &v)?,
            ));
        }
        Ok(sequences)
    }
}

fn decode_value<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes)
        .map_err(|e| Error::Corruption(format!("cannot decode value at {key:?}: {e}")))
}

fn decode_sequence(key: &str, bytes: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| {
        Error::Corruption(format!(
            "sequence at {key:?} has {} bytes, expected 8",
            bytes.len()
        ))
    })?;
    Ok(u64::from_be_bytes(raw))
}

fn validate_channel(port_id: &str, channel_id: &str) -> Result<()> {
    validate_identifier(port_id)?;
    validate_identifier(channel_id)
}

impl ClientStore for MemoryStore {
    fn client_params(&self) -> Result<ClientParams> {
        Ok(self.get_decoded(KEY_CLIENT_PARAMS)?.unwrap_or_default())
    }

    fn set_client_params(&self, params: &ClientParams) -> Result<()> {
        self.put_encoded(KEY_CLIENT_PARAMS.to_string(), params)
    }

    fn next_client_sequence(&self) -> Result<u64> {
        self.get_sequence(KEY_NEXT_CLIENT_SEQUENCE)
    }

    fn set_next_client_sequence(&self, sequence: u64) -> Result<()> {
        self.put_sequence(KEY_NEXT_CLIENT_SEQUENCE.to_string(), sequence);
        Ok(())
    }

    fn get_all_clients(&self) -> Result<Vec<IdentifiedClientState>> {
        self.scan_client_entries()
            .into_iter()
            .filter(|(_, path, _)| path == KEY_CLIENT_STATE)
            .map(|(client_id, _, value)| {
                let client_state: ClientState =
                    decode_value(&key::client_state_key(&client_id), &value)?;
                Ok(IdentifiedClientState::new(client_id, client_state))
            })
            .collect()
    }

    fn get_all_client_metadata(
        &self,
        clients: &[IdentifiedClientState],
    ) -> Result<Vec<IdentifiedGenesisMetadata>> {
        let mut all = Vec::new();
        for client in clients {
            let prefix = key::client_prefix(&client.client_id);
            let client_metadata: Vec<GenesisMetadata> = self
                .scan_prefix(&prefix)
                .into_iter()
                .filter_map(|(k, v)| {
                    let path = k.strip_prefix(&prefix)?;
                    if key::is_reserved_client_path(path) {
                        None
                    } else {
                        Some(GenesisMetadata::new(path, v))
                    }
                })
                .collect();
            if !client_metadata.is_empty() {
                all.push(IdentifiedGenesisMetadata {
                    client_id: client.client_id.clone(),
                    client_metadata,
                });
            }
        }
        Ok(all)
    }

    fn get_all_consensus_states(&self) -> Result<Vec<ClientConsensusStates>> {
        let mut grouped: BTreeMap<String, Vec<ConsensusStateWithHeight>> = BTreeMap::new();
        for (client_id, path, value) in self.scan_client_entries() {
            if let Some(height) = key::parse_consensus_state_path(&path) {
                grouped
                    .entry(client_id)
                    .or_default()
                    .push(ConsensusStateWithHeight {
                        height,
                        consensus_state: value,
                    });
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(client_id, mut consensus_states)| {
                consensus_states.sort_by_key(|cs| cs.height);
                ClientConsensusStates {
                    client_id,
                    consensus_states,
                }
            })
            .collect())
    }

    fn set_all_client_metadata(&self, metadata: &[IdentifiedGenesisMetadata]) -> Result<()> {
        for identified in metadata {
            validate_identifier(&identified.client_id)?;
            for entry in &identified.client_metadata {
                if key::is_reserved_client_path(&entry.key) {
                    tracing::warn!(
                        client_id = %identified.client_id,
                        key = %entry.key,
                        "Client metadata aliases a reserved client key"
                    );
                }
                self.put(
                    key::full_client_key(&identified.client_id, &entry.key),
                    entry.value.clone(),
                );
            }
        }
        Ok(())
    }

    fn set_client_state(&self, client_id: &str, client_state: &ClientState) -> Result<()> {
        validate_identifier(client_id)?;
        self.put_encoded(key::client_state_key(client_id), client_state)
    }

    fn set_client_consensus_state(
        &self,
        client_id: &str,
        height: Height,
        consensus_state: &[u8],
    ) -> Result<()> {
        validate_identifier(client_id)?;
        self.put(
            key::consensus_state_key(client_id, height),
            consensus_state.to_vec(),
        );
        Ok(())
    }
}

impl ConnectionStore for MemoryStore {
    fn connection_params(&self) -> Result<ConnectionParams> {
        Ok(self.get_decoded(KEY_CONNECTION_PARAMS)?.unwrap_or_default())
    }

    fn set_connection_params(&self, params: &ConnectionParams) -> Result<()> {
        self.put_encoded(KEY_CONNECTION_PARAMS.to_string(), params)
    }

    fn next_connection_sequence(&self) -> Result<u64> {
        self.get_sequence(KEY_NEXT_CONNECTION_SEQUENCE)
    }

    fn set_next_connection_sequence(&self, sequence: u64) -> Result<()> {
        self.put_sequence(KEY_NEXT_CONNECTION_SEQUENCE.to_string(), sequence);
        Ok(())
    }

    fn get_all_connections(&self) -> Result<Vec<IdentifiedConnection>> {
        let prefix = format!("{KEY_CONNECTION_PREFIX}/");
        self.scan_prefix(&prefix)
            .into_iter()
            .map(|(k, v)| {
                let connection_id = k
                    .strip_prefix(&prefix)
                    .filter(|id| !id.is_empty() && !id.contains('/'))
                    .ok_or_else(|| Error::Corruption(format!("malformed connection key {k:?}")))?;
                let connection_end: ConnectionEnd = decode_value(&k, &v)?;
                Ok(IdentifiedConnection::new(connection_id, connection_end))
            })
            .collect()
    }

    fn set_connection(&self, connection_id: &str, connection: &ConnectionEnd) -> Result<()> {
        validate_identifier(connection_id)?;
        self.put_encoded(key::connection_key(connection_id), connection)
    }

    fn get_all_client_connection_paths(&self) -> Result<Vec<ConnectionPaths>> {
        self.scan_client_entries()
            .into_iter()
            .filter(|(_, path, _)| path == KEY_CLIENT_CONNECTIONS)
            .map(|(client_id, _, value)| {
                let paths: Vec<String> =
                    decode_value(&key::client_connections_key(&client_id), &value)?;
                Ok(ConnectionPaths { client_id, paths })
            })
            .collect()
    }

    fn set_client_connection_paths(&self, client_id: &str, paths: &[String]) -> Result<()> {
        validate_identifier(client_id)?;
        self.put_encoded(key::client_connections_key(client_id), &paths)
    }
}

impl ChannelStore for MemoryStore {
    fn next_channel_sequence(&self) -> Result<u64> {
        self.get_sequence(KEY_NEXT_CHANNEL_SEQUENCE)
    }

    fn set_next_channel_sequence(&self, sequence: u64) -> Result<()> {
        self.put_sequence(KEY_NEXT_CHANNEL_SEQUENCE.to_string(), sequence);
        Ok(())
    }

    fn get_all_channels(&self) -> Result<Vec<IdentifiedChannel>> {
        let mut channels = Vec::new();
        for (k, v) in self.scan_prefix(&format!("{KEY_CHANNEL_END_PREFIX}/")) {
            let (port_id, channel_id) = key::parse_channel_key(KEY_CHANNEL_END_PREFIX, &k)
                .ok_or_else(|| Error::Corruption(format!("malformed channel key {k:?}")))?;
            channels.push(IdentifiedChannel::new(port_id, channel_id, v));
        }
        Ok(channels)
    }

    fn set_channel(&self, port_id: &str, channel_id: &str, channel: &[u8]) -> Result<()> {
        validate_channel(port_id, channel_id)?;
        self.put(key::channel_key(port_id, channel_id), channel.to_vec());
        Ok(())
    }

    fn get_all_packet_acks(&self) -> Result<Vec<PacketState>> {
        self.scan_packets(KEY_PACKET_ACK_PREFIX)
    }

    fn set_packet_acknowledgement(
        &self,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        ack_hash: &[u8],
    ) -> Result<()> {
        validate_channel(port_id, channel_id)?;
        self.put(
            key::packet_key(KEY_PACKET_ACK_PREFIX, port_id, channel_id, sequence),
            ack_hash.to_vec(),
        );
        Ok(())
    }

    fn get_all_packet_commitments(&self) -> Result<Vec<PacketState>> {
        self.scan_packets(KEY_PACKET_COMMITMENT_PREFIX)
    }

    fn set_packet_commitment(
        &self,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        commitment_hash: &[u8],
    ) -> Result<()> {
        validate_channel(port_id, channel_id)?;
        self.put(
            key::packet_key(KEY_PACKET_COMMITMENT_PREFIX, port_id, channel_id, sequence),
            commitment_hash.to_vec(),
        );
        Ok(())
    }

    fn get_all_packet_receipts(&self) -> Result<Vec<PacketState>> {
        self.scan_packets(KEY_PACKET_RECEIPT_PREFIX)
    }

    fn set_packet_receipt(&self, port_id: &str, channel_id: &str, sequence: u64) -> Result<()> {
        validate_channel(port_id, channel_id)?;
        self.put(
            key::packet_key(KEY_PACKET_RECEIPT_PREFIX, port_id, channel_id, sequence),
            RECEIPT_MARKER.to_vec(),
        );
        Ok(())
    }

    fn get_all_packet_send_seqs(&self) -> Result<Vec<PacketSequence>> {
        self.scan_sequences(KEY_NEXT_SEQ_SEND_PREFIX)
    }

    fn set_next_sequence_send(
        &self,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Result<()> {
        validate_channel(port_id, channel_id)?;
        self.put_sequence(
            key::sequence_key(KEY_NEXT_SEQ_SEND_PREFIX, port_id, channel_id),
            sequence,
        );
        Ok(())
    }

    fn get_all_packet_recv_seqs(&self) -> Result<Vec<PacketSequence>> {
        self.scan_sequences(KEY_NEXT_SEQ_RECV_PREFIX)
    }

    fn set_next_sequence_recv(
        &self,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
    ) -> Result<()> {
        validate_channel(port_id, channel_id)?;
        self.put_sequence(
            key::sequence_key(KEY_NEXT_SEQ_RECV_PREFIX, port_id, channel_id),
            sequence,
        );
        Ok(())
    }

    fn get_all_packet_ack_seqs(&self) -> Result<Vec<PacketSequence>> {
        self.scan_sequences(KEY_NEXT_SEQ_ACK_PREFIX)
    }

    fn set_next_sequence_ack(&self, port_id: &str, channel_id: &str, sequence: u64) -> Result<()> {
        validate_channel(port_id, channel_id)?;
        self.put_sequence(
            key::sequence_key(KEY_NEXT_SEQ_ACK_PREFIX, port_id, channel_id),
            sequence,
        );
        Ok(())
    }
}
