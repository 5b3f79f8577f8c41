//! Record store capabilities
//!
//! This module defines the store traits the snapshot engine reads from and
//! replays into. Each subsystem has its own capability surface; a single
//! backend may implement all three.
//!
//! Methods take `&self` so implementations can be shared behind references;
//! implementations use interior mutability for writes. The engine assumes
//! exclusive access for the duration of an export or import.

use crate::error::Result;
use crate::records::{
    ClientConsensusStates, ClientParams, ClientState, ConnectionEnd, ConnectionParams,
    ConnectionPaths, IdentifiedChannel, IdentifiedClientState, IdentifiedConnection,
    IdentifiedGenesisMetadata, PacketSequence, PacketState,
};
use crate::types::Height;

/// Client registry capability
pub trait ClientStore {
    /// Current client parameters
    fn client_params(&self) -> Result<ClientParams>;

    /// Replace the client parameters
    fn set_client_params(&self, params: &ClientParams) -> Result<()>;

    /// Next client sequence counter
    fn next_client_sequence(&self) -> Result<u64>;

    /// Set the next client sequence counter
    fn set_next_client_sequence(&self, sequence: u64) -> Result<()>;

    /// All client states in key order
    fn get_all_clients(&self) -> Result<Vec<IdentifiedClientState>>;

    /// Metadata of the given clients
    ///
    /// Clients without metadata are omitted from the result.
    fn get_all_client_metadata(
        &self,
        clients: &[IdentifiedClientState],
    ) -> Result<Vec<IdentifiedGenesisMetadata>>;

    /// All consensus states grouped by client, heights ascending
    fn get_all_consensus_states(&self) -> Result<Vec<ClientConsensusStates>>;

    /// Write client metadata entries
    ///
    /// Entries are written verbatim into each client's key space,
    /// including keys that alias reserved client keys.
    fn set_all_client_metadata(&self, metadata: &[IdentifiedGenesisMetadata]) -> Result<()>;

    /// Install a client state
    fn set_client_state(&self, client_id: &str, client_state: &ClientState) -> Result<()>;

    /// Install a consensus state
    fn set_client_consensus_state(
        &self,
        client_id: &str,
        height: Height,
        consensus_state: &[u8],
    ) -> Result<()>;
}

/// Connection registry capability
pub trait ConnectionStore {
    /// Current connection parameters
    fn connection_params(&self) -> Result<ConnectionParams>;

    /// Replace the connection parameters
    fn set_connection_params(&self, params: &ConnectionParams) -> Result<()>;

    /// Next connection sequence counter
    fn next_connection_sequence(&self) -> Result<u64>;

    /// Set the next connection sequence counter
    fn set_next_connection_sequence(&self, sequence: u64) -> Result<()>;

    /// All connection ends in key order
    fn get_all_connections(&self) -> Result<Vec<IdentifiedConnection>>;

    /// Install a connection end
    fn set_connection(&self, connection_id: &str, connection: &ConnectionEnd) -> Result<()>;

    /// All client → connection path lists in key order
    fn get_all_client_connection_paths(&self) -> Result<Vec<ConnectionPaths>>;

    /// Install the connection paths of one client
    fn set_client_connection_paths(&self, client_id: &str, paths: &[String]) -> Result<()>;
}

/// Channel and packet registry capability
pub trait ChannelStore {
    /// Next channel sequence counter
    fn next_channel_sequence(&self) -> Result<u64>;

    /// Set the next channel sequence counter
    fn set_next_channel_sequence(&self, sequence: u64) -> Result<()>;

    /// All channel ends in key order
    fn get_all_channels(&self) -> Result<Vec<IdentifiedChannel>>;

    /// Install a channel end
    fn set_channel(&self, port_id: &str, channel_id: &str, channel: &[u8]) -> Result<()>;

    /// All packet acknowledgements
    fn get_all_packet_acks(&self) -> Result<Vec<PacketState>>;

    /// Install a packet acknowledgement
    fn set_packet_acknowledgement(
        &self,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        ack_hash: &[u8],
    ) -> Result<()>;

    /// All packet commitments
    fn get_all_packet_commitments(&self) -> Result<Vec<PacketState>>;

    /// Install a packet commitment
    fn set_packet_commitment(
        &self,
        port_id: &str,
        channel_id: &str,
        sequence: u64,
        commitment_hash: &[u8],
    ) -> Result<()>;

    /// All packet receipts
    fn get_all_packet_receipts(&self) -> Result<Vec<PacketState>>;

    /// Install a packet receipt
    ///
    /// Receipts carry no caller data; the store writes its own marker.
    fn set_packet_receipt(&self, port_id: &str, channel_id: &str, sequence: u64) -> Result<()>;

    /// All next-send sequences
    fn get_all_packet_send_seqs(&self) -> Result<Vec<PacketSequence>>;

    /// Set the next-send sequence of a channel
    fn set_next_sequence_send(&self, port_id: &str, channel_id: &str, sequence: u64)
        -> Result<()>;

    /// All next-recv sequences
    fn get_all_packet_recv_seqs(&self) -> Result<Vec<PacketSequence>>;

    /// Set the next-recv sequence of a channel
    fn set_next_sequence_recv(&self, port_id: &str, channel_id: &str, sequence: u64)
        -> Result<()>;

    /// All next-ack sequences
    fn get_all_packet_ack_seqs(&self) -> Result<Vec<PacketSequence>>;

    /// Set the next-ack sequence of a channel
    fn set_next_sequence_ack(&self, port_id: &str, channel_id: &str, sequence: u64) -> Result<()>;
}
