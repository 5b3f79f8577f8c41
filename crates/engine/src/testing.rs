//! Fixtures for snapshot tests
//!
//! Deterministic record sets covering every table of every registry. The
//! populate helpers set params and all sequence counters, so a populated
//! store exports and re-imports to an identical key space.

use ibc_snapshot_core::{
    ChannelStore, ClientParams, ClientState, ClientStore, ConnectionEnd, ConnectionParams,
    ConnectionStore, GenesisMetadata, Height, IdentifiedGenesisMetadata, Result,
};

/// Light-client type used by fixture clients
pub const TENDERMINT: &str = "07-tendermint";

/// Port used by fixture channels
pub const TRANSFER_PORT: &str = "transfer";

/// Deterministic pseudo-random payload
pub fn payload(seed: usize, len: usize) -> Vec<u8> {
    (0..len)
        .map(|j| (seed.wrapping_mul(31).wrapping_add(j * 7)) as u8)
        .collect()
}

/// Identifier of fixture client `i`
pub fn client_id(i: usize) -> String {
    format!("{TENDERMINT}-{i}")
}

/// Identifier of fixture connection `i`
pub fn connection_id(i: usize) -> String {
    format!("connection-{i}")
}

/// Identifier of fixture channel `i`
pub fn channel_id(i: usize) -> String {
    format!("channel-{i}")
}

/// Install `n` clients with consensus states and metadata
///
/// Even-numbered clients get one metadata entry per consensus state.
pub fn populate_clients(store: &dyn ClientStore, n: usize) -> Result<()> {
    store.set_client_params(&ClientParams::new([TENDERMINT, "06-solomachine"]))?;

    for i in 0..n {
        let id = client_id(i);
        store.set_client_state(&id, &ClientState::new(TENDERMINT, payload(i, 48)))?;

        let heights = [Height::new(1, 10 + i as u64), Height::new(1, 20 + i as u64)];
        for (k, height) in heights.iter().enumerate() {
            store.set_client_consensus_state(&id, *height, &payload(i + k, 32))?;
        }

        if i % 2 == 0 {
            let client_metadata = heights
                .iter()
                .map(|h| GenesisMetadata::new(format!("consensusStates/{h}/processedTime"), payload(i, 8)))
                .collect();
            store.set_all_client_metadata(&[IdentifiedGenesisMetadata {
                client_id: id,
                client_metadata,
            }])?;
        }
    }

    store.set_next_client_sequence(n as u64)
}

/// Install `n` connections, one per fixture client
pub fn populate_connections(store: &dyn ConnectionStore, n: usize) -> Result<()> {
    store.set_connection_params(&ConnectionParams {
        max_expected_time_per_block: 30_000_000_000,
    })?;

    for i in 0..n {
        store.set_connection(
            &connection_id(i),
            &ConnectionEnd::new(client_id(i), payload(i, 24)),
        )?;
        store.set_client_connection_paths(&client_id(i), &[connection_id(i)])?;
    }

    store.set_next_connection_sequence(n as u64)
}

/// Install `n` transfer channels with packet state
pub fn populate_channels(store: &dyn ChannelStore, n: usize) -> Result<()> {
    for i in 0..n {
        let chan = channel_id(i);
        store.set_channel(TRANSFER_PORT, &chan, &payload(i, 40))?;
        for seq in 1..=3u64 {
            store.set_packet_commitment(TRANSFER_PORT, &chan, seq, &payload(i + seq as usize, 32))?;
        }
        store.set_packet_acknowledgement(TRANSFER_PORT, &chan, 1, &payload(i, 32))?;
        store.set_packet_receipt(TRANSFER_PORT, &chan, 1)?;
        store.set_packet_receipt(TRANSFER_PORT, &chan, 2)?;
        store.set_next_sequence_send(TRANSFER_PORT, &chan, 4)?;
        store.set_next_sequence_recv(TRANSFER_PORT, &chan, 3)?;
        store.set_next_sequence_ack(TRANSFER_PORT, &chan, 2)?;
    }

    store.set_next_channel_sequence(n as u64)
}

/// Populate every registry of one backend with `n` entries each
pub fn populate_all<T>(store: &T, n: usize) -> Result<()>
where
    T: ClientStore + ConnectionStore + ChannelStore,
{
    populate_clients(store, n)?;
    populate_connections(store, n)?;
    populate_channels(store, n)
}
