//! Store key layout
//!
//! Records live in an ordered key space addressed by `/`-separated paths.
//! The layout mirrors the IBC host store:
//!
//! ```text
//! clients/{client-id}/clientState
//! clients/{client-id}/consensusStates/{height}
//! clients/{client-id}/connections
//! clients/{client-id}/{metadata-key}            (any other suffix)
//! connections/{connection-id}
//! channelEnds/ports/{port-id}/channels/{channel-id}
//! acks/ports/{port-id}/channels/{channel-id}/sequences/{seq}
//! commitments/ports/{port-id}/channels/{channel-id}/sequences/{seq}
//! receipts/ports/{port-id}/channels/{channel-id}/sequences/{seq}
//! nextSequenceSend/ports/{port-id}/channels/{channel-id}
//! nextSequenceRecv/ports/{port-id}/channels/{channel-id}
//! nextSequenceAck/ports/{port-id}/channels/{channel-id}
//! ```
//!
//! Client metadata shares the per-client key space with the client state.
//! A metadata entry named `clientState` therefore aliases the client state
//! key; replay must write metadata first so the client state wins.

use crate::types::Height;

/// Prefix of the per-client key space
pub const KEY_CLIENT_STORE_PREFIX: &str = "clients";
/// Per-client suffix holding the client state
pub const KEY_CLIENT_STATE: &str = "clientState";
/// Per-client suffix prefix holding consensus states
pub const KEY_CONSENSUS_STATE_PREFIX: &str = "consensusStates";
/// Per-client suffix holding the client's connection paths
pub const KEY_CLIENT_CONNECTIONS: &str = "connections";
/// Prefix of connection ends
pub const KEY_CONNECTION_PREFIX: &str = "connections";
/// Prefix of channel ends
pub const KEY_CHANNEL_END_PREFIX: &str = "channelEnds";
/// Prefix of packet acknowledgements
pub const KEY_PACKET_ACK_PREFIX: &str = "acks";
/// Prefix of packet commitments
pub const KEY_PACKET_COMMITMENT_PREFIX: &str = "commitments";
/// Prefix of packet receipts
pub const KEY_PACKET_RECEIPT_PREFIX: &str = "receipts";
/// Prefix of next-send sequences
pub const KEY_NEXT_SEQ_SEND_PREFIX: &str = "nextSequenceSend";
/// Prefix of next-recv sequences
pub const KEY_NEXT_SEQ_RECV_PREFIX: &str = "nextSequenceRecv";
/// Prefix of next-ack sequences
pub const KEY_NEXT_SEQ_ACK_PREFIX: &str = "nextSequenceAck";
/// Next client sequence counter
pub const KEY_NEXT_CLIENT_SEQUENCE: &str = "nextClientSequence";
/// Next connection sequence counter
pub const KEY_NEXT_CONNECTION_SEQUENCE: &str = "nextConnectionSequence";
/// Next channel sequence counter
pub const KEY_NEXT_CHANNEL_SEQUENCE: &str = "nextChannelSequence";
/// Client parameters
pub const KEY_CLIENT_PARAMS: &str = "params/client";
/// Connection parameters
pub const KEY_CONNECTION_PARAMS: &str = "params/connection";

/// Prefix covering every key of one client: `clients/{id}/`
pub fn client_prefix(client_id: &str) -> String {
    format!("{KEY_CLIENT_STORE_PREFIX}/{client_id}/")
}

/// Key of a path inside a client's key space
pub fn full_client_key(client_id: &str, path: &str) -> String {
    format!("{}{path}", client_prefix(client_id))
}

/// `clients/{id}/clientState`
pub fn client_state_key(client_id: &str) -> String {
    full_client_key(client_id, KEY_CLIENT_STATE)
}

/// `clients/{id}/consensusStates/{height}`
pub fn consensus_state_key(client_id: &str, height: Height) -> String {
    full_client_key(client_id, &consensus_state_path(height))
}

/// `consensusStates/{height}`
pub fn consensus_state_path(height: Height) -> String {
    format!("{KEY_CONSENSUS_STATE_PREFIX}/{height}")
}

/// `clients/{id}/connections`
pub fn client_connections_key(client_id: &str) -> String {
    full_client_key(client_id, KEY_CLIENT_CONNECTIONS)
}

/// `connections/{id}`
pub fn connection_key(connection_id: &str) -> String {
    format!("{KEY_CONNECTION_PREFIX}/{connection_id}")
}

/// `ports/{port}/channels/{channel}`
pub fn channel_path(port_id: &str, channel_id: &str) -> String {
    format!("ports/{port_id}/channels/{channel_id}")
}

/// `channelEnds/ports/{port}/channels/{channel}`
pub fn channel_key(port_id: &str, channel_id: &str) -> String {
    format!("{KEY_CHANNEL_END_PREFIX}/{}", channel_path(port_id, channel_id))
}

/// `{prefix}/ports/{port}/channels/{channel}/sequences/{sequence}`
pub fn packet_key(prefix: &str, port_id: &str, channel_id: &str, sequence: u64) -> String {
    format!(
        "{prefix}/{}/sequences/{sequence}",
        channel_path(port_id, channel_id)
    )
}

/// `{prefix}/ports/{port}/channels/{channel}`
pub fn sequence_key(prefix: &str, port_id: &str, channel_id: &str) -> String {
    format!("{prefix}/{}", channel_path(port_id, channel_id))
}

/// Split `clients/{id}/{rest}` into `(id, rest)`
pub fn parse_client_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(KEY_CLIENT_STORE_PREFIX)?.strip_prefix('/')?;
    let (client_id, path) = rest.split_once('/')?;
    if client_id.is_empty() || path.is_empty() {
        return None;
    }
    Some((client_id, path))
}

/// Parse a per-client suffix `consensusStates/{height}`
///
/// Returns `None` for deeper paths such as
/// `consensusStates/{height}/processedTime`, which are metadata, and for
/// non-canonical heights such as `01-5` that no consensus state write
/// produces.
pub fn parse_consensus_state_path(path: &str) -> Option<Height> {
    let segment = path
        .strip_prefix(KEY_CONSENSUS_STATE_PREFIX)?
        .strip_prefix('/')?;
    if segment.contains('/') {
        return None;
    }
    let height: Height = segment.parse().ok()?;
    (height.to_string() == segment).then_some(height)
}

/// True for per-client suffixes owned by a dedicated section
///
/// Everything else under `clients/{id}/` is client metadata.
pub fn is_reserved_client_path(path: &str) -> bool {
    path == KEY_CLIENT_STATE
        || path == KEY_CLIENT_CONNECTIONS
        || parse_consensus_state_path(path).is_some()
}

/// Parse `{prefix}/ports/{port}/channels/{channel}` into `(port, channel)`
pub fn parse_channel_key<'a>(prefix: &str, key: &'a str) -> Option<(&'a str, &'a str)> {
    let rest = key.strip_prefix(prefix)?.strip_prefix("/ports/")?;
    let (port_id, rest) = rest.split_once('/')?;
    let channel_id = rest.strip_prefix("channels/")?;
    if port_id.is_empty() || channel_id.is_empty() || channel_id.contains('/') {
        return None;
    }
    Some((port_id, channel_id))
}

/// Parse `{prefix}/ports/{port}/channels/{channel}/sequences/{seq}`
pub fn parse_packet_key<'a>(prefix: &str, key: &'a str) -> Option<(&'a str, &'a str, u64)> {
    let (channel_part, sequence) = key.rsplit_once("/sequences/")?;
    let (port_id, channel_id) = parse_channel_key(prefix, channel_part)?;
    let sequence = sequence.parse().ok()?;
    Some((port_id, channel_id, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keys() {
        assert_eq!(client_state_key("07-tendermint-0"), "clients/07-tendermint-0/clientState");
        assert_eq!(
            consensus_state_key("07-tendermint-0", Height::new(1, 5)),
            "clients/07-tendermint-0/consensusStates/1-5"
        );
        assert_eq!(
            parse_client_key("clients/07-tendermint-0/clientState"),
            Some(("07-tendermint-0", "clientState"))
        );
        assert_eq!(parse_client_key("connections/connection-0"), None);
        assert_eq!(parse_client_key("clients/x"), None);
    }

    #[test]
    fn test_consensus_state_path() {
        assert_eq!(
            parse_consensus_state_path("consensusStates/1-5"),
            Some(Height::new(1, 5))
        );
        assert_eq!(parse_consensus_state_path("consensusStates/1-5/processedTime"), None);
        assert_eq!(parse_consensus_state_path("clientState"), None);
    }

    #[test]
    fn test_consensus_state_path_rejects_non_canonical_height() {
        for path in ["consensusStates/01-5", "consensusStates/+1-5", "consensusStates/1-05"] {
            assert_eq!(parse_consensus_state_path(path), None, "{path}");
            assert!(!is_reserved_client_path(path), "{path}");
        }
    }

    #[test]
    fn test_reserved_client_paths() {
        assert!(is_reserved_client_path("clientState"));
        assert!(is_reserved_client_path("connections"));
        assert!(is_reserved_client_path("consensusStates/0-1"));
        assert!(!is_reserved_client_path("consensusStates/0-1/processedTime"));
        assert!(!is_reserved_client_path("iterateConsensusStates"));
    }

    #[test]
    fn test_channel_keys() {
        let key = channel_key("transfer", "channel-0");
        assert_eq!(key, "channelEnds/ports/transfer/channels/channel-0");
        assert_eq!(
            parse_channel_key(KEY_CHANNEL_END_PREFIX, &key),
            Some(("transfer", "channel-0"))
        );
        assert_eq!(parse_channel_key(KEY_PACKET_ACK_PREFIX, &key), None);
    }

    #[test]
    fn test_packet_keys() {
        let key = packet_key(KEY_PACKET_COMMITMENT_PREFIX, "transfer", "channel-3", 42);
        assert_eq!(key, "commitments/ports/transfer/channels/channel-3/sequences/42");
        assert_eq!(
            parse_packet_key(KEY_PACKET_COMMITMENT_PREFIX, &key),
            Some(("transfer", "channel-3", 42))
        );
        assert_eq!(parse_packet_key(KEY_PACKET_RECEIPT_PREFIX, &key), None);
        assert_eq!(
            parse_packet_key(KEY_PACKET_COMMITMENT_PREFIX, "commitments/ports/p/channels/c/sequences/x"),
            None
        );
    }
}
