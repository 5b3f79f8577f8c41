//! Channel and packet registry records

use serde::{Deserialize, Serialize};

use crate::records::opaque_bytes;

/// Channel end keyed by port and channel identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedChannel {
    /// Port identifier
    pub port_id: String,
    /// Channel identifier
    pub channel_id: String,
    /// Opaque channel end
    #[serde(with = "opaque_bytes")]
    pub channel: Vec<u8>,
}

impl IdentifiedChannel {
    /// Create an identified channel
    pub fn new(port_id: impl Into<String>, channel_id: impl Into<String>, channel: Vec<u8>) -> Self {
        IdentifiedChannel {
            port_id: port_id.into(),
            channel_id: channel_id.into(),
            channel,
        }
    }
}

/// Per-packet state: acknowledgement, commitment or receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketState {
    /// Port identifier
    pub port_id: String,
    /// Channel identifier
    pub channel_id: String,
    /// Packet sequence number
    pub sequence: u64,
    /// Opaque packet data (ack hash, commitment hash, receipt marker)
    #[serde(with = "opaque_bytes")]
    pub data: Vec<u8>,
}

impl PacketState {
    /// Create a packet state
    pub fn new(
        port_id: impl Into<String>,
        channel_id: impl Into<String>,
        sequence: u64,
        data: Vec<u8>,
    ) -> Self {
        PacketState {
            port_id: port_id.into(),
            channel_id: channel_id.into(),
            sequence,
            data,
        }
    }

    /// Composite key `(port, channel, sequence)`
    pub fn key(&self) -> (&str, &str, u64) {
        (&self.port_id, &self.channel_id, self.sequence)
    }
}

/// Next packet sequence of one channel (send, recv or ack table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketSequence {
    /// Port identifier
    pub port_id: String,
    /// Channel identifier
    pub channel_id: String,
    /// Next sequence number
    pub sequence: u64,
}

impl PacketSequence {
    /// Create a packet sequence
    pub fn new(port_id: impl Into<String>, channel_id: impl Into<String>, sequence: u64) -> Self {
        PacketSequence {
            port_id: port_id.into(),
            channel_id: channel_id.into(),
            sequence,
        }
    }
}
