//! Record types carried by snapshots
//!
//! These are the canonical records of the three subsystems. Their payloads
//! (client states, consensus states, connection and channel ends, packet data)
//! are opaque bytes owned by the protocol layer; this crate only keys and
//! moves them.
//!
//! - `client`: client states, client metadata, consensus states, client params
//! - `connection`: connection ends, client connection paths, connection params
//! - `channel`: channel ends, packet states, packet sequences

pub mod channel;
pub mod client;
pub mod connection;

pub use channel::{IdentifiedChannel, PacketSequence, PacketState};
pub use client::{
    ClientConsensusStates, ClientParams, ClientState, ConsensusStateWithHeight, GenesisMetadata,
    IdentifiedClientState, IdentifiedGenesisMetadata,
};
pub use connection::{ConnectionEnd, ConnectionParams, ConnectionPaths, IdentifiedConnection};

/// Serde adapter for opaque payload bytes
///
/// Human-readable formats (the JSON genesis envelope) carry payloads as
/// standard base64 strings; binary formats carry raw bytes.
pub mod opaque_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serialize payload bytes
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&BASE64.encode(bytes))
        } else {
            serializer.serialize_bytes(bytes)
        }
    }

    /// Deserialize payload bytes
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        if deserializer.is_human_readable() {
            let encoded = String::deserialize(deserializer)?;
            BASE64
                .decode(encoded.as_bytes())
                .map_err(|e| de::Error::custom(format!("invalid base64: {}", e)))
        } else {
            Vec::<u8>::deserialize(deserializer)
        }
    }
}
