//! Core types and traits for IBC state snapshots
//!
//! This crate defines the foundational types used throughout the system:
//! - Height: revision-aware height keying consensus states
//! - Records: client, connection and channel records carried by snapshots
//! - Key: store key layout shared by record stores
//! - Traits: record store capabilities (ClientStore, ConnectionStore, ChannelStore)
//! - Codec: BinaryCodec seam for record marshalling
//! - Error: Error type for stores and codecs

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod key;
pub mod records;
pub mod traits;
pub mod types;

pub use codec::{BinaryCodec, BincodeCodec};
pub use error::{Error, Result};
pub use records::{
    ClientConsensusStates, ClientParams, ClientState, ConnectionEnd, ConnectionParams,
    ConnectionPaths, ConsensusStateWithHeight, GenesisMetadata, IdentifiedChannel,
    IdentifiedClientState, IdentifiedConnection, IdentifiedGenesisMetadata, PacketSequence,
    PacketState,
};
pub use traits::{ChannelStore, ClientStore, ConnectionStore};
pub use types::{validate_identifier, Height, MAX_IDENTIFIER_LEN};
