//! Client registry records

use serde::{Deserialize, Serialize};

use crate::records::opaque_bytes;
use crate::types::Height;

/// Light client state
///
/// `client_type` names the light-client implementation and is checked
/// against [`ClientParams::allowed_clients`] before installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    /// Light-client implementation type (e.g. `07-tendermint`)
    pub client_type: String,
    /// Opaque implementation-specific state
    #[serde(with = "opaque_bytes")]
    pub data: Vec<u8>,
}

impl ClientState {
    /// Create a client state
    pub fn new(client_type: impl Into<String>, data: Vec<u8>) -> Self {
        ClientState {
            client_type: client_type.into(),
            data,
        }
    }
}

/// Client state keyed by client identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedClientState {
    /// Client identifier
    pub client_id: String,
    /// The client state
    pub client_state: ClientState,
}

impl IdentifiedClientState {
    /// Create an identified client state
    pub fn new(client_id: impl Into<String>, client_state: ClientState) -> Self {
        IdentifiedClientState {
            client_id: client_id.into(),
            client_state,
        }
    }
}

/// One metadata entry in a client's key space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisMetadata {
    /// Path relative to the client's key prefix
    pub key: String,
    /// Stored value
    #[serde(with = "opaque_bytes")]
    pub value: Vec<u8>,
}

impl GenesisMetadata {
    /// Create a metadata entry
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        GenesisMetadata {
            key: key.into(),
            value,
        }
    }
}

/// All metadata entries of one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedGenesisMetadata {
    /// Client identifier
    pub client_id: String,
    /// Metadata entries in key order
    pub client_metadata: Vec<GenesisMetadata>,
}

/// Consensus state at one height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusStateWithHeight {
    /// Height the consensus state was recorded at
    pub height: Height,
    /// Opaque consensus state
    #[serde(with = "opaque_bytes")]
    pub consensus_state: Vec<u8>,
}

/// All consensus states of one client, ordered by height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConsensusStates {
    /// Client identifier
    pub client_id: String,
    /// Consensus states in ascending height order
    pub consensus_states: Vec<ConsensusStateWithHeight>,
}

/// Client registry parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientParams {
    /// Light-client types that may be installed
    pub allowed_clients: Vec<String>,
}

impl ClientParams {
    /// Create params with the given allowlist
    pub fn new<I, S>(allowed_clients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ClientParams {
            allowed_clients: allowed_clients.into_iter().map(Into::into).collect(),
        }
    }

    /// True if `client_type` is on the allowlist
    ///
    /// Matching is exact; an empty type is never allowed.
    pub fn is_allowed_client(&self, client_type: &str) -> bool {
        !client_type.is_empty() && self.allowed_clients.iter().any(|c| c == client_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist() {
        let params = ClientParams::new(["06-solomachine", "07-tendermint"]);
        assert!(params.is_allowed_client("07-tendermint"));
        assert!(!params.is_allowed_client("09-localhost"));
        assert!(!params.is_allowed_client(""));
        assert!(!ClientParams::default().is_allowed_client("07-tendermint"));
    }
}
