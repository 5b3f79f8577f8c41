//! Connection registry records

use serde::{Deserialize, Serialize};

use crate::records::opaque_bytes;

/// Connection end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEnd {
    /// Client the connection is built on
    pub client_id: String,
    /// Opaque connection state (counterparty, versions, delay period)
    #[serde(with = "opaque_bytes")]
    pub data: Vec<u8>,
}

impl ConnectionEnd {
    /// Create a connection end
    pub fn new(client_id: impl Into<String>, data: Vec<u8>) -> Self {
        ConnectionEnd {
            client_id: client_id.into(),
            data,
        }
    }
}

/// Connection end keyed by connection identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedConnection {
    /// Connection identifier
    pub connection_id: String,
    /// The connection end
    pub connection_end: ConnectionEnd,
}

impl IdentifiedConnection {
    /// Create an identified connection
    pub fn new(connection_id: impl Into<String>, connection_end: ConnectionEnd) -> Self {
        IdentifiedConnection {
            connection_id: connection_id.into(),
            connection_end,
        }
    }
}

/// Connection identifiers built on one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPaths {
    /// Client identifier
    pub client_id: String,
    /// Connection identifiers
    pub paths: Vec<String>,
}

/// Connection registry parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Expected block time in nanoseconds, used to derive block delays
    pub max_expected_time_per_block: u64,
}
