//! Record codec abstraction
//!
//! Every record that crosses the legacy file format goes through a
//! [`BinaryCodec`]. A decode failure means on-disk corruption or a schema
//! mismatch and is reported as an error, never a panic.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Binary record codec
pub trait BinaryCodec<T> {
    /// Encode a record to bytes
    fn encode(&self, record: &T) -> Result<Vec<u8>>;

    /// Decode a record from bytes
    fn decode(&self, bytes: &[u8]) -> Result<T>;

    /// Unique codec identifier
    fn codec_id(&self) -> &str;
}

/// Bincode codec for any serde record
pub struct BincodeCodec<T> {
    _record: PhantomData<fn() -> T>,
}

impl<T> BincodeCodec<T> {
    /// Create a bincode codec
    pub fn new() -> Self {
        BincodeCodec {
            _record: PhantomData,
        }
    }
}

impl<T> Default for BincodeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BincodeCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for BincodeCodec<T> {}

impl<T> fmt::Debug for BincodeCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BincodeCodec")
            .field("record", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> BinaryCodec<T> for BincodeCodec<T> {
    fn encode(&self, record: &T) -> Result<Vec<u8>> {
        Ok(bincode::serialize(record)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes).map_err(|e| {
            Error::Corruption(format!(
                "cannot decode {} from {} bytes: {}",
                std::any::type_name::<T>(),
                bytes.len(),
                e
            ))
        })
    }

    fn codec_id(&self) -> &str {
        "bincode"
    }
}
