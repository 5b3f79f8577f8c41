//! Storage layer for IBC snapshots
//!
//! This crate provides the reference record store:
//! - MemoryStore: BTreeMap-based ordered key space behind a `parking_lot::RwLock`,
//!   implementing `ClientStore`, `ConnectionStore` and `ChannelStore`
//!
//! The snapshot engine only depends on the store traits; this backend exists
//! for embedding, tooling and tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;

pub use memory::{MemoryStore, RECEIPT_MARKER};
