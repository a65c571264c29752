//! Storage layer for agentkv
//!
//! This crate provides an in-process implementation of the `BytesBroker`
//! contract:
//! - MemoryStore: BTreeMap-based revisioned byte store with RwLock
//! - MemoryTxn: atomic batches applied under a single write lock
//! - Watch subscriptions over unbounded tokio channels
//! - Logical TTL expiration and conditional writes
//! - StoreStats: per-operation call counters
//!
//! It serves as the reference backend for the typed broker and as the test
//! double for everything built on top of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod stored_value;
pub mod txn;

pub use memory::{MemoryStore, StoreStats};
pub use stored_value::StoredValue;
pub use txn::MemoryTxn;
