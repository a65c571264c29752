//! Byte store contract
//!
//! This module defines the `BytesBroker` and `BytesTxn` traits: the full
//! surface the typed layer needs from an underlying revisioned key-value
//! store. Implementations may be in-process (`agentkv-storage`'s
//! `MemoryStore`) or a client for a remote store; the typed layer does not
//! care which.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires `Send + Sync`).

use crate::contract::Revision;
use crate::error::Result;
use crate::options::{DeleteOptions, PutOptions};
use crate::watch::RawWatchReceiver;

/// A stored value together with its revision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    /// Stored bytes
    pub data: Vec<u8>,
    /// Revision of the key's latest modification
    pub revision: Revision,
}

/// One key-value pair of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesKeyVal {
    /// Full key (relative to the broker's scope)
    pub key: String,
    /// Stored bytes
    pub value: Vec<u8>,
    /// Revision of the key's latest modification
    pub revision: Revision,
}

/// Iterator over `(key, revision)` pairs of a listing
pub type BytesKeyIter = Box<dyn Iterator<Item = (String, Revision)> + Send>;

/// Iterator over key-value pairs of a listing
pub type BytesKeyValIter = Box<dyn Iterator<Item = BytesKeyVal> + Send>;

/// Revisioned byte-oriented key-value store
///
/// # Examples
///
/// ```ignore
/// use agentkv_core::{BytesBroker, PutOptions};
///
/// store.put("agent1/vpp/config/routes", bytes, &PutOptions::default())?;
/// if let Some(raw) = store.get("agent1/vpp/config/routes")? {
///     println!("{} bytes at {}", raw.data.len(), raw.revision);
/// }
/// ```
pub trait BytesBroker: Send + Sync {
    /// Write a value
    ///
    /// Options are interpreted by the store (TTL, conditional write).
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the write is rejected or the store fails.
    fn put(&self, key: &str, value: Vec<u8>, opts: &PutOptions) -> Result<()>;

    /// Read the latest value of a key
    ///
    /// Returns `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the read fails.
    fn get(&self, key: &str) -> Result<Option<RawValue>>;

    /// Delete a key (or every key under it with `DeleteOptions::prefix`)
    ///
    /// Returns whether anything existed.
    fn delete(&self, key: &str, opts: &DeleteOptions) -> Result<bool>;

    /// List keys under a prefix, without fetching values
    ///
    /// The listing is established with a single store round-trip; results
    /// are sorted by key.
    fn list_keys(&self, prefix: &str) -> Result<BytesKeyIter>;

    /// List key-value pairs under a prefix
    ///
    /// The listing is established with a single store round-trip; results
    /// are sorted by key.
    fn list_values(&self, prefix: &str) -> Result<BytesKeyValIter>;

    /// Subscribe to changes of every key under any of `prefixes`
    ///
    /// Events are delivered in the order the store applied them. The
    /// returned channel closes when the store is closed; dropping it ends
    /// the subscription.
    fn watch(&self, prefixes: &[String]) -> Result<RawWatchReceiver>;

    /// Start a transaction
    fn new_txn(&self) -> Box<dyn BytesTxn>;

    /// Close the connection
    ///
    /// Every view sharing this connection becomes unusable.
    fn close(&self) -> Result<()>;
}

/// Atomic batch of puts and deletes
///
/// Operations are buffered until `commit`; the store applies either all of
/// them or none.
pub trait BytesTxn: Send {
    /// Stage a put
    fn put(&mut self, key: &str, value: Vec<u8>);

    /// Stage a delete
    fn delete(&mut self, key: &str);

    /// Number of staged operations
    fn len(&self) -> usize;

    /// Whether nothing is staged
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every staged operation atomically
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the store rejects the batch; nothing is
    /// applied in that case.
    fn commit(self: Box<Self>) -> Result<()>;
}
