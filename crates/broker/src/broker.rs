//! TypedBroker: typed facade over a byte store
//!
//! ## Design
//!
//! `TypedBroker` is a stateless decorator. It holds an `Arc<dyn BytesBroker>`,
//! a serializer and a key prefix; every operation marshals or unmarshals at
//! the boundary and delegates to the byte store.
//!
//! ## Ownership
//!
//! The broker created with [`TypedBroker::new`] owns the connection. Scoped
//! views created with [`TypedBroker::new_broker`] share it without owning it:
//! only the owner may [`close`](TypedBroker::close), and closing invalidates
//! every view.
//!
//! ## API
//!
//! - **Single-Operation API**: `put`, `get`, `get_value`, `delete`
//! - **List Operations**: `list_values`, `list_keys` (lazy iterators)
//! - **Watch**: `watch`, `new_watcher`
//! - **Multi-Operation API**: `new_txn` with `TypedTxn`

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use agentkv_core::{
    BytesBroker, DeleteOptions, Error, PutOptions, Result, Revision, Serializer, SerializerKind,
    Versioned,
};

use crate::iter::{TypedKeyIter, TypedKeyValIter};
use crate::txn::TypedTxn;
use crate::watch::{forward, TypedWatchStream};

/// Whether a broker instance may close the shared connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Created directly over the store; may close it
    Owner,
    /// Scoped view sharing another broker's connection
    Shared,
}

/// Typed key-value broker
///
/// # Example
///
/// ```ignore
/// use agentkv_broker::TypedBroker;
/// use agentkv_storage::MemoryStore;
///
/// let broker = TypedBroker::new(Arc::new(MemoryStore::new()));
/// broker.put("agent1/vpp/config/interfaces/eth0", &iface, &PutOptions::default())?;
///
/// let agent1 = broker.new_broker("agent1/");
/// let iface: Option<Versioned<Interface>> = agent1.get("vpp/config/interfaces/eth0")?;
/// ```
pub struct TypedBroker<S = SerializerKind> {
    store: Arc<dyn BytesBroker>,
    serializer: S,
    prefix: String,
    ownership: Ownership,
}

impl TypedBroker<SerializerKind> {
    /// Create the owning broker with the default (MessagePack) serializer
    pub fn new(store: Arc<dyn BytesBroker>) -> Self {
        Self::with_serializer(store, SerializerKind::default())
    }
}

impl<S: Serializer> TypedBroker<S> {
    /// Create the owning broker with an explicit serializer
    pub fn with_serializer(store: Arc<dyn BytesBroker>, serializer: S) -> Self {
        Self {
            store,
            serializer,
            prefix: String::new(),
            ownership: Ownership::Owner,
        }
    }

    /// Key prefix this broker is scoped to
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this instance owns the connection
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// The serializer used at the boundary
    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // ========== Single-Operation API ==========

    /// Marshal `value` and write it under `key`
    ///
    /// Options are passed through to the store untouched.
    ///
    /// # Errors
    ///
    /// `Error::Encode` if the value cannot be marshaled (nothing is
    /// written), `Error::Store` if the write fails.
    pub fn put<M: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &M,
        opts: &PutOptions,
    ) -> Result<()> {
        let data = self.serializer.marshal(value)?;
        self.store.put(&self.full_key(key), data, opts)
    }

    /// Read and decode the value under `key`
    ///
    /// Returns `None` (not an error) when the key does not exist. The
    /// returned metadata carries `key` as given and the store revision.
    ///
    /// # Errors
    ///
    /// `Error::Store` if the read fails, `Error::Decode` if the bytes do not
    /// fit `M`.
    pub fn get<M: DeserializeOwned>(&self, key: &str) -> Result<Option<Versioned<M>>> {
        let raw = match self.store.get(&self.full_key(key))? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let value: M = self
            .serializer
            .unmarshal(&raw.data)
            .map_err(|e: Error| e.with_key(key))?;
        Ok(Some(Versioned::new(value, raw.revision, key)))
    }

    /// Read `key` into an existing message buffer
    ///
    /// Returns `(found, revision)`; `target` is untouched when not found.
    pub fn get_value<M: DeserializeOwned>(
        &self,
        key: &str,
        target: &mut M,
    ) -> Result<(bool, Revision)> {
        match self.get::<M>(key)? {
            Some(v) => {
                let rev = v.rev();
                *target = v.into_value();
                Ok((true, rev))
            }
            None => Ok((false, Revision::ZERO)),
        }
    }

    /// Delete `key`; returns whether it existed
    pub fn delete(&self, key: &str, opts: &DeleteOptions) -> Result<bool> {
        self.store.delete(&self.full_key(key), opts)
    }

    // ========== List Operations ==========

    /// Lazily iterate key-value pairs under `prefix`
    ///
    /// The listing costs one store round-trip; values are decoded only when
    /// the caller asks for them.
    pub fn list_values(&self, prefix: &str) -> Result<TypedKeyValIter<S>> {
        let inner = self.store.list_values(&self.full_key(prefix))?;
        Ok(TypedKeyValIter::new(
            inner,
            self.serializer.clone(),
            self.prefix.clone(),
        ))
    }

    /// Lazily iterate keys (and revisions) under `prefix` without fetching
    /// values
    pub fn list_keys(&self, prefix: &str) -> Result<TypedKeyIter> {
        let inner = self.store.list_keys(&self.full_key(prefix))?;
        Ok(TypedKeyIter::new(inner, self.prefix.clone()))
    }

    // ========== Watch ==========

    /// Subscribe to changes under each of `keys`
    ///
    /// Spawns one forwarding task that decodes raw events lazily and
    /// republishes them on the returned stream. Must be called from within
    /// a Tokio runtime.
    pub fn watch(&self, keys: &[&str]) -> Result<TypedWatchStream<S>> {
        let prefixes: Vec<String> = keys.iter().map(|k| self.full_key(k)).collect();
        let raw = self.store.watch(&prefixes)?;
        debug!(target: "agentkv::broker", ?prefixes, "Watch started");
        Ok(forward(raw, self.serializer.clone(), self.prefix.clone()))
    }

    /// Watch-only view scoped to `prefix`
    pub fn new_watcher(&self, prefix: &str) -> TypedWatcher<S> {
        TypedWatcher {
            store: Arc::clone(&self.store),
            serializer: self.serializer.clone(),
            prefix: self.full_key(prefix),
        }
    }

    // ========== Scoping & Lifetime ==========

    /// Create a view scoped to `prefix` sharing this broker's connection
    ///
    /// No new connection is opened. The view does not own the connection.
    pub fn new_broker(&self, prefix: &str) -> TypedBroker<S> {
        TypedBroker {
            store: Arc::clone(&self.store),
            serializer: self.serializer.clone(),
            prefix: self.full_key(prefix),
            ownership: Ownership::Shared,
        }
    }

    /// Start a typed transaction scoped to this broker's prefix
    pub fn new_txn(&self) -> TypedTxn<S> {
        TypedTxn::new(
            self.store.new_txn(),
            self.serializer.clone(),
            self.prefix.clone(),
        )
    }

    /// Close the underlying connection
    ///
    /// # Errors
    ///
    /// `Error::InvalidOperation` when called on a scoped view; only the
    /// owning broker may close the shared connection.
    pub fn close(&self) -> Result<()> {
        if self.ownership != Ownership::Owner {
            return Err(Error::InvalidOperation(format!(
                "broker scoped to '{}' does not own the connection",
                self.prefix
            )));
        }
        debug!(target: "agentkv::broker", "Closing connection");
        self.store.close()
    }
}

impl<S> std::fmt::Debug for TypedBroker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedBroker")
            .field("prefix", &self.prefix)
            .field("ownership", &self.ownership)
            .finish()
    }
}

/// Watch-only view over a shared connection
pub struct TypedWatcher<S = SerializerKind> {
    store: Arc<dyn BytesBroker>,
    serializer: S,
    prefix: String,
}

impl<S: Serializer> TypedWatcher<S> {
    /// Subscribe to changes under each of `keys` (relative to the view)
    pub fn watch(&self, keys: &[&str]) -> Result<TypedWatchStream<S>> {
        let prefixes: Vec<String> = keys
            .iter()
            .map(|k| format!("{}{}", self.prefix, k))
            .collect();
        let raw = self.store.watch(&prefixes)?;
        Ok(forward(raw, self.serializer.clone(), self.prefix.clone()))
    }

    /// Key prefix this watcher is scoped to
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
