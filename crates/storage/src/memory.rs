//! MemoryStore: in-process revisioned byte store
//!
//! This module implements the `BytesBroker` contract using:
//! - `BTreeMap<String, StoredValue>` for ordered key storage with TTL
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicI64` for the store-wide revision counter
//! - unbounded tokio channels for watch subscriptions
//!
//! # Design Notes
//!
//! - **Store-wide revisions**: every applied write or delete takes the next
//!   revision; all operations of one transaction share a single revision.
//! - **Ordered notification**: watchers are notified while the data write
//!   lock is held, so events arrive in exactly the order they were applied.
//! - **TTL expiration**: expired values are filtered at read time and
//!   removed by the next write, which first emits a `Delete` event for each
//!   at a revision of its own.
//! - **Shared handle**: `MemoryStore` is a cheap `Clone`; all clones share
//!   one connection, and `close` on any of them closes it for all.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::debug;

use agentkv_core::{
    watches_key, BytesBroker, BytesKeyIter, BytesKeyValIter, BytesKeyVal, BytesTxn,
    DeleteOptions, Error, PutOptions, RawValue, RawWatchEvent, RawWatchReceiver, RawWatchSender,
    Result, Revision,
};

use crate::stored_value::StoredValue;
use crate::txn::{MemoryTxn, TxnOp};

/// Snapshot of the store's operation counters
///
/// Counters are incremented on every call, including calls that fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `get` calls
    pub gets: u64,
    /// `put` calls
    pub puts: u64,
    /// `delete` calls
    pub deletes: u64,
    /// `list_keys` + `list_values` calls
    pub lists: u64,
    /// `watch` calls
    pub watches: u64,
    /// transaction commits
    pub txns: u64,
}

/// Operation counters - Relaxed ordering, purely observational
#[derive(Debug, Default)]
struct Counters {
    gets: AtomicU64,
    puts: AtomicU64,
    deletes: AtomicU64,
    lists: AtomicU64,
    watches: AtomicU64,
    txns: AtomicU64,
}

#[derive(Debug)]
struct Watcher {
    prefixes: Vec<String>,
    tx: RawWatchSender,
}

#[derive(Debug)]
pub(crate) struct StoreInner {
    data: RwLock<BTreeMap<String, StoredValue>>,
    watchers: Mutex<Vec<Watcher>>,
    revision: AtomicI64,
    closed: AtomicBool,
    available: AtomicBool,
    counters: Counters,
}

impl StoreInner {
    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(Error::store("store unavailable"));
        }
        Ok(())
    }

    /// Allocate the next revision
    ///
    /// Must be called with the data write lock held so that revision order
    /// matches apply order.
    fn next_revision(&self) -> Revision {
        Revision(self.revision.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Deliver events to every matching watcher, dropping closed ones
    ///
    /// Called with the data write lock held.
    fn notify(&self, events: &[RawWatchEvent]) {
        if events.is_empty() {
            return;
        }
        let mut watchers = self.watchers.lock();
        watchers.retain(|w| {
            for event in events {
                if watches_key(&w.prefixes, &event.key) && w.tx.send(event.clone()).is_err() {
                    return false;
                }
            }
            !w.tx.is_closed()
        });
    }

    /// Remove expired entries and notify their deletion
    ///
    /// Called with the data write lock held, before the caller's own write.
    fn reap_expired(&self, data: &mut BTreeMap<String, StoredValue>) {
        let expired: Vec<String> = data
            .iter()
            .filter(|(_, v)| v.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        if expired.is_empty() {
            return;
        }

        let revision = self.next_revision();
        let events: Vec<RawWatchEvent> = expired
            .into_iter()
            .map(|k| {
                data.remove(&k);
                RawWatchEvent::delete(k, revision)
            })
            .collect();
        debug!(target: "agentkv::store", %revision, expired = events.len(), "Reaped expired keys");
        self.notify(&events);
    }

    fn live_keys_with_prefix<'a>(
        data: &'a BTreeMap<String, StoredValue>,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a StoredValue)> + 'a {
        data.range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .filter(|(_, v)| !v.is_expired())
    }

    pub(crate) fn commit(&self, ops: Vec<TxnOp>) -> Result<()> {
        self.counters.txns.fetch_add(1, Ordering::Relaxed);
        self.check_open()?;

        let mut data = self.data.write();
        self.reap_expired(&mut data);
        let revision = self.next_revision();
        let mut events = Vec::with_capacity(ops.len());

        for op in ops {
            match op {
                TxnOp::Put { key, value } => {
                    data.insert(key.clone(), StoredValue::new(value.clone(), revision, None));
                    events.push(RawWatchEvent::put(key, value, revision));
                }
                TxnOp::Delete { key } => {
                    if data.remove(&key).is_some() {
                        events.push(RawWatchEvent::delete(key, revision));
                    }
                }
            }
        }

        debug!(target: "agentkv::store", %revision, ops = events.len(), "Transaction committed");
        self.notify(&events);
        Ok(())
    }
}

/// In-process revisioned byte store
///
/// Implements `BytesBroker`. Thread-safe through `parking_lot` locks and
/// atomics; clones share the same data, watchers and connection state.
///
/// # Example
///
/// ```
/// use agentkv_core::{BytesBroker, PutOptions};
/// use agentkv_storage::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.put("agent1/vpp/config/routes", vec![1, 2, 3], &PutOptions::default()).unwrap();
/// let raw = store.get("agent1/vpp/config/routes").unwrap().unwrap();
/// assert_eq!(raw.revision.as_i64(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    /// Create a new empty store
    ///
    /// The first write gets revision 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                data: RwLock::new(BTreeMap::new()),
                watchers: Mutex::new(Vec::new()),
                revision: AtomicI64::new(0),
                closed: AtomicBool::new(false),
                available: AtomicBool::new(true),
                counters: Counters::default(),
            }),
        }
    }

    /// Highest revision allocated so far
    pub fn current_revision(&self) -> Revision {
        Revision(self.inner.revision.load(Ordering::SeqCst))
    }

    /// Number of live (non-expired) keys
    pub fn len(&self) -> usize {
        self.inner
            .data
            .read()
            .values()
            .filter(|v| !v.is_expired())
            .count()
    }

    /// Whether the store holds no live keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `close` has been called on any handle
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of active watch subscriptions
    ///
    /// Subscriptions whose receiver has been dropped are pruned first.
    pub fn watcher_count(&self) -> usize {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| !w.tx.is_closed());
        watchers.len()
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> StoreStats {
        let c = &self.inner.counters;
        StoreStats {
            gets: c.gets.load(Ordering::Relaxed),
            puts: c.puts.load(Ordering::Relaxed),
            deletes: c.deletes.load(Ordering::Relaxed),
            lists: c.lists.load(Ordering::Relaxed),
            watches: c.watches.load(Ordering::Relaxed),
            txns: c.txns.load(Ordering::Relaxed),
        }
    }

    /// Simulate an outage: while unavailable every operation fails with
    /// `Error::Store`
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BytesBroker for MemoryStore {
    fn put(&self, key: &str, value: Vec<u8>, opts: &PutOptions) -> Result<()> {
        self.inner.counters.puts.fetch_add(1, Ordering::Relaxed);
        self.inner.check_open()?;

        let mut data = self.inner.data.write();
        self.inner.reap_expired(&mut data);

        if let Some(expected) = opts.prev_revision {
            let current = data
                .get(key)
                .filter(|v| !v.is_expired())
                .map(|v| v.revision())
                .unwrap_or(Revision::ZERO);
            if current != expected {
                return Err(Error::store(format!(
                    "revision mismatch on '{}': expected {}, found {}",
                    key, expected, current
                )));
            }
        }

        let revision = self.inner.next_revision();
        data.insert(
            key.to_string(),
            StoredValue::new(value.clone(), revision, opts.ttl),
        );
        self.inner
            .notify(&[RawWatchEvent::put(key, value, revision)]);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<RawValue>> {
        self.inner.counters.gets.fetch_add(1, Ordering::Relaxed);
        self.inner.check_open()?;

        let data = self.inner.data.read();
        Ok(data
            .get(key)
            .filter(|v| !v.is_expired())
            .map(StoredValue::to_raw))
    }

    fn delete(&self, key: &str, opts: &DeleteOptions) -> Result<bool> {
        self.inner.counters.deletes.fetch_add(1, Ordering::Relaxed);
        self.inner.check_open()?;

        let mut data = self.inner.data.write();
        self.inner.reap_expired(&mut data);
        let doomed: Vec<String> = if opts.prefix {
            StoreInner::live_keys_with_prefix(&data, key)
                .map(|(k, _)| k.clone())
                .collect()
        } else {
            data.get(key)
                .filter(|v| !v.is_expired())
                .map(|_| vec![key.to_string()])
                .unwrap_or_default()
        };

        if doomed.is_empty() {
            return Ok(false);
        }

        let revision = self.inner.next_revision();
        let events: Vec<RawWatchEvent> = doomed
            .into_iter()
            .map(|k| {
                data.remove(&k);
                RawWatchEvent::delete(k, revision)
            })
            .collect();
        self.inner.notify(&events);
        Ok(true)
    }

    fn list_keys(&self, prefix: &str) -> Result<BytesKeyIter> {
        self.inner.counters.lists.fetch_add(1, Ordering::Relaxed);
        self.inner.check_open()?;

        let data = self.inner.data.read();
        let keys: Vec<(String, Revision)> = StoreInner::live_keys_with_prefix(&data, prefix)
            .map(|(k, v)| (k.clone(), v.revision()))
            .collect();
        Ok(Box::new(keys.into_iter()))
    }

    fn list_values(&self, prefix: &str) -> Result<BytesKeyValIter> {
        self.inner.counters.lists.fetch_add(1, Ordering::Relaxed);
        self.inner.check_open()?;

        let data = self.inner.data.read();
        let pairs: Vec<BytesKeyVal> = StoreInner::live_keys_with_prefix(&data, prefix)
            .map(|(k, v)| BytesKeyVal {
                key: k.clone(),
                value: v.data().to_vec(),
                revision: v.revision(),
            })
            .collect();
        Ok(Box::new(pairs.into_iter()))
    }

    fn watch(&self, prefixes: &[String]) -> Result<RawWatchReceiver> {
        self.inner.counters.watches.fetch_add(1, Ordering::Relaxed);
        self.inner.check_open()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watchers = self.inner.watchers.lock();
        // `close` flips the flag under this lock, so a subscription is either
        // refused here or cleared by `close`
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        watchers.push(Watcher {
            prefixes: prefixes.to_vec(),
            tx,
        });
        drop(watchers);
        debug!(target: "agentkv::store", ?prefixes, "Watch registered");
        Ok(rx)
    }

    fn new_txn(&self) -> Box<dyn BytesTxn> {
        Box::new(MemoryTxn::new(Arc::clone(&self.inner)))
    }

    fn close(&self) -> Result<()> {
        let mut watchers = self.inner.watchers.lock();
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            // Dropping the senders ends every subscription
            watchers.clear();
            debug!(target: "agentkv::store", "Store closed");
        }
        Ok(())
    }
}
