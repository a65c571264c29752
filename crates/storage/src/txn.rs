//! Transactions for MemoryStore
//!
//! A `MemoryTxn` buffers puts and deletes in order and applies them under a
//! single write lock on commit, so no reader or watcher can observe a
//! partially applied batch.

use std::sync::Arc;

use agentkv_core::{BytesTxn, Result};

use crate::memory::StoreInner;

/// A buffered operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TxnOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

/// Pending transaction against a `MemoryStore`
#[derive(Debug)]
pub struct MemoryTxn {
    store: Arc<StoreInner>,
    ops: Vec<TxnOp>,
}

impl MemoryTxn {
    pub(crate) fn new(store: Arc<StoreInner>) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }
}

impl BytesTxn for MemoryTxn {
    fn put(&mut self, key: &str, value: Vec<u8>) {
        self.ops.push(TxnOp::Put {
            key: key.to_string(),
            value,
        });
    }

    fn delete(&mut self, key: &str) {
        self.ops.push(TxnOp::Delete {
            key: key.to_string(),
        });
    }

    fn len(&self) -> usize {
        self.ops.len()
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTxn { store, ops } = *self;
        store.commit(ops)
    }
}
