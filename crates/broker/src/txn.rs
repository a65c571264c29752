//! Typed transactions
//!
//! `TypedTxn` marshals each staged value eagerly and buffers the bytes in
//! the store transaction. The first encode failure is remembered; `commit`
//! then reports it and sends nothing, so a batch is never half-encoded.

use serde::Serialize;
use tracing::debug;

use agentkv_core::{BytesTxn, Error, Result, Serializer};

/// Pending typed transaction
pub struct TypedTxn<S> {
    txn: Box<dyn BytesTxn>,
    serializer: S,
    prefix: String,
    error: Option<Error>,
}

impl<S: Serializer> TypedTxn<S> {
    pub(crate) fn new(txn: Box<dyn BytesTxn>, serializer: S, prefix: String) -> Self {
        Self {
            txn,
            serializer,
            prefix,
            error: None,
        }
    }

    /// Stage a put of `value` under `key`
    pub fn put<M: Serialize + ?Sized>(&mut self, key: &str, value: &M) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.serializer.marshal(value) {
            Ok(data) => self.txn.put(&format!("{}{}", self.prefix, key), data),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Stage a delete of `key`
    pub fn delete(&mut self, key: &str) -> &mut Self {
        if self.error.is_none() {
            self.txn.delete(&format!("{}{}", self.prefix, key));
        }
        self
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.txn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txn.is_empty()
    }

    /// Apply every staged operation atomically
    ///
    /// # Errors
    ///
    /// `Error::Encode` if any staged value failed to marshal (the store is
    /// not contacted), otherwise whatever the store returns.
    pub fn commit(self) -> Result<()> {
        if let Some(err) = self.error {
            debug!(target: "agentkv::broker", error = %err, "Transaction dropped before commit");
            return Err(err);
        }
        self.txn.commit()
    }
}

impl<S> std::fmt::Debug for TypedTxn<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedTxn")
            .field("prefix", &self.prefix)
            .field("staged", &self.txn.len())
            .field("failed", &self.error.is_some())
            .finish()
    }
}
