//! Typed iterators over store listings
//!
//! Both iterators are single-pass adapters over the listing the store
//! produced in one round-trip. Nothing is decoded up front:
//! `TypedKeyVal::decode` runs the serializer only when the caller asks, so
//! iterating N items costs at most N decodes, and `TypedKeyIter` never
//! touches values at all.

use serde::de::DeserializeOwned;

use agentkv_core::{BytesKeyIter, BytesKeyValIter, Error, Result, Revision, Serializer, Versioned};

fn strip_scope(key: String, scope: &str) -> String {
    match key.strip_prefix(scope) {
        Some(rest) if !scope.is_empty() => rest.to_string(),
        _ => key,
    }
}

/// One listed key-value pair with deferred decoding
#[derive(Debug, Clone)]
pub struct TypedKeyVal<S> {
    key: String,
    value: Vec<u8>,
    revision: Revision,
    serializer: S,
}

impl<S: Serializer> TypedKeyVal<S> {
    /// Key relative to the broker's scope
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Revision of the key's latest modification
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Undecoded bytes
    pub fn raw(&self) -> &[u8] {
        &self.value
    }

    /// Decode the value into `M`
    pub fn decode<M: DeserializeOwned>(&self) -> Result<M> {
        self.serializer
            .unmarshal(&self.value)
            .map_err(|e: Error| e.with_key(&self.key))
    }

    /// Decode the value into `M` together with its store metadata
    pub fn decode_versioned<M: DeserializeOwned>(&self) -> Result<Versioned<M>> {
        let value: M = self.decode()?;
        Ok(Versioned::new(value, self.revision, self.key.clone()))
    }
}

/// Iterator returned by `TypedBroker::list_values`
pub struct TypedKeyValIter<S> {
    inner: BytesKeyValIter,
    serializer: S,
    scope: String,
}

impl<S: Serializer> TypedKeyValIter<S> {
    pub(crate) fn new(inner: BytesKeyValIter, serializer: S, scope: String) -> Self {
        Self {
            inner,
            serializer,
            scope,
        }
    }
}

impl<S: Serializer> Iterator for TypedKeyValIter<S> {
    type Item = TypedKeyVal<S>;

    fn next(&mut self) -> Option<Self::Item> {
        let kv = self.inner.next()?;
        Some(TypedKeyVal {
            key: strip_scope(kv.key, &self.scope),
            value: kv.value,
            revision: kv.revision,
            serializer: self.serializer.clone(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator returned by `TypedBroker::list_keys`
pub struct TypedKeyIter {
    inner: BytesKeyIter,
    scope: String,
}

impl TypedKeyIter {
    pub(crate) fn new(inner: BytesKeyIter, scope: String) -> Self {
        Self { inner, scope }
    }
}

impl Iterator for TypedKeyIter {
    type Item = (String, Revision);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, rev) = self.inner.next()?;
        Some((strip_scope(key, &self.scope), rev))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
