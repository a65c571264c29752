//! Revision-tagged wrapper type
//!
//! Every record read from the store is returned as `Versioned<T>`: the
//! decoded value plus the [`RecordMeta`] describing where and when it was
//! read.
//!
//! ## The Contract
//!
//! ```text
//! fn get<M>(&self, key) -> Result<Option<Versioned<M>>>
//! ```
//!
//! - `metadata.rev` is the store revision of the key at read time
//! - `metadata.key` is the full key the value was read from

use super::Revision;
use serde::{Deserialize, Serialize};

/// Store metadata attached to a decoded record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Revision of the key when it was read
    pub rev: Revision,
    /// Key the record was read from
    pub key: String,
}

impl RecordMeta {
    /// Create metadata for a key read at `rev`
    pub fn new(rev: impl Into<Revision>, key: impl Into<String>) -> Self {
        RecordMeta {
            rev: rev.into(),
            key: key.into(),
        }
    }
}

/// A decoded value with its store metadata
///
/// ## Invariants
///
/// - `metadata` always describes the read that produced `value`
/// - A `Versioned<T>` is never partially updated: merges replace it whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    /// Where and at which revision the value was read
    pub metadata: RecordMeta,

    /// The decoded value
    pub value: T,
}

impl<T> Versioned<T> {
    /// Wrap a value read from `key` at `rev`
    pub fn new(value: T, rev: impl Into<Revision>, key: impl Into<String>) -> Self {
        Versioned {
            metadata: RecordMeta::new(rev, key),
            value,
        }
    }

    /// Wrap a value with existing metadata
    pub fn with_meta(value: T, metadata: RecordMeta) -> Self {
        Versioned { metadata, value }
    }

    /// Map the inner value to a new type
    pub fn map<U, F>(self, f: F) -> Versioned<U>
    where
        F: FnOnce(T) -> U,
    {
        Versioned {
            metadata: self.metadata,
            value: f(self.value),
        }
    }

    /// Get a reference to the inner value
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consume and return the inner value
    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Revision the value was read at
    #[inline]
    pub fn rev(&self) -> Revision {
        self.metadata.rev
    }

    /// Key the value was read from
    #[inline]
    pub fn key(&self) -> &str {
        &self.metadata.key
    }

    /// Extract value and metadata as a tuple
    pub fn into_parts(self) -> (T, RecordMeta) {
        (self.value, self.metadata)
    }
}

impl<T> AsRef<T> for Versioned<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}
