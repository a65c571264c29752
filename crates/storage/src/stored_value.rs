//! Storage-layer value wrapper with TTL support
//!
//! `RawValue` handed to callers carries no TTL because expiry is a storage
//! concern. `StoredValue` pairs the bytes and revision with the instant the
//! entry expires, if it was written with a lease.

use std::time::{Duration, Instant};

use agentkv_core::{RawValue, Revision};

/// A stored value with optional expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    data: Vec<u8>,
    revision: Revision,
    expires_at: Option<Instant>,
}

impl StoredValue {
    /// Create a stored value written at `revision`, expiring after `ttl`
    pub fn new(data: Vec<u8>, revision: Revision, ttl: Option<Duration>) -> Self {
        StoredValue {
            data,
            revision,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    /// Stored bytes
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Revision of the write that produced this value
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Whether the lease has run out
    ///
    /// Expiry is logical: expired entries are filtered at read time.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }

    /// Copy out as the caller-facing type
    pub fn to_raw(&self) -> RawValue {
        RawValue {
            data: self.data.clone(),
            revision: self.revision,
        }
    }
}
