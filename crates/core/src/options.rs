//! Write and delete options
//!
//! Options are passed through the typed layer to the byte store untouched;
//! their meaning is entirely the store's responsibility.

use crate::contract::Revision;
use std::time::Duration;

/// Options for a put operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Expire the key after this duration (lease)
    pub ttl: Option<Duration>,
    /// Only write if the key's current revision equals this one
    ///
    /// `Some(Revision::ZERO)` means "only if the key does not exist".
    pub prev_revision: Option<Revision>,
}

impl PutOptions {
    /// Put with a time-to-live
    pub fn with_ttl(ttl: Duration) -> Self {
        PutOptions {
            ttl: Some(ttl),
            ..Default::default()
        }
    }

    /// Conditional put on the key's current revision
    pub fn if_revision(rev: Revision) -> Self {
        PutOptions {
            prev_revision: Some(rev),
            ..Default::default()
        }
    }
}

/// Options for a delete operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Treat the key as a prefix and delete every key under it
    pub prefix: bool,
}

impl DeleteOptions {
    /// Delete everything under the key
    pub fn prefix() -> Self {
        DeleteOptions { prefix: true }
    }
}
