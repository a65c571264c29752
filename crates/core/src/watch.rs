//! Raw watch events.
//!
//! A watch subscription on the byte store yields [`RawWatchEvent`]s on an
//! unbounded channel. The channel closing is the end of the subscription:
//! either the store connection was closed or the subscription was dropped.

use crate::contract::Revision;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Kind of change carried by a watch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Key was created or updated
    Put,
    /// Key was deleted
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Put => write!(f, "put"),
            ChangeKind::Delete => write!(f, "delete"),
        }
    }
}

/// Untyped change notification delivered by the byte store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWatchEvent {
    /// Changed key
    pub key: String,
    /// New value (`None` for deletes)
    pub value: Option<Vec<u8>>,
    /// Revision of the change
    pub revision: Revision,
    /// Put or delete
    pub kind: ChangeKind,
}

impl RawWatchEvent {
    /// Event for a written key
    pub fn put(key: impl Into<String>, value: Vec<u8>, revision: Revision) -> Self {
        RawWatchEvent {
            key: key.into(),
            value: Some(value),
            revision,
            kind: ChangeKind::Put,
        }
    }

    /// Event for a deleted key
    pub fn delete(key: impl Into<String>, revision: Revision) -> Self {
        RawWatchEvent {
            key: key.into(),
            value: None,
            revision,
            kind: ChangeKind::Delete,
        }
    }
}

/// Receiving half of a raw watch subscription
pub type RawWatchReceiver = mpsc::UnboundedReceiver<RawWatchEvent>;

/// Sending half of a raw watch subscription (held by the store)
pub type RawWatchSender = mpsc::UnboundedSender<RawWatchEvent>;

/// Whether `key` is covered by any of the watched prefixes
///
/// An empty prefix list watches nothing.
pub fn watches_key(prefixes: &[String], key: &str) -> bool {
    prefixes.iter().any(|p| key.starts_with(p.as_str()))
}
