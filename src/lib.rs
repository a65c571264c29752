//! agentkv - typed access to revisioned key-value stores
//!
//! Two layers over any store implementing [`BytesBroker`]:
//!
//! - [`TypedBroker`] marshals typed messages at the boundary, with scoped
//!   views, lazy listings, typed watches and transactions.
//! - [`Aggregator`] scans the agent key layout and rebuilds a per-label
//!   snapshot in which every record carries its store revision.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use agentkv::{Aggregator, Filters, MemoryStore, TypedBroker};
//!
//! let broker = TypedBroker::new(Arc::new(MemoryStore::new()));
//! let mut snapshot = Aggregator::new();
//! let summary = snapshot.load_prefix(&broker, "", &Filters::none())?;
//!
//! for (label, bundle) in snapshot.iter_sorted() {
//!     println!("{label}: {} records", bundle.record_count());
//! }
//! ```

pub use agentkv_broker::{
    Ownership, TypedBroker, TypedKeyIter, TypedKeyVal, TypedKeyValIter, TypedTxn,
    TypedWatchEvent, TypedWatchStream, TypedWatcher,
};
pub use agentkv_core::{
    BytesBroker, BytesTxn, ChangeKind, DeleteOptions, Error, JsonSerializer, MsgPackSerializer,
    PutOptions, RecordMeta, Result, Revision, Serializer, SerializerKind, Versioned,
};
pub use agentkv_dump::{
    model, Aggregator, AppendLog, ConfigState, DecoderRegistry, DumpConfig, EntityBundle,
    Filters, IngestOutcome, Issue, IssueKind, PassSummary,
};
pub use agentkv_storage::{MemoryStore, StoreStats};
