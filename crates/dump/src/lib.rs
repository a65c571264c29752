//! Snapshot aggregation over the agent key layout
//!
//! Scans a flat key space, classifies each key by label and record type,
//! and rebuilds a typed per-entity snapshot where every record carries the
//! revision and key it was read from.
//!
//! - `key`: pure key classifier
//! - `model`: domain payload types
//! - `bundle`: per-entity bundle and merge rules
//! - `registry`: record-type tag -> decoder table
//! - `aggregator`: the pass driver
//! - `config`: `agentkv.toml`

#![warn(clippy::all)]

pub mod aggregator;
pub mod bundle;
pub mod config;
pub mod filter;
pub mod key;
pub mod model;
pub mod registry;

pub use aggregator::{Aggregator, IngestOutcome, Issue, IssueKind, PassSummary};
pub use bundle::{AppendLog, ConfigState, EntityBundle, Merge};
pub use config::{DumpConfig, CONFIG_FILE_NAME};
pub use filter::Filters;
pub use key::{classify, strip_root, Arity, ClassifiedKey, Marker};
pub use registry::{Decoded, DecoderRegistry};
