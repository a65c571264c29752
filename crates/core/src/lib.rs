//! Core types and traits for agentkv
//!
//! This crate defines the foundational types used throughout the workspace:
//! - Revision / RecordMeta / Versioned: revision-tagged records
//! - Error: error type hierarchy
//! - Serializer: typed message <-> bytes contract (MessagePack, JSON)
//! - BytesBroker / BytesTxn: the byte store contract the typed layer consumes
//! - PutOptions / DeleteOptions: opaque write options
//! - RawWatchEvent: untyped change notifications

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod error;
pub mod options;
pub mod serializer;
pub mod traits;
pub mod watch;

pub use contract::{RecordMeta, Revision, Versioned};
pub use error::{Error, Result};
pub use options::{DeleteOptions, PutOptions};
pub use serializer::{JsonSerializer, MsgPackSerializer, Serializer, SerializerKind};
pub use traits::{BytesBroker, BytesKeyIter, BytesKeyVal, BytesKeyValIter, BytesTxn, RawValue};
pub use watch::{watches_key, ChangeKind, RawWatchEvent, RawWatchReceiver, RawWatchSender};
