//! Typed broker over a revisioned byte store
//!
//! `TypedBroker` wraps any `BytesBroker` and converts between typed
//! messages and bytes at the boundary, using a pluggable `Serializer`.
//! Scoped views share the owner's connection; listings and watches decode
//! lazily.

#![warn(clippy::all)]

pub mod broker;
pub mod iter;
pub mod txn;
pub mod watch;

pub use broker::{Ownership, TypedBroker, TypedWatcher};
pub use iter::{TypedKeyIter, TypedKeyVal, TypedKeyValIter};
pub use txn::TypedTxn;
pub use watch::{TypedWatchEvent, TypedWatchStream};
