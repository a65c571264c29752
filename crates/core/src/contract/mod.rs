//! Contract types shared by every layer
//!
//! - `revision`: store revision identifier
//! - `versioned`: decoded value + store metadata
//!
//! ## Usage
//!
//! ```
//! use agentkv_core::contract::{RecordMeta, Revision, Versioned};
//! ```

pub mod revision;
pub mod versioned;

pub use revision::Revision;
pub use versioned::{RecordMeta, Versioned};
