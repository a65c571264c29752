//! Serializer abstraction.
//!
//! The serializer is the translation boundary between typed domain messages
//! and the untyped bytes held by the store.
//!
//! - `MsgPackSerializer`: MessagePack (default)
//! - `JsonSerializer`: JSON
//! - `SerializerKind`: run-time selection by name, used by configuration
//!
//! # Usage
//!
//! ```
//! use agentkv_core::serializer::{MsgPackSerializer, Serializer};
//!
//! let s = MsgPackSerializer;
//! let bytes = s.marshal(&("eth0", true)).unwrap();
//! let back: (String, bool) = s.unmarshal(&bytes).unwrap();
//! assert_eq!(back, ("eth0".to_string(), true));
//! ```

mod json;
mod msgpack;
mod traits;

pub use json::JsonSerializer;
pub use msgpack::MsgPackSerializer;
pub use traits::Serializer;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializer chosen at run time.
///
/// # Known Serializers
///
/// - `"msgpack"`: MessagePack (default)
/// - `"json"`: JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SerializerKind {
    /// MessagePack
    #[default]
    MsgPack,
    /// JSON
    Json,
}

impl SerializerKind {
    /// Get a serializer by its identifier.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "msgpack" => Ok(SerializerKind::MsgPack),
            "json" => Ok(SerializerKind::Json),
            other => Err(Error::Config(format!(
                "Unknown serializer '{}'. Expected \"msgpack\" or \"json\".",
                other
            ))),
        }
    }
}

impl Serializer for SerializerKind {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        match self {
            SerializerKind::MsgPack => MsgPackSerializer.marshal(value),
            SerializerKind::Json => JsonSerializer.marshal(value),
        }
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        match self {
            SerializerKind::MsgPack => MsgPackSerializer.unmarshal(data),
            SerializerKind::Json => JsonSerializer.unmarshal(data),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SerializerKind::MsgPack => MsgPackSerializer.name(),
            SerializerKind::Json => JsonSerializer.name(),
        }
    }
}
