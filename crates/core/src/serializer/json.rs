//! JSON serializer.

use super::traits::Serializer;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON serializer backed by `serde_json`.
///
/// Useful when the store is shared with tools that expect human-readable
/// values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        serde_json::from_slice(data).map_err(|e| Error::decode(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
