//! MessagePack serializer.
//!
//! The default wire format. Structs are written as maps with field names so
//! that payloads stay readable by other tools and tolerate added fields.

use super::traits::Serializer;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// MessagePack serializer backed by `rmp-serde`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackSerializer;

impl Serializer for MsgPackSerializer {
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T> {
        rmp_serde::from_slice(data).map_err(Error::from)
    }

    fn name(&self) -> &'static str {
        "msgpack"
    }
}
