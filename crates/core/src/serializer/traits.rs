//! Serializer trait definition.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Marshals typed messages to bytes and back.
///
/// All values crossing the typed broker go through a serializer. The only
/// law implementations must honour is the round trip: for every supported
/// message `m`, `unmarshal(marshal(m))` is semantically equal to `m`. Equal
/// messages are not required to produce equal bytes.
///
/// # Thread Safety
///
/// Serializers are shared by the broker, its scoped views and every watch
/// forwarding task, so they must be cheap to clone and `Send + Sync`.
pub trait Serializer: Clone + Send + Sync + 'static {
    /// Marshal a message into bytes.
    ///
    /// Fails with [`Error::Encode`](crate::Error::Encode) when the message
    /// cannot be represented.
    fn marshal<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    /// Unmarshal bytes into the target shape.
    ///
    /// Fails with [`Error::Decode`](crate::Error::Decode) on malformed bytes
    /// or when the bytes do not fit `T`.
    fn unmarshal<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T>;

    /// Unique serializer identifier (used in configuration).
    fn name(&self) -> &'static str;
}
