//! Codec trait and implementations for framing envelopes.
//!
//! A "codec" (coder/decoder) converts between Rust types and the raw bytes
//! of a transport frame. The connection handler doesn't care HOW envelopes
//! are serialized: it just needs something that implements [`Codec`].
//!
//! The payload *inside* an envelope is always text (see
//! [`Envelope::data`](crate::Envelope::data)); the codec only decides how
//! the outer frame is laid out. [`JsonCodec`] is what loosely-typed
//! browser clients expect.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between connection tasks.
/// - `'static` → the codec owns everything it needs; it lives as long
///   as the server.
///
/// `decode` uses `DeserializeOwned` (vs plain `Deserialize`) so the result
/// doesn't borrow from the input frame, which is dropped right after.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use pitchside_protocol::{Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
///
/// let envelope = Envelope::new(1, "roster-query", "");
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
