//! Codec trait and implementations for peer messages.
//!
//! The link layer only needs something that turns a [`PeerMessage`]
//! into bytes and back; which format that is stays swappable.
//!
//! [`PeerMessage`]: crate::PeerMessage

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes them back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that speaks JSON via `serde_json`.
///
/// The relay forwards JSON text frames untouched, so this is what both
/// clients use by default.
///
/// ```rust
/// use duel_protocol::{Codec, JsonCodec, Move, PeerMessage, SessionId, Turn};
///
/// let codec = JsonCodec;
/// let msg = PeerMessage::Move {
///     session_id: SessionId::new("room-1"),
///     mv: Move::new("e2", "e4", Turn::First),
/// };
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: PeerMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
