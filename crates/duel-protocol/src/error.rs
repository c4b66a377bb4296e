//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating
/// protocol values.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or an
    /// unknown message type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value parsed but breaks a protocol rule (e.g. a roster with
    /// three participants).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
