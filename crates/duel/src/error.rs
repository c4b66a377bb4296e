//! Unified error type for Duel.

use duel_protocol::ProtocolError;
use duel_session::SessionError;
use duel_transport::TransportError;

/// Top-level error wrapping every crate-specific error, so `?` converts
/// sub-crate errors without ceremony.
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    /// Connecting, sending, or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A peer message could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session rejected an operation or has stopped.
    #[error(transparent)]
    Session(#[from] SessionError),
}
