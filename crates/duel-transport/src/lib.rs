//! Byte transport between two Duel clients and their relay.
//!
//! [`Connection`] moves opaque frames; [`Transport`] accepts inbound
//! connections. Framing is the transport's job, message meaning is the
//! protocol crate's.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket via `tokio-tungstenite`

use std::fmt;
use std::future::Future;

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{ClientConnection, ServerConnection, WebSocketConnection, WebSocketListener};

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send;

    /// Stops accepting new connections.
    fn shutdown(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// A single bidirectional connection carrying byte frames.
///
/// `send` and `recv` may run concurrently from different tasks: a reader
/// parked in `recv` never holds up a writer.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends one frame to the remote end.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receives the next frame.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(&self) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn id(&self) -> ConnectionId;
}
