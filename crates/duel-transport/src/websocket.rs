//! WebSocket transport using `tokio-tungstenite`.
//!
//! The stream is split once at construction. The write half and the read
//! half sit behind separate locks, so a task parked in `recv` does not
//! block a concurrent `send`.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Connection, ConnectionId, Transport, TransportError};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Connection opened with [`WebSocketConnection::connect`].
pub type ClientConnection = WebSocketConnection<MaybeTlsStream<TcpStream>>;

/// Connection produced by [`WebSocketListener::accept`].
pub type ServerConnection = WebSocketConnection<TcpStream>;

fn io_error(
    kind: io::ErrorKind,
    err: tokio_tungstenite::tungstenite::Error,
) -> io::Error {
    io::Error::new(kind, err)
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Accepts inbound WebSocket connections.
pub struct WebSocketListener {
    listener: TcpListener,
}

impl WebSocketListener {
    /// Binds to `addr`. Use port 0 to let the OS pick one.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

impl Transport for WebSocketListener {
    type Connection = ServerConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            TransportError::AcceptFailed(io_error(io::ErrorKind::ConnectionRefused, e))
        })?;

        let conn = WebSocketConnection::from_stream(ws);
        tracing::debug!(id = %conn.id, %addr, "accepted WebSocket connection");
        Ok(conn)
    }

    async fn shutdown(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// One WebSocket connection with independently locked halves.
pub struct WebSocketConnection<S> {
    id: ConnectionId,
    sink: Mutex<SplitSink<WebSocketStream<S>, Message>>,
    source: Mutex<SplitStream<WebSocketStream<S>>>,
}

impl ClientConnection {
    /// Opens a client connection to `url` (`ws://host:port/path`).
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (ws, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| {
                TransportError::ConnectFailed(io_error(
                    io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        let conn = Self::from_stream(ws);
        tracing::debug!(id = %conn.id, url, "WebSocket connected");
        Ok(conn)
    }
}

impl<S> WebSocketConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Wraps an already-handshaken stream.
    pub fn from_stream(ws: WebSocketStream<S>) -> Self {
        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        let (sink, source) = ws.split();
        Self {
            id,
            sink: Mutex::new(sink),
            source: Mutex::new(source),
        }
    }
}

impl<S> Connection for WebSocketConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = Message::Binary(data.to_vec().into());
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(|e| TransportError::SendFailed(io_error(io::ErrorKind::BrokenPipe, e)))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut source = self.source.lock().await;
        loop {
            match source.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(io_error(
                        io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| TransportError::SendFailed(io_error(io::ErrorKind::BrokenPipe, e)))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
