/// Errors from the byte transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer went away.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Opening an outbound connection failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The transport was shut down.
    #[error("transport shut down")]
    Shutdown,
}
