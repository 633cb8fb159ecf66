/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the stream before a whole message arrived.
    #[error("connection closed after {received} of {expected} bytes")]
    ConnectionClosed {
        /// Size of the message being read.
        expected: usize,
        /// Bytes that arrived before the close.
        received: usize,
    },

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Connecting to a remote server failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),
}
