//! TCP transport implementation on top of `tokio::net`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{
    AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a fresh, process-unique connection ID.
pub(crate) fn next_connection_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// A [`Connection`] over a TCP socket.
pub type TcpConnection = StreamConnection<TcpStream>;

/// A TCP-based [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        // Messages are tiny and strictly request/response.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%addr, error = %e, "failed to set TCP_NODELAY");
        }

        let conn = StreamConnection::new(next_connection_id(), stream);
        tracing::debug!(conn_id = %conn.id(), %addr, "accepted TCP connection");
        Ok(conn)
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl TcpConnection {
    /// Opens a client connection to `addr`.
    pub async fn connect(addr: SocketAddr) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(%addr, error = %e, "failed to set TCP_NODELAY");
        }
        Ok(Self::new(next_connection_id(), stream))
    }
}

/// A connection over any byte stream.
///
/// The stream is split so a send never waits on a pending read. Each half
/// sits behind its own lock, which lets the connection be used through
/// `&self`.
pub struct StreamConnection<S> {
    id: ConnectionId,
    reader: Mutex<ReadHalf<S>>,
    writer: Mutex<WriteHalf<S>>,
}

impl<S> StreamConnection<S>
where
    S: AsyncRead + AsyncWrite,
{
    /// Wraps `stream` under the given ID.
    pub fn new(id: ConnectionId, stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            id,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }
}

impl<S> Connection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer
            .write_all(data)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv_exact(&self, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; len];
        let mut received = 0;
        let mut reader = self.reader.lock().await;

        // `read_exact` would hide how far we got before the close.
        while received < len {
            let n = reader
                .read(&mut buf[received..])
                .await
                .map_err(TransportError::ReceiveFailed)?;
            if n == 0 {
                return Err(TransportError::ConnectionClosed {
                    expected: len,
                    received,
                });
            }
            received += n;
        }

        Ok(buf)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (
        StreamConnection<tokio::io::DuplexStream>,
        StreamConnection<tokio::io::DuplexStream>,
    ) {
        let (a, b) = tokio::io::duplex(64);
        (
            StreamConnection::new(next_connection_id(), a),
            StreamConnection::new(next_connection_id(), b),
        )
    }

    #[tokio::test]
    async fn test_recv_exact_reassembles_split_writes() {
        let (left, right) = pair();

        left.send(&[1, 2, 3]).await.unwrap();
        left.send(&[4, 5]).await.unwrap();

        let got = right.recv_exact(5).await.unwrap();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_recv_exact_leaves_following_bytes_unread() {
        let (left, right) = pair();

        left.send(&[9; 12]).await.unwrap();

        assert_eq!(right.recv_exact(9).await.unwrap().len(), 9);
        assert_eq!(right.recv_exact(3).await.unwrap(), vec![9, 9, 9]);
    }

    #[tokio::test]
    async fn test_recv_exact_reports_short_read_on_close() {
        let (left, right) = pair();

        left.send(&[7; 4]).await.unwrap();
        left.close().await.unwrap();

        let err = right.recv_exact(10).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::ConnectionClosed {
                expected: 10,
                received: 4,
            }
        ));
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let a = next_connection_id();
        let b = next_connection_id();
        assert_ne!(a, b);
    }
}
