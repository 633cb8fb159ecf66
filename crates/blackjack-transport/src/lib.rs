//! Transport abstraction layer for networked Blackjack.
//!
//! Provides the [`Transport`] and [`Connection`] traits and a TCP
//! implementation. The protocol has no length prefix, so a connection
//! reads by exact size: the caller says how many bytes a message takes
//! and gets all of them or an error.

#![allow(async_fn_in_trait)]

mod error;
mod tcp;

pub use error::TransportError;
pub use tcp::{StreamConnection, TcpConnection, TcpTransport};

use std::fmt;
use std::net::SocketAddr;

/// Process-unique tag for one connection, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listening endpoint that yields connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// The address peers connect to.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A byte stream to one peer, read by exact size.
///
/// All methods take `&self` so one task can hold the connection while
/// sending and receiving in turn.
pub trait Connection: Send + Sync + 'static {
    /// Writes all of `data` and flushes it.
    async fn send(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Reads exactly `len` bytes.
    ///
    /// Waits until all of them have arrived. If the peer closes first,
    /// returns [`TransportError::ConnectionClosed`] with the number of
    /// bytes that did arrive.
    async fn recv_exact(&self, len: usize) -> Result<Vec<u8>, TransportError>;

    /// Shuts down the write side. The peer sees end-of-stream.
    async fn close(&self) -> Result<(), TransportError>;

    fn id(&self) -> ConnectionId;
}
