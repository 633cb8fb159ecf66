//! Sending and receiving whole packets over a [`Connection`].

use std::time::Duration;

use blackjack_protocol::Packet;
use blackjack_transport::Connection;

use crate::BlackjackError;

/// Reads exactly one `P` from the connection.
///
/// Fails if the peer stays silent for `idle_timeout`, closes early, or
/// sends bytes that do not decode as `P`.
pub(crate) async fn recv_packet<P, C>(
    conn: &C,
    idle_timeout: Duration,
) -> Result<P, BlackjackError>
where
    P: Packet,
    C: Connection,
{
    let data = tokio::time::timeout(idle_timeout, conn.recv_exact(P::SIZE))
        .await
        .map_err(|_| BlackjackError::IdleTimeout {
            waiting_for: P::NAME,
        })??;
    Ok(P::decode(&data)?)
}

/// Encodes and sends one packet.
pub(crate) async fn send_packet<P, C>(
    conn: &C,
    packet: &P,
) -> Result<(), BlackjackError>
where
    P: Packet,
    C: Connection,
{
    conn.send(&packet.encode()).await?;
    Ok(())
}
