//! UDP discovery: the server advertises, the client listens.
//!
//! The server sends the same [`Offer`] datagram on a fixed cadence to a
//! broadcast address. A client binds the well-known port and takes the
//! first datagram that decodes as a valid offer; anything else on that
//! port is ignored.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use blackjack_protocol::{Offer, Packet};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::BlackjackError;

/// Large enough for any datagram we care about; longer ones are cut and
/// then fail or pass decoding on their first `OFFER_SIZE` bytes.
const RECV_BUFFER: usize = 1024;

/// Binds an ephemeral UDP socket allowed to send to broadcast addresses.
pub async fn bind_broadcast_socket() -> Result<UdpSocket, BlackjackError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .await
        .map_err(BlackjackError::Discovery)?;
    socket
        .set_broadcast(true)
        .map_err(BlackjackError::Discovery)?;
    Ok(socket)
}

/// Binds the socket a client listens for offers on.
///
/// The port is bound with address (and, on Unix, port) reuse so several
/// clients on one host can all listen for the same broadcasts.
pub async fn bind_discovery_listener(
    port: u16,
) -> Result<UdpSocket, BlackjackError> {
    let socket = shared_udp_socket(port).map_err(BlackjackError::Discovery)?;
    tracing::info!(port, "listening for offers");
    Ok(socket)
}

fn shared_udp_socket(port: u16) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.bind(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)).into())?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket.into())
}

/// Sends `offer` to `target` every `interval`, forever.
///
/// The packet is encoded once. A failed send is logged and the loop goes
/// on; the task ends only when it is aborted.
pub async fn broadcast_offers(
    socket: UdpSocket,
    offer: Offer,
    target: SocketAddr,
    interval: Duration,
) {
    let packet = offer.encode();
    let mut ticker = tokio::time::interval(interval);
    tracing::info!(
        %target,
        tcp_port = offer.tcp_port,
        server = %offer.server_name,
        "broadcasting offers"
    );

    loop {
        ticker.tick().await;
        if let Err(e) = socket.send_to(&packet, target).await {
            tracing::warn!(%target, error = %e, "failed to send offer");
        }
    }
}

/// Waits for the first valid offer.
///
/// Returns the server's game address (the sender's IP with the advertised
/// TCP port) and the offer itself.
pub async fn wait_for_offer(
    socket: &UdpSocket,
) -> Result<(SocketAddr, Offer), BlackjackError> {
    let mut buf = [0u8; RECV_BUFFER];

    loop {
        let (len, from) = socket
            .recv_from(&mut buf)
            .await
            .map_err(BlackjackError::Discovery)?;

        match Offer::decode(&buf[..len]) {
            Ok(offer) => {
                let server = SocketAddr::new(from.ip(), offer.tcp_port);
                tracing::info!(
                    %server,
                    name = %offer.server_name,
                    "received offer"
                );
                return Ok((server, offer));
            }
            Err(e) => {
                tracing::debug!(%from, error = %e, "ignoring datagram");
            }
        }
    }
}
