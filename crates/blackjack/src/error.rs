//! Unified error type for the Blackjack stack.

use blackjack_game::GameError;
use blackjack_protocol::ProtocolError;
use blackjack_transport::TransportError;

use crate::config::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapping variant generates a `From`
/// impl, so `?` converts sub-crate errors automatically. Every variant is
/// fatal to the session it happened in and to nothing else.
#[derive(Debug, thiserror::Error)]
pub enum BlackjackError {
    /// A transport-level error (connect, send, recv, short read).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A packet failed validation (length, magic, type, field).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The round engine was driven into a state it cannot leave.
    #[error(transparent)]
    Game(#[from] GameError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A local socket operation failed outside of any session.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// A discovery socket could not be set up or read.
    #[error("discovery failed: {0}")]
    Discovery(#[source] std::io::Error),

    /// The peer went quiet for longer than the idle timeout.
    #[error("timed out waiting for {waiting_for}")]
    IdleTimeout {
        /// The message that never arrived.
        waiting_for: &'static str,
    },

    /// The server sent an event that does not fit the round's sequence.
    #[error("unexpected event: {0}")]
    UnexpectedEvent(String),
}
