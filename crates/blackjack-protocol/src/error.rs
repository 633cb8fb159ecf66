//! Error types for the protocol layer.
//!
//! Decoding fails fast: the first check that fails produces its error and
//! no later field of the packet is looked at.

use crate::constants::TOKEN_LEN;

/// Errors that can occur while decoding a protocol message.
///
/// Encoding never fails, so every variant describes a packet that came
/// off the wire and could not be trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The packet is shorter than the fixed size of its message type.
    #[error("{message} packet too short: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Which message was being decoded.
        message: &'static str,
        /// The fixed size of that message.
        expected: usize,
        /// How many bytes were actually available.
        actual: usize,
    },

    /// The packet does not start with the magic cookie.
    #[error("bad magic cookie: {0:#010x}")]
    BadMagic(u32),

    /// The magic cookie matched but the type tag did not.
    #[error("unexpected message type: expected {expected:#04x}, got {found:#04x}")]
    BadType {
        /// The tag the caller asked for.
        expected: u8,
        /// The tag found in the packet.
        found: u8,
    },

    /// The decision field is neither the "hit" nor the "stand" token.
    #[error("unrecognized decision token: {0:?}")]
    UnknownDecision([u8; TOKEN_LEN]),

    /// The result byte of a server event is outside the known codes.
    #[error("unrecognized result code: {0:#04x}")]
    UnknownResult(u8),

    /// A request asked for zero rounds.
    #[error("request must ask for at least one round")]
    InvalidRounds,
}
