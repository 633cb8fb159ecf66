//! The four message shapes that travel on the wire.
//!
//! None of these types knows how it is laid out in bytes; that lives in
//! [`codec`](crate::codec). Keeping the two apart means game code can
//! build and match on messages without touching byte offsets.

use std::fmt;

use crate::constants::{RESULT_LOSS, RESULT_TIE, RESULT_WIN};

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Server → Client (UDP broadcast): "a table is open at this port."
///
/// The client combines the sender's IP address with `tcp_port` to know
/// where to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    /// TCP port the server accepts game connections on.
    pub tcp_port: u16,
    /// Display name of the server. At most 32 bytes survive encoding.
    pub server_name: String,
}

// ---------------------------------------------------------------------------
// Session opening
// ---------------------------------------------------------------------------

/// Client → Server: the first (and only) message that opens a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// How many rounds the client wants to play, 1 to 255.
    pub rounds: u8,
    /// The requesting identity. At most 32 bytes survive encoding.
    pub client_name: String,
}

// ---------------------------------------------------------------------------
// Gameplay
// ---------------------------------------------------------------------------

/// Client → Server: the player's choice during their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Draw another card.
    Hit,
    /// Keep the current hand and end the turn.
    Stand,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "Hit"),
            Self::Stand => write!(f, "Stand"),
        }
    }
}

/// How a round ended, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Tie,
    Loss,
    Win,
}

impl Outcome {
    /// The result byte this outcome is sent as.
    pub fn code(self) -> u8 {
        match self {
            Self::Tie => RESULT_TIE,
            Self::Loss => RESULT_LOSS,
            Self::Win => RESULT_WIN,
        }
    }

    /// Maps a terminal result byte back to an outcome.
    ///
    /// Returns `None` for the not-over code and for unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            RESULT_TIE => Some(Self::Tie),
            RESULT_LOSS => Some(Self::Loss),
            RESULT_WIN => Some(Self::Win),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tie => write!(f, "tie"),
            Self::Loss => write!(f, "loss"),
            Self::Win => write!(f, "win"),
        }
    }
}

/// Server → Client: one step of a round.
///
/// On the wire both variants share one layout. A `Card` is sent with the
/// not-over result code; a `RoundOver` carries the outcome code with the
/// card fields zeroed, and its arrival is the only signal that a round
/// has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
    /// A card was dealt and the round continues.
    Card { rank: u16, suit: u8 },
    /// The round is over.
    RoundOver(Outcome),
}

impl ServerEvent {
    /// Returns `true` if this event ends the round.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RoundOver(_))
    }
}
