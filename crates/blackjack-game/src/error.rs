//! Error types for the game layer.

use crate::RoundState;

/// Errors that can occur while dealing or playing a round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A draw was attempted on an empty deck.
    ///
    /// A fresh deck holds far more cards than any round can use, so
    /// seeing this means the round was driven incorrectly.
    #[error("deck exhausted")]
    DeckExhausted,

    /// An operation was called in a state that does not allow it.
    #[error("cannot {action} while round is in state {state}")]
    InvalidTransition {
        /// The state the round was in.
        state: RoundState,
        /// The operation that was attempted.
        action: &'static str,
    },

    /// Wire values that do not name a real card.
    #[error("invalid card: rank {rank}, suit {suit}")]
    InvalidCard { rank: u16, suit: u8 },
}
