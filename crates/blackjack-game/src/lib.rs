//! Card model and round engine for networked Blackjack.
//!
//! - [`card`] — [`Card`], [`Hand`] and the always-11 Ace scoring rule.
//! - [`deck`] — the 52-card [`Deck`] and per-session [`DeckSource`]s.
//! - [`round`] — the [`Round`] state machine that turns player decisions
//!   into wire events.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session driver (above)  ← sends the events, reads the decisions
//!     ↕
//! Game layer (this crate)  ← deals, plays the dealer, picks the outcome
//!     ↕
//! Protocol layer (below)  ← provides Decision, ServerEvent, Outcome
//! ```

pub mod card;
pub mod deck;
pub mod round;

mod error;

pub use card::{Card, Hand, Suit, card_value, hand_value};
pub use deck::{DECK_SIZE, Deck, DeckSource, ShuffledDecks, StackedDecks};
pub use error::GameError;
pub use round::{Round, RoundState, resolve};
