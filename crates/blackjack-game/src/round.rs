//! The round engine: one deal from first card to outcome.
//!
//! The engine is a pure state machine. It never touches a socket; every
//! operation returns the [`ServerEvent`]s the caller must send, in order.
//! The session driver owns all I/O.
//!
//! ```text
//! Start ──deal──→ Dealt → PlayerTurn ──stand / bust──→ DealerReveal
//!                           ↺ hit                          │ finish
//!                                                          ▼
//!                                  Resolved ←── DealerTurn
//! ```
//!
//! Within one round, the events reach the client in this order:
//!
//! 1. the player's two cards, then the dealer's visible card;
//! 2. one card per Hit;
//! 3. the dealer's hidden card, always, even after a player bust;
//! 4. the dealer's extra draws, only if the player did not bust;
//! 5. exactly one terminal event.

use std::cmp::Ordering;
use std::fmt;

use blackjack_protocol::{Decision, Outcome, ServerEvent};

use crate::{Card, Deck, GameError, Hand};

/// The dealer draws while below this total.
pub const DEALER_STANDS_AT: u32 = 17;

/// Highest total that is not a bust.
pub const BUST_LIMIT: u32 = 21;

/// The stage a [`Round`] is in.
///
/// `Dealt` and `DealerTurn` are passed through inside a single operation,
/// so a caller only ever observes the other four between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Start,
    Dealt,
    PlayerTurn,
    DealerReveal,
    DealerTurn,
    Resolved,
}

impl fmt::Display for RoundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Dealt => write!(f, "Dealt"),
            Self::PlayerTurn => write!(f, "PlayerTurn"),
            Self::DealerReveal => write!(f, "DealerReveal"),
            Self::DealerTurn => write!(f, "DealerTurn"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}

/// Decides a finished round from the player's point of view.
///
/// A player bust loses before the dealer's total is even considered.
pub fn resolve(player_total: u32, dealer_total: u32, player_bust: bool) -> Outcome {
    if player_bust {
        return Outcome::Loss;
    }
    if dealer_total > BUST_LIMIT {
        return Outcome::Win;
    }
    match dealer_total.cmp(&player_total) {
        Ordering::Greater => Outcome::Loss,
        Ordering::Less => Outcome::Win,
        Ordering::Equal => Outcome::Tie,
    }
}

/// One round of play against the dealer.
///
/// Owns its deck and both hands; all of it is dropped with the round.
#[derive(Debug)]
pub struct Round {
    deck: Deck,
    player: Hand,
    dealer: Hand,
    state: RoundState,
    player_bust: bool,
    outcome: Option<Outcome>,
}

impl Round {
    /// Creates a round that will deal from `deck`.
    pub fn new(deck: Deck) -> Self {
        Self {
            deck,
            player: Hand::new(),
            dealer: Hand::new(),
            state: RoundState::Start,
            player_bust: false,
            outcome: None,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn player_hand(&self) -> &Hand {
        &self.player
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer
    }

    /// Returns `true` if the player busted this round.
    pub fn player_bust(&self) -> bool {
        self.player_bust
    }

    /// The outcome, once the round is resolved.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Returns `true` while the round is waiting on a player decision.
    pub fn awaiting_decision(&self) -> bool {
        self.state == RoundState::PlayerTurn
    }

    /// Deals two cards each, player first.
    ///
    /// Returns the player's two cards and the dealer's first card. The
    /// dealer's second card stays hidden until [`finish`](Self::finish).
    pub fn deal(&mut self) -> Result<Vec<ServerEvent>, GameError> {
        self.expect_state(RoundState::Start, "deal")?;

        for _ in 0..2 {
            let card = self.deck.draw()?;
            self.player.push(card);
        }
        for _ in 0..2 {
            let card = self.deck.draw()?;
            self.dealer.push(card);
        }
        self.state = RoundState::Dealt;

        tracing::debug!(
            player = %self.player,
            player_total = self.player.value(),
            dealer_up = %self.dealer.cards()[0],
            "initial deal"
        );

        let events = self
            .player
            .cards()
            .iter()
            .chain(self.dealer.cards().iter().take(1))
            .map(|c| c.to_event())
            .collect();

        self.state = RoundState::PlayerTurn;
        Ok(events)
    }

    /// Applies one player decision.
    ///
    /// A Hit returns the drawn card; if it takes the player over 21 the
    /// turn ends there. A Stand ends the turn and returns nothing.
    pub fn decide(
        &mut self,
        decision: Decision,
    ) -> Result<Option<ServerEvent>, GameError> {
        self.expect_state(RoundState::PlayerTurn, "decide")?;

        match decision {
            Decision::Stand => {
                tracing::debug!(total = self.player.value(), "player stands");
                self.state = RoundState::DealerReveal;
                Ok(None)
            }
            Decision::Hit => {
                let card = self.deck.draw()?;
                self.player.push(card);
                let total = self.player.value();
                tracing::debug!(%card, total, "player hits");

                if total > BUST_LIMIT {
                    tracing::debug!(total, "player busts");
                    self.player_bust = true;
                    self.state = RoundState::DealerReveal;
                }
                Ok(Some(card.to_event()))
            }
        }
    }

    /// Reveals the hidden card, plays the dealer and resolves the round.
    ///
    /// The last event returned is always the terminal one.
    pub fn finish(&mut self) -> Result<Vec<ServerEvent>, GameError> {
        self.expect_state(RoundState::DealerReveal, "finish")?;

        let hidden = self.dealer.cards()[1];
        let mut events = vec![hidden.to_event()];
        self.state = RoundState::DealerTurn;

        if !self.player_bust {
            while self.dealer.value() < DEALER_STANDS_AT {
                let card: Card = self.deck.draw()?;
                self.dealer.push(card);
                tracing::debug!(%card, total = self.dealer.value(), "dealer draws");
                events.push(card.to_event());
            }
        }

        let outcome = resolve(
            self.player.value(),
            self.dealer.value(),
            self.player_bust,
        );
        self.outcome = Some(outcome);
        self.state = RoundState::Resolved;
        events.push(ServerEvent::RoundOver(outcome));

        Ok(events)
    }

    fn expect_state(
        &self,
        expected: RoundState,
        action: &'static str,
    ) -> Result<(), GameError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GameError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }
}
