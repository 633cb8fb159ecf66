//! The 52-card deck and where decks come from.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::card::{ACE, KING};
use crate::{Card, GameError, Suit};

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 52;

/// A sequence of cards drawn without replacement.
///
/// A round gets a fresh deck and never reshuffles it. Drawing from an
/// empty deck is an error, never a silent refill.
#[derive(Debug, Clone)]
pub struct Deck {
    /// Stored back-to-front so `draw` is a `pop`.
    cards: Vec<Card>,
}

impl Deck {
    /// A full deck in a uniformly random order.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = full_set();
        cards.shuffle(rng);
        Self { cards }
    }

    /// A deck that deals `cards` in the given order, first card first.
    ///
    /// Used to replay a known deal. Nothing checks that the cards form a
    /// full or distinct set.
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self { cards }
    }

    /// Removes and returns the next card.
    pub fn draw(&mut self) -> Result<Card, GameError> {
        self.cards.pop().ok_or(GameError::DeckExhausted)
    }

    /// Cards left to draw.
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Every (rank, suit) pair exactly once.
fn full_set() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in ACE..=KING {
            // Ranks and suits here are always in range.
            if let Ok(card) = Card::new(rank, suit) {
                cards.push(card);
            }
        }
    }
    cards
}

// ---------------------------------------------------------------------------
// DeckSource
// ---------------------------------------------------------------------------

/// Produces a fresh deck for every round of a session.
///
/// Each session owns its own source, so sources never need to be shared
/// between tasks.
pub trait DeckSource: Send {
    /// Returns the deck for the next round.
    fn next_deck(&mut self) -> Deck;
}

/// Shuffles a new full deck for every round.
pub struct ShuffledDecks {
    rng: StdRng,
}

impl ShuffledDecks {
    /// Shuffles with a generator seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Shuffles reproducibly from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DeckSource for ShuffledDecks {
    fn next_deck(&mut self) -> Deck {
        Deck::shuffled(&mut self.rng)
    }
}

/// Hands out pre-arranged decks in order.
///
/// Once the queue runs dry every further deck is empty, so the first draw
/// of an unplanned round fails with [`GameError::DeckExhausted`].
#[derive(Debug, Default)]
pub struct StackedDecks {
    decks: VecDeque<Deck>,
}

impl StackedDecks {
    pub fn new(decks: impl IntoIterator<Item = Deck>) -> Self {
        Self {
            decks: decks.into_iter().collect(),
        }
    }
}

impl DeckSource for StackedDecks {
    fn next_deck(&mut self) -> Deck {
        self.decks
            .pop_front()
            .unwrap_or_else(|| Deck::from_cards(Vec::new()))
    }
}
