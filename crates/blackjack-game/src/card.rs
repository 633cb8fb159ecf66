//! Cards, hands and the scoring rule.
//!
//! Scoring is deliberately simple: an Ace is always worth 11 and a hand is
//! the plain sum of its cards. There is no soft-Ace reduction, so two Aces
//! score 22. Both peers score this way and must keep doing so, or they
//! will disagree on outcomes.

use std::fmt;

use blackjack_protocol::ServerEvent;

use crate::GameError;

/// Rank of the Ace.
pub const ACE: u8 = 1;

/// Highest rank (King).
pub const KING: u8 = 13;

/// Value of a single card of the given rank.
///
/// Ace → 11, Jack/Queen/King → 10, everything else its own rank.
pub fn card_value(rank: u8) -> u8 {
    match rank {
        ACE => 11,
        r if r >= 11 => 10,
        r => r,
    }
}

/// Value of a set of cards: the sum of [`card_value`] over all of them.
pub fn hand_value(cards: &[Card]) -> u32 {
    cards.iter().map(|c| u32::from(c.value())).sum()
}

// ---------------------------------------------------------------------------
// Suit
// ---------------------------------------------------------------------------

/// One of the four suits, numbered as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Hearts = 0,
    Diamonds = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    /// All suits in wire order.
    pub const ALL: [Suit; 4] =
        [Self::Hearts, Self::Diamonds, Self::Clubs, Self::Spades];

    /// The suit's wire number.
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Suit {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL.get(usize::from(value)).copied().ok_or(value)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hearts => write!(f, "Hearts"),
            Self::Diamonds => write!(f, "Diamonds"),
            Self::Clubs => write!(f, "Clubs"),
            Self::Spades => write!(f, "Spades"),
        }
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single playing card. Immutable once drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    rank: u8,
    suit: Suit,
}

impl Card {
    /// Creates a card, rejecting ranks outside 1..=13.
    pub fn new(rank: u8, suit: Suit) -> Result<Self, GameError> {
        if !(ACE..=KING).contains(&rank) {
            return Err(GameError::InvalidCard {
                rank: u16::from(rank),
                suit: suit.index(),
            });
        }
        Ok(Self { rank, suit })
    }

    /// Builds a card from the rank and suit fields of a server event.
    pub fn from_wire(rank: u16, suit: u8) -> Result<Self, GameError> {
        let invalid = GameError::InvalidCard { rank, suit };
        let rank = u8::try_from(rank).map_err(|_| invalid.clone())?;
        let suit = Suit::try_from(suit).map_err(|_| invalid)?;
        Self::new(rank, suit)
    }

    /// Rank from 1 (Ace) to 13 (King).
    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// This card's score.
    pub fn value(&self) -> u8 {
        card_value(self.rank)
    }

    /// The not-over event that shows this card to the client.
    pub fn to_event(self) -> ServerEvent {
        ServerEvent::Card {
            rank: u16::from(self.rank),
            suit: self.suit.index(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            ACE => write!(f, "Ace")?,
            11 => write!(f, "Jack")?,
            12 => write!(f, "Queen")?,
            KING => write!(f, "King")?,
            r => write!(f, "{r}")?,
        }
        write!(f, " of {}", self.suit)
    }
}

// ---------------------------------------------------------------------------
// Hand
// ---------------------------------------------------------------------------

/// Cards held by one side of one round, in the order they were drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a card to the end of the hand.
    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Score of the hand. See [`hand_value`].
    pub fn value(&self) -> u32 {
        hand_value(&self.cards)
    }

    /// Returns `true` if the hand scores over 21.
    pub fn is_bust(&self) -> bool {
        self.value() > 21
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}
