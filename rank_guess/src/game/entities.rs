use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    #[serde(rename = "♥")]
    Heart,
    #[serde(rename = "♦")]
    Diamond,
    #[serde(rename = "♣")]
    Club,
    #[serde(rename = "♠")]
    Spade,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Heart, Suit::Diamond, Suit::Club, Suit::Spade];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Club => "♣",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Card values run from two (2u8) to ace (14u8). Aces only count low
/// when completing the wheel straight, and that is handled by the evaluator.
pub type Value = u8;

pub const MIN_VALUE: Value = 2;
pub const ACE: Value = 14;

/// A card is a tuple of a value and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    pub fn value(&self) -> Value {
        self.0
    }

    pub fn suit(&self) -> Suit {
        self.1
    }
}

/// Single character used for a value in card text ("T" for ten).
pub fn value_symbol(value: Value) -> char {
    match value {
        14 => 'A',
        13 => 'K',
        12 => 'Q',
        11 => 'J',
        10 => 'T',
        v => char::from(b'0' + v),
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", value_symbol(self.0), self.1)
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("invalid card: {0:?}")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses "A♠", "T♥" or the ASCII form "As", "Th".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCardError(s.to_string());
        let mut chars = s.trim().chars();
        let value = match chars.next().ok_or_else(err)? {
            'A' | 'a' => 14,
            'K' | 'k' => 13,
            'Q' | 'q' => 12,
            'J' | 'j' => 11,
            'T' | 't' => 10,
            c @ '2'..='9' => c as u8 - b'0',
            _ => return Err(err()),
        };
        let suit = match chars.next().ok_or_else(err)? {
            '♥' | 'h' | 'H' => Suit::Heart,
            '♦' | 'd' | 'D' => Suit::Diamond,
            '♣' | 'c' | 'C' => Suit::Club,
            '♠' | 's' | 'S' => Suit::Spade,
            _ => return Err(err()),
        };
        if chars.next().is_some() {
            return Err(err());
        }
        Ok(Card(value, suit))
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum DeckError {
    #[error("can't deal {requested} cards from a deck of {remaining}")]
    InsufficientCards { requested: usize, remaining: usize },
}

/// An ordered pile of distinct cards. Dealing takes from the front.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Wraps an already ordered pile (stacked decks in tests, replays).
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Returns a uniformly shuffled copy; the receiver is left untouched.
    pub fn shuffled(&self) -> Self {
        self.shuffled_with(&mut rand::rng())
    }

    pub fn shuffled_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut cards = self.cards.clone();
        // Fisher-Yates under the hood.
        cards.shuffle(rng);
        Self { cards }
    }

    /// Removes and returns the first `n` cards.
    pub fn deal(&mut self, n: usize) -> Result<Vec<Card>, DeckError> {
        if n > self.cards.len() {
            return Err(DeckError::InsufficientCards {
                requested: n,
                remaining: self.cards.len(),
            });
        }
        Ok(self.cards.drain(..n).collect())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    /// The canonical 52-card ordering: suit by suit, two through ace.
    fn default() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for value in MIN_VALUE..=ACE {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }
}
