//! Cards, decks and poker hand evaluation.
//!
//! - [`entities`]: cards, suits and the dealing deck
//! - [`functional`]: best-hand search and the hand ordering used for scoring

pub mod entities;
pub mod functional;

pub use entities::{Card, Deck, DeckError, Suit, Value};
pub use functional::{
    EvaluatedHand, HandCategory, HandError, compare, evaluate5, evaluate_best_hand,
    evaluate_player_hand,
};
