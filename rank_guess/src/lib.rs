//! # Rank Guess
//!
//! A small real-time multiplayer card game. Up to four players join a room,
//! ready up and receive four hole cards plus five shared community cards.
//! Each player then guesses where their best poker hand ranks at the table
//! and scores a point for every correct guess.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, deck and the poker hand evaluator
//! - [`room`]: Per-room game state machine (actor) and the room registry
//!
//! The crate performs no I/O of its own. Transports hand it verified player
//! ids, a [`room::ProfileLookup`] for display names and an
//! [`room::OutboundChannel`] per connection.
//!
//! ## Example
//!
//! ```
//! use rank_guess::game::{Card, evaluate_player_hand, HandCategory};
//!
//! let parse = |s: &str| -> Vec<Card> {
//!     s.split_whitespace().map(|c| c.parse().unwrap()).collect()
//! };
//! let hand = evaluate_player_hand(&parse("A♠ K♠ Q♠ J♠"), &parse("T♠ 9♣ 8♦ 2♥ 3♣")).unwrap();
//! assert_eq!(hand.category, HandCategory::RoyalFlush);
//! ```

/// Cards, deck and hand evaluation.
pub mod game;

/// Rooms, the registry and the events they broadcast.
pub mod room;
pub use room::{RoomConfig, RoomError, RoomRegistry};
