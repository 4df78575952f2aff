//! Room error types.

use thiserror::Error;

use crate::game::{DeckError, HandError};

/// Errors returned by room and registry operations.
///
/// Every variant except [`RoomError::Deal`] and [`RoomError::Evaluate`] is a
/// recoverable caller error and leaves the room untouched.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RoomError {
    /// No room with that code (never created, or already reaped)
    #[error("Room {0} not found")]
    RoomNotFound(String),

    /// Player was not whitelisted for the room
    #[error("Player {0} is not whitelisted for this room")]
    NotWhitelisted(String),

    /// Every seat (or whitelist slot) is taken
    #[error("Room is full")]
    RoomFull,

    /// Player is not seated in the room
    #[error("Player {0} is not in this room")]
    PlayerNotFound(String),

    /// Action not allowed in the room's current phase
    #[error("Can't {action} while the room is in {phase}")]
    WrongPhase { action: &'static str, phase: String },

    /// Guess outside `1..=max`
    #[error("Guess {guess} is out of range, must be between 1 and {max}")]
    InvalidGuess { guess: u32, max: u32 },

    /// Profile lookup for a joining player failed
    #[error("User {0} not found")]
    UserNotFound(String),

    /// Invalid room configuration
    #[error("Invalid room configuration: {0}")]
    InvalidConfig(String),

    /// Dealing ran past the end of the deck. Internal invariant failure.
    #[error("Deal failed: {0}")]
    Deal(#[from] DeckError),

    /// Hand evaluation was handed too few cards. Internal invariant failure.
    #[error("Hand evaluation failed: {0}")]
    Evaluate(#[from] HandError),
}

impl RoomError {
    /// Get a client-safe error message
    ///
    /// Internal failures are not described to players.
    pub fn client_message(&self) -> String {
        match self {
            RoomError::Deal(_) | RoomError::Evaluate(_) => "Internal server error".to_string(),
            RoomError::RoomNotFound(_) => "Room not found".to_string(),
            RoomError::PlayerNotFound(_) => "You are not in this room".to_string(),
            RoomError::NotWhitelisted(_) => "You are not allowed to join this room".to_string(),
            RoomError::UserNotFound(_) => "User not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;
