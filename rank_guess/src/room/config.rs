//! Room configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::RoomError;

/// Most seats a room can have. Four players at four hole cards each plus
/// the five community cards is the fixed game shape.
pub const MAX_PLAYERS: usize = 4;

/// Hole cards dealt to every seated player.
pub const HOLE_CARDS_PER_PLAYER: usize = 4;

/// Shared cards dealt face up each round.
pub const COMMUNITY_CARDS: usize = 5;

/// Room configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Seats per room (default: 4)
    pub max_players: usize,

    /// Delay between everyone readying up and the first deal
    pub countdown: Duration,

    /// How long round results stay on screen before the next round can start
    pub results_display: Duration,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            countdown: Duration::from_secs(5),
            results_display: Duration::from_secs(10),
        }
    }
}

impl RoomConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.max_players == 0 || self.max_players > MAX_PLAYERS {
            return Err(RoomError::InvalidConfig(format!(
                "max players must be between 1 and {MAX_PLAYERS}"
            )));
        }

        if self.countdown.is_zero() {
            return Err(RoomError::InvalidConfig(
                "countdown must be longer than zero".to_string(),
            ));
        }

        if self.results_display.is_zero() {
            return Err(RoomError::InvalidConfig(
                "results display must be longer than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Countdown length in whole seconds, as announced to players
    pub fn countdown_secs(&self) -> u64 {
        self.countdown.as_secs()
    }
}
