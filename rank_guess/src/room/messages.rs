//! Room actor message types and the events broadcast to players.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;

use super::{channel::Outbound, errors::RoomResult};
use crate::game::{Card, EvaluatedHand, HandCategory};

/// Stable player identifier handed over by the authentication layer
pub type PlayerId = String;

/// Room code, e.g. `ROOM-0001`
pub type RoomCode = String;

/// Room lifecycle phase
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomPhase {
    Lobby,
    Countdown,
    Dealing,
    Guessing,
    Results,
    WaitingForNextRound,
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            RoomPhase::Lobby => "lobby",
            RoomPhase::Countdown => "countdown",
            RoomPhase::Dealing => "dealing",
            RoomPhase::Guessing => "guessing",
            RoomPhase::Results => "results",
            RoomPhase::WaitingForNextRound => "waitingForNextRound",
        };
        write!(f, "{repr}")
    }
}

/// In-game actions a seated player can take
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Toggle readiness in the lobby
    SetReady { is_ready: bool },
    /// Claim a finishing rank, 1 being the strongest hand
    SubmitGuess { guess: u32 },
    /// Ready up for the next round after results
    NextRoundReady,
}

/// Messages that can be sent to a RoomActor
#[derive(Debug)]
pub enum RoomMessage {
    /// Authorize a player to take a seat
    Whitelist {
        player_id: PlayerId,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Take a seat
    Join {
        player_id: PlayerId,
        name: String,
        channel: Outbound,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Leave the room (always succeeds)
    ///
    /// With a `channel`, the seat is only given up while that channel is
    /// still the one the player is seated with.
    Leave {
        player_id: PlayerId,
        channel: Option<Outbound>,
        response: oneshot::Sender<LeaveOutcome>,
    },

    /// Player action (ready, guess, next round)
    Action {
        player_id: PlayerId,
        action: PlayerAction,
        response: oneshot::Sender<RoomResult<()>>,
    },

    /// Whether a player may take a seat
    IsWhitelisted {
        player_id: PlayerId,
        response: oneshot::Sender<bool>,
    },

    /// Read-only view of the room
    GetState {
        response: oneshot::Sender<RoomSnapshot>,
    },

    /// Internal: countdown timer fired
    CountdownElapsed { generation: u64 },

    /// Internal: results display timer fired
    ResultsElapsed { generation: u64 },
}

/// What a leave did to the room
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LeaveOutcome {
    /// Player was removed, others remain
    Left,
    /// Player was not seated; nothing changed
    NotSeated,
    /// Last player left; the room has shut down
    RoomEmptied,
}

/// Lobby roster entry
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyPlayer {
    pub name: String,
    pub is_ready: bool,
}

/// Hand summary shown with the round results
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandSummary {
    pub category: HandCategory,
    pub name: String,
    pub cards: Vec<Card>,
}

impl From<&EvaluatedHand> for HandSummary {
    fn from(hand: &EvaluatedHand) -> Self {
        Self {
            category: hand.category,
            name: hand.category.name().to_string(),
            cards: hand.cards.clone(),
        }
    }
}

/// One player's line in the round results
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub name: String,
    pub hole_cards: Vec<Card>,
    pub hand: HandSummary,
    pub guess: u32,
    pub actual_rank: u32,
    pub is_correct: bool,
    pub score: u32,
}

/// Events pushed to players' outbound channels
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomEvent {
    /// Roster changed (join, leave, ready toggles, round reset)
    LobbyState { players: Vec<LobbyPlayer> },

    /// Everyone is ready; the first deal happens in `duration` seconds
    GameStartCountdown { duration: u64 },

    /// Countdown was called off
    GameStartCancelled,

    /// Private deal for one player
    #[serde(rename_all = "camelCase")]
    RoundStart {
        name: String,
        hole_cards: Vec<Card>,
        community_cards: Vec<Card>,
    },

    /// Everyone guessed; true ranking and scores
    ShowResults { results: Vec<PlayerResult> },
}

/// Read-only room state for transports and the HTTP layer
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub phase: RoomPhase,
    pub max_players: usize,
    pub player_count: usize,
    pub whitelist_count: usize,
    pub players: Vec<LobbyPlayer>,
}
