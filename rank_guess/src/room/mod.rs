//! Room module providing the per-room game state machine with an async actor model.
//!
//! This module implements:
//! - RoomActor: Async actor running one game session (readiness, countdown,
//!   dealing, guesses, results)
//! - RoomRegistry: Creates rooms, routes player requests and reaps empty rooms
//! - Outbound events pushed to players through non-owning channels
//!
//! ## Architecture
//!
//! Each room runs in a separate Tokio task with an mpsc message inbox, so
//! every event for a room is handled in order while rooms run in parallel.
//! Countdown and results timers are spawned sleeps that post back into the
//! inbox and are aborted when cancelled.
//!
//! ## Example
//!
//! ```
//! use rank_guess::room::{ProfileDirectory, RoomConfig, RoomRegistry};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let profiles = Arc::new(ProfileDirectory::new());
//!     let registry = RoomRegistry::new(RoomConfig::default(), profiles);
//!
//!     let code = registry.create_room().await;
//!     registry.whitelist(&code, "player-1").await.unwrap();
//!     assert_eq!(code, "ROOM-0001");
//! }
//! ```

pub mod actor;
pub mod channel;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;
pub mod profile;
pub mod scoring;

pub use actor::{RoomActor, RoomHandle};
pub use channel::{Outbound, OutboundChannel};
pub use config::{COMMUNITY_CARDS, HOLE_CARDS_PER_PLAYER, MAX_PLAYERS, RoomConfig};
pub use errors::{RoomError, RoomResult};
pub use manager::RoomRegistry;
pub use messages::{
    HandSummary, LeaveOutcome, LobbyPlayer, PlayerAction, PlayerId, PlayerResult, RoomCode,
    RoomEvent, RoomMessage, RoomPhase, RoomSnapshot,
};
pub use profile::{Profile, ProfileDirectory, ProfileLookup};
pub use scoring::rank_by_strength;
