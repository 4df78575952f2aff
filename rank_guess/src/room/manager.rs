//! Room registry for spawning and routing to room actors.

use super::{
    actor::{RoomActor, RoomHandle},
    channel::Outbound,
    config::RoomConfig,
    errors::{RoomError, RoomResult},
    messages::{LeaveOutcome, PlayerAction, RoomCode, RoomSnapshot},
    profile::ProfileLookup,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Registry of active rooms
///
/// Cloning shares the same table of rooms. Rooms are removed once their last
/// player leaves, or lazily when their actor is found to have shut down.
#[derive(Clone)]
pub struct RoomRegistry {
    /// Configuration applied to every new room
    config: RoomConfig,

    /// Display names for joining players
    profiles: Arc<dyn ProfileLookup>,

    /// Active room handles
    rooms: Arc<RwLock<HashMap<RoomCode, RoomHandle>>>,

    /// Next room number
    next_room_id: Arc<RwLock<u64>>,
}

impl RoomRegistry {
    /// Create a new room registry
    ///
    /// `config` is expected to have passed [`RoomConfig::validate`].
    pub fn new(config: RoomConfig, profiles: Arc<dyn ProfileLookup>) -> Self {
        Self {
            config,
            profiles,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            next_room_id: Arc::new(RwLock::new(1)),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Create an empty room in the lobby and spawn its actor
    ///
    /// # Returns
    ///
    /// * `RoomCode` - Code players use to reach the room, e.g. `ROOM-0001`
    pub async fn create_room(&self) -> RoomCode {
        let code = {
            let mut next_id = self.next_room_id.write().await;
            let code = format!("ROOM-{:04}", *next_id);
            *next_id += 1;
            code
        };

        let (actor, handle) = RoomActor::new(code.clone(), self.config.clone());
        tokio::spawn(actor.run());

        self.rooms.write().await.insert(code.clone(), handle);
        log::info!("Created room {}", code);

        code
    }

    /// Allow a player to join a room
    ///
    /// Whitelisting an already whitelisted player is a no-op.
    pub async fn whitelist(&self, room_code: &str, player_id: &str) -> RoomResult<()> {
        let handle = self.handle(room_code).await?;
        let result = handle.whitelist(player_id.to_string()).await;
        self.prune_if_closed(&handle).await;
        result
    }

    pub async fn is_whitelisted(&self, room_code: &str, player_id: &str) -> RoomResult<bool> {
        let handle = self.handle(room_code).await?;
        let result = handle.is_whitelisted(player_id.to_string()).await;
        self.prune_if_closed(&handle).await;
        result
    }

    /// Seat a whitelisted player, labelled with their profile name
    ///
    /// # Errors
    ///
    /// `RoomNotFound`, then `UserNotFound` from the profile lookup, then the
    /// room's own checks (`NotWhitelisted`, `WrongPhase`, `RoomFull`).
    pub async fn join(&self, room_code: &str, player_id: &str, channel: Outbound) -> RoomResult<()> {
        let handle = self.handle(room_code).await?;
        let profile = self.profiles.profile(player_id).await?;

        let result = handle
            .join(player_id.to_string(), profile.name, channel)
            .await;
        self.prune_if_closed(&handle).await;
        result
    }

    /// Route a player action to its room
    pub async fn handle_action(
        &self,
        room_code: &str,
        player_id: &str,
        action: PlayerAction,
    ) -> RoomResult<()> {
        let handle = self.handle(room_code).await?;
        let result = handle.act(player_id.to_string(), action).await;
        self.prune_if_closed(&handle).await;
        result
    }

    /// Remove a player from a room. Never fails; an unknown room or player
    /// reports [`LeaveOutcome::NotSeated`].
    pub async fn leave(&self, room_code: &str, player_id: &str) -> LeaveOutcome {
        self.leave_with(room_code, player_id, None).await
    }

    /// Leave on behalf of the connection behind `channel`.
    ///
    /// Does nothing when the player has since rejoined over another channel.
    pub async fn leave_from(&self, room_code: &str, player_id: &str, channel: Outbound) -> LeaveOutcome {
        self.leave_with(room_code, player_id, Some(channel)).await
    }

    async fn leave_with(
        &self,
        room_code: &str,
        player_id: &str,
        channel: Option<Outbound>,
    ) -> LeaveOutcome {
        let Ok(handle) = self.handle(room_code).await else {
            return LeaveOutcome::NotSeated;
        };

        let player_id = player_id.to_string();
        let outcome = match channel {
            Some(channel) => handle.leave_from(player_id, channel).await,
            None => handle.leave(player_id).await,
        }
        .unwrap_or(LeaveOutcome::NotSeated);

        if outcome == LeaveOutcome::RoomEmptied {
            self.rooms.write().await.remove(room_code);
            log::info!("Room {} emptied and removed", room_code);
        } else {
            self.prune_if_closed(&handle).await;
        }

        outcome
    }

    /// Read-only view of a room, `None` once it is gone
    pub async fn get_room(&self, room_code: &str) -> Option<RoomSnapshot> {
        let handle = self.handle(room_code).await.ok()?;
        let snapshot = handle.snapshot().await;
        self.prune_if_closed(&handle).await;
        snapshot.ok()
    }

    /// Number of active rooms
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    async fn handle(&self, room_code: &str) -> RoomResult<RoomHandle> {
        self.rooms
            .read()
            .await
            .get(room_code)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room_code.to_string()))
    }

    async fn prune_if_closed(&self, handle: &RoomHandle) {
        if handle.is_closed() && self.rooms.write().await.remove(handle.code()).is_some() {
            log::warn!("Room {} shut down unexpectedly, removed", handle.code());
        }
    }
}
