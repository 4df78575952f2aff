//! Player profile lookup used to label seats.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{RoomError, RoomResult},
    messages::PlayerId,
};

/// Public profile of a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: PlayerId,
    pub name: String,
}

/// Source of player profiles (user store, identity provider, ...)
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Look up a player's profile
    ///
    /// # Errors
    ///
    /// Returns [`RoomError::UserNotFound`] when the player is unknown.
    async fn profile(&self, player_id: &str) -> RoomResult<Profile>;
}

/// In-memory profile directory
///
/// Profiles are recorded as identities are verified and live for the
/// lifetime of the process.
#[derive(Debug, Default)]
pub struct ProfileDirectory {
    profiles: RwLock<HashMap<PlayerId, Profile>>,
}

impl ProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile
    pub async fn upsert(&self, profile: Profile) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id.clone(), profile);
    }

    /// Number of known profiles
    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.profiles.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileLookup for ProfileDirectory {
    async fn profile(&self, player_id: &str) -> RoomResult<Profile> {
        let profiles = self.profiles.read().await;
        profiles
            .get(player_id)
            .cloned()
            .ok_or_else(|| RoomError::UserNotFound(player_id.to_string()))
    }
}
