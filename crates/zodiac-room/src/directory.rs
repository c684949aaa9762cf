//! Session directory: creates, tracks and destroys room actors, and
//! remembers which rooms each connection has joined.

use std::collections::{HashMap, HashSet};

use zodiac_protocol::{ClientEvent, PlayerId, RawConfig, RoomId};

use crate::actor::spawn_room;
use crate::{PlayerSender, Room, RoomError, RoomHandle, RoomInfo};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Every live room, keyed by the client-chosen room id.
///
/// Rooms are created on the first `join_room` naming them and destroyed
/// when their last active player disconnects. The server keeps one
/// directory behind a mutex; joins and disconnects hold the lock for the
/// whole operation.
pub struct SessionDirectory {
    rooms: HashMap<RoomId, RoomHandle>,

    /// Rooms each connection has joined. A connection may sit in several.
    memberships: HashMap<PlayerId, HashSet<RoomId>>,

    channel_size: usize,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::with_channel_size(DEFAULT_CHANNEL_SIZE)
    }

    pub fn with_channel_size(channel_size: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            channel_size: channel_size.max(1),
        }
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&RoomHandle> {
        self.rooms.get(room_id)
    }

    /// Returns the room's handle, spawning a fresh room if none exists.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> &RoomHandle {
        let channel_size = self.channel_size;
        self.rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!(%room_id, "room created");
            spawn_room(Room::new(room_id.clone()), channel_size)
        })
    }

    /// Removes the room and shuts its actor down.
    pub async fn remove(&mut self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        for joined in self.memberships.values_mut() {
            joined.remove(room_id);
        }
        self.memberships.retain(|_, joined| !joined.is_empty());

        let _ = handle.shutdown().await;
        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, player_id: PlayerId) -> Vec<RoomId> {
        self.memberships
            .get(&player_id)
            .map(|joined| joined.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn room_info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.get_info().await
    }

    /// Joins a connection to a room, creating the room on first use.
    pub async fn join(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        username: String,
        config: Option<RawConfig>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let handle = self.get_or_create(&room_id).clone();
        handle.join(player_id, username, config, sender).await?;
        self.memberships.entry(player_id).or_default().insert(room_id);
        Ok(())
    }

    /// Routes a client event to the room it names.
    ///
    /// Events for rooms that do not exist are dropped. `join_room` must go
    /// through [`join`](Self::join) instead.
    pub async fn dispatch(&self, player_id: PlayerId, event: ClientEvent) -> Result<(), RoomError> {
        let Some(handle) = self.rooms.get(event.room_id()) else {
            tracing::debug!(
                %player_id,
                room_id = %event.room_id(),
                event = event.name(),
                "event for unknown room ignored"
            );
            return Ok(());
        };
        handle.send_event(player_id, event).await
    }

    /// Handles a closed connection: marks it inactive in every room it
    /// joined and destroys rooms left with no active player.
    ///
    /// Returns the ids of the destroyed rooms.
    pub async fn disconnect(&mut self, player_id: PlayerId) -> Vec<RoomId> {
        let Some(joined) = self.memberships.remove(&player_id) else {
            return Vec::new();
        };

        let mut destroyed = Vec::new();
        for room_id in joined {
            let Some(handle) = self.rooms.get(&room_id) else {
                continue;
            };
            let remaining = handle.disconnect(player_id).await;
            match remaining {
                Ok(0) | Err(_) => {
                    if self.remove(&room_id).await.is_ok() {
                        destroyed.push(room_id);
                    }
                }
                Ok(active) => {
                    tracing::debug!(%room_id, %player_id, active, "player left room");
                }
            }
        }
        destroyed
    }
}

impl Default for SessionDirectory {
    fn default() -> Self {
        Self::new()
    }
}
