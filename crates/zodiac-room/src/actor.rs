//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Commands arrive through an mpsc channel and timer firings come from the
//! room's own [`Timers`](zodiac_timer::Timers). Both are branches of the
//! same `select!` loop, so every change to a room happens on its task,
//! one at a time.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use zodiac_protocol::{
    ClientEvent, GamePhase, PlayerId, RawConfig, Recipient, RoomId, ServerEvent,
};

use crate::room::Outbound;
use crate::{Room, RoomError};

/// Channel sender for delivering outbound events to a player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Add a player (or move a returning username to a new connection).
    Join {
        player_id: PlayerId,
        username: String,
        config: Option<RawConfig>,
        sender: PlayerSender,
        reply: oneshot::Sender<()>,
    },

    /// Deliver a client event from a player.
    Event {
        player_id: PlayerId,
        event: ClientEvent,
    },

    /// A player's connection closed. Replies with the number of players
    /// still active.
    Disconnect {
        player_id: PlayerId,
        reply: oneshot::Sender<usize>,
    },

    /// Request a snapshot of room metadata.
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata (not the game itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: GamePhase,
    pub current_turn: u32,
    /// Every known player, active or not.
    pub player_count: usize,
    pub active_count: usize,
    pub created_at: Instant,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. The session directory keeps
/// one per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    /// Joins the room and waits until the join has been applied.
    pub async fn join(
        &self,
        player_id: PlayerId,
        username: String,
        config: Option<RawConfig>,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                username,
                config,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Sends a client event to the room (fire-and-forget).
    pub async fn send_event(
        &self,
        player_id: PlayerId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Event { player_id, event })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Marks the player inactive and returns how many remain active.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Disconnect {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down. Its timers go with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    /// Outbound channels of the connections currently in the room.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
                fired = self.room.timers_mut().next_fire() => {
                    let out = self.room.on_timer(fired);
                    self.dispatch(out);
                }
            }
        }

        tracing::info!(room_id = %self.room.id(), "room actor stopped");
    }

    /// Applies one command. Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player_id,
                username,
                config,
                sender,
                reply,
            } => {
                self.senders.insert(player_id, sender);
                let outcome = self.room.join(player_id, &username, config.as_ref());
                if let Some(stale) = outcome.replaced {
                    self.senders.remove(&stale);
                }
                self.dispatch(outcome.events);
                let _ = reply.send(());
            }
            RoomCommand::Event { player_id, event } => {
                tracing::trace!(room_id = %self.room.id(), %player_id, event = event.name(), "event");
                let out = self.room.handle(player_id, event);
                self.dispatch(out);
            }
            RoomCommand::Disconnect { player_id, reply } => {
                // Only the connection that owns the record may retire it;
                // a replaced connection has already lost its sender.
                if self.senders.remove(&player_id).is_some() {
                    let out = self.room.disconnect(player_id);
                    self.dispatch(out);
                }
                let _ = reply.send(self.room.active_count());
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.room.id(), "room shutting down");
                return false;
            }
        }
        true
    }

    /// Dispatches outbound events to the correct recipients.
    fn dispatch(&self, out: Outbound) {
        for (recipient, event) in out {
            match recipient {
                Recipient::All => {
                    for sender in self.senders.values() {
                        let _ = sender.send(event.clone());
                    }
                }
                Recipient::Player(player_id) => self.send_to(player_id, event),
            }
        }
    }

    /// Silently drops the event if the player's connection is gone.
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room.id().clone(),
            phase: self.room.phase(),
            current_turn: self.room.current_turn(),
            player_count: self.room.player_count(),
            active_count: self.room.active_count(),
            created_at: self.room.created_at(),
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(room: Room, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let room_id = room.id().clone();

    let actor = RoomActor {
        room,
        senders: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
