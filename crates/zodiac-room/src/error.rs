//! Error types for the room layer.

use zodiac_protocol::RoomId;

/// Errors surfaced by the room directory and room handles.
///
/// Player mistakes never show up here; rooms ignore them. These cover the
/// plumbing between a connection and a room actor.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room's command channel is closed (the actor has stopped).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
