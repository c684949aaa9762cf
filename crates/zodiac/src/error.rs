//! Unified error type for the zodiac server.

use zodiac_protocol::ProtocolError;
use zodiac_room::RoomError;
use zodiac_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ZodiacError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (room gone or unknown).
    #[error(transparent)]
    Room(#[from] RoomError),
}
