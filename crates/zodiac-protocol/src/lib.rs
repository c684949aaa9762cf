//! Wire protocol for the zodiac server.
//!
//! This crate defines the "language" clients and the server speak:
//!
//! - **Types** ([`PlayerId`], [`RoomId`], [`Species`], [`Tile`], ...):
//!   identities and records that travel on the wire.
//! - **Configuration** ([`RawConfig`], [`GameConfig`]): what clients send
//!   and the normalized form the engine runs with.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]): one tagged record per
//!   event name, `{"event": "...", "data": {...}}`.
//! - **Codec** ([`Codec`], [`JsonCodec`]) and [`ProtocolError`].
//!
//! ```text
//! Transport (frames) → Protocol (events) → Room engine
//! ```

mod codec;
mod config;
mod error;
mod events;
mod lenient;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use config::{CATALOG_SIZE, GameConfig, MAX_GRID_SIZE, RawConfig};
pub use error::ProtocolError;
pub use events::{
    Ballot, ClientEvent, ConfigRequest, JoinRoom, RoomRef, ScoreEntry,
    ServerEvent, TileRef, TurnData,
};
pub use types::{
    GamePhase, InstanceId, PlayerId, PlayerView, Recipient, RoomId, Species,
    Tile, TurnMode,
};
