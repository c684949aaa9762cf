//! Rooms for the zodiac server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! game state, players and timers.
//!
//! # Key types
//!
//! - [`Room`]: the synchronous state machine (players, rounds, scoring)
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`SessionDirectory`]: creates and destroys rooms, routes events
//! - [`catalog`], [`round`], [`score`], [`reveal`]: the pure game rules

mod actor;
pub mod catalog;
mod directory;
mod error;
pub mod reveal;
mod room;
pub mod round;
pub mod score;

pub use actor::{PlayerSender, RoomHandle, RoomInfo};
pub use directory::SessionDirectory;
pub use error::RoomError;
pub use room::{JoinOutcome, Outbound, Player, Room};
