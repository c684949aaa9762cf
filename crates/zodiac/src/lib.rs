//! # Zodiac
//!
//! Multiplayer "spot the animal" room server.
//!
//! Clients connect over WebSocket, join rooms by name, and race to pick
//! the target animals of the zodiac on a shared or personal grid, or
//! ballot for them together in the suggestion mode. Every room is an
//! isolated actor with its own timers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clap::Parser;
//! use zodiac::prelude::*;
//!
//! # async fn run() -> Result<(), ZodiacError> {
//! let config = ServerConfig::parse();
//! let server = ZodiacServer::builder().config(&config).build().await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_BIND, DEFAULT_LOG_FILTER, DEFAULT_PORT, ServerConfig};
pub use error::ZodiacError;
pub use server::{ZodiacServer, ZodiacServerBuilder};

pub mod prelude {
    pub use crate::{ServerConfig, ZodiacError, ZodiacServer, ZodiacServerBuilder};
    pub use zodiac_protocol::{
        ClientEvent, Codec, GameConfig, JsonCodec, PlayerId, RawConfig, RoomId, ServerEvent,
    };
}
