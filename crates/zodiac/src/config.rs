//! Command-line and environment settings of the server process.

use clap::Parser;

/// Port used when neither `--bind` nor `--port` is given.
pub const DEFAULT_PORT: u16 = 4000;

/// Address used when neither `--bind` nor `--port` is given.
pub const DEFAULT_BIND: &str = "0.0.0.0:4000";

/// Log filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "zodiac=info";

/// Zodiac server - multiplayer spot-the-animal rooms over WebSocket
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "zodiac", version, about)]
pub struct ServerConfig {
    /// Full address to bind to; wins over --port
    #[arg(short, long, env = "ZODIAC_BIND")]
    pub bind: Option<String>,

    /// Port to listen on, on all interfaces
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: None,
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// The address the listener binds to.
    pub fn bind_addr(&self) -> String {
        match &self.bind {
            Some(addr) => addr.trim().to_string(),
            None => format!("0.0.0.0:{}", self.port),
        }
    }
}
