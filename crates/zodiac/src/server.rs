//! `ZodiacServer` builder and accept loop.
//!
//! This is the entry point for running a zodiac server. It ties the layers
//! together: transport → protocol → session directory → room actors.

use std::sync::Arc;

use tokio::sync::Mutex;
use zodiac_protocol::{Codec, JsonCodec};
use zodiac_room::SessionDirectory;
use zodiac_transport::{Transport, WebSocketTransport};

use crate::ZodiacError;
use crate::config::{DEFAULT_BIND, ServerConfig};
use crate::handler::handle_connection;

/// Default command queue length of each room actor.
const DEFAULT_ROOM_CHANNEL_SIZE: usize = 64;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// directory lock is held for whole joins and disconnects so a room cannot
/// be destroyed while someone is joining it.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) directory: Mutex<SessionDirectory>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a zodiac server.
///
/// # Example
///
/// ```rust,no_run
/// use zodiac::ZodiacServer;
///
/// # async fn run() -> Result<(), zodiac::ZodiacError> {
/// let server = ZodiacServer::builder().bind("0.0.0.0:4000").build().await?;
/// server.run().await
/// # }
/// ```
pub struct ZodiacServerBuilder {
    bind_addr: String,
    room_channel_size: usize,
}

impl ZodiacServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            room_channel_size: DEFAULT_ROOM_CHANNEL_SIZE,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Takes the bind address from a [`ServerConfig`].
    pub fn config(mut self, config: &ServerConfig) -> Self {
        self.bind_addr = config.bind_addr();
        self
    }

    /// Sets how many commands a room actor queues before senders wait.
    pub fn room_channel_size(mut self, size: usize) -> Self {
        self.room_channel_size = size;
        self
    }

    /// Binds the listener with the JSON codec browser clients speak.
    pub async fn build(self) -> Result<ZodiacServer<JsonCodec>, ZodiacError> {
        self.build_with_codec(JsonCodec).await
    }

    /// Binds the listener with a custom codec.
    pub async fn build_with_codec<C: Codec>(
        self,
        codec: C,
    ) -> Result<ZodiacServer<C>, ZodiacError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            directory: Mutex::new(SessionDirectory::with_channel_size(self.room_channel_size)),
            codec,
        });

        Ok(ZodiacServer { transport, state })
    }
}

impl Default for ZodiacServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound zodiac server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ZodiacServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ZodiacServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ZodiacServerBuilder {
        ZodiacServerBuilder::new()
    }
}

impl<C: Codec> ZodiacServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each accepted connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), ZodiacError> {
        tracing::info!("zodiac server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
