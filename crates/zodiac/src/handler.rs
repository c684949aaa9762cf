//! Per-connection handler: decode inbound frames, route them, and write
//! room events back out.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Issue a `PlayerId` for the connection
//!   2. Loop: decode frames → join a room or route to the named room,
//!      while forwarding the connection's outbound events
//!   3. On close, mark the player inactive in every room they joined

use std::sync::Arc;

use tokio::sync::mpsc;
use zodiac_protocol::{ClientEvent, Codec, PlayerId, ServerEvent};
use zodiac_room::PlayerSender;
use zodiac_transport::{Connection, WebSocketConnection};

use crate::ZodiacError;
use crate::server::ServerState;

/// Marks the connection inactive in every room it joined once the
/// handler returns, on every exit path. The directory call runs on a
/// spawned task because it needs the async lock.
struct DisconnectGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let destroyed = state.directory.lock().await.disconnect(player_id).await;
            if !destroyed.is_empty() {
                tracing::debug!(%player_id, rooms = ?destroyed, "rooms emptied by disconnect");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ZodiacError> {
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::debug!(%conn_id, %player_id, "handling new connection");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let _guard = DisconnectGuard {
        player_id,
        state: Arc::clone(&state),
    };

    loop {
        tokio::select! {
            frame = conn.recv() => {
                let data = match frame {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                handle_frame(&state, player_id, &outbound_tx, &data).await;
            }
            Some(event) = outbound_rx.recv() => {
                let bytes = state.codec.encode(&event)?;
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%player_id, error = %e, "send failed");
                    break;
                }
            }
        }
    }

    // _guard drops here → disconnect fires.
    Ok(())
}

/// Decodes one frame and routes the event.
///
/// Bad frames are dropped: nothing is sent back and the connection stays
/// open.
async fn handle_frame<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    outbound: &PlayerSender,
    data: &[u8],
) {
    let event: ClientEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "failed to decode event");
            return;
        }
    };
    if let Err(e) = event.validate() {
        tracing::info!(%player_id, error = %e, "rejected event");
        return;
    }

    let result = match event {
        ClientEvent::JoinRoom(join) => {
            tracing::debug!(%player_id, room_id = %join.room_id, username = %join.username, "join_room");
            let mut directory = state.directory.lock().await;
            directory
                .join(
                    player_id,
                    join.room_id,
                    join.username,
                    join.config,
                    outbound.clone(),
                )
                .await
        }
        event => state.directory.lock().await.dispatch(player_id, event).await,
    };

    if let Err(e) = result {
        tracing::debug!(%player_id, error = %e, "room unavailable");
    }
}
