//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::ops::ControlFlow;

use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::relay::Connection;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, PeerId, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, ws_stream) = socket.split();

    let connection = state.relay.connect();
    let peer_id = connection.peer_id;

    if let Err(e) = send_msg(&mut ws_sink, &connection.initial).await {
        error!(peer_id = %peer_id, error = %e, "Failed to send initial");
        state.relay.disconnect(peer_id);
        return;
    }

    let rate_limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);
    run_session(&state, connection, ws_sink, ws_stream, rate_limiter).await;

    // Cleanup on disconnect
    state.relay.disconnect(peer_id);

    info!(peer_id = %peer_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    state: &AppState,
    mut connection: Connection,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    rate_limiter: ConnectionRateLimiter,
) {
    let peer_id = connection.peer_id;

    // Spawn writer task: room broadcasts -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            match connection.recv().await {
                Ok(msg) => {
                    if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                        debug!(peer_id = %peer_id, error = %e, "WebSocket send failed");
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    warn!(
                        peer_id = %peer_id,
                        lagged_count = n,
                        "Client lagged, skipping {} messages", n
                    );
                    // Continue - don't disconnect for lag
                }
                Err(RecvError::Closed) => {
                    debug!(peer_id = %peer_id, "Room channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> room
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if forward(state, peer_id, &text, &rate_limiter).is_break() {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(peer_id = %peer_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(peer_id = %peer_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(peer_id = %peer_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Parses one text frame and relays it to the peer's room.
/// Breaks when the connection has to be closed.
fn forward(state: &AppState, peer_id: PeerId, text: &str, rate_limiter: &ConnectionRateLimiter) -> ControlFlow<()> {
    let msg = match serde_json::from_str::<ClientMsg>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(peer_id = %peer_id, error = %e, "Failed to parse client message");
            return ControlFlow::Continue(());
        }
    };

    if !rate_limiter.check_input() {
        return match msg {
            // A lost press or release leaves every peer replaying the wrong input
            ClientMsg::CommandInfo(_) | ClientMsg::Snapshot(_) => {
                warn!(peer_id = %peer_id, "Input rate exceeded, closing connection");
                ControlFlow::Break(())
            }
            ClientMsg::Message(_) => {
                warn!(peer_id = %peer_id, "Rate limited chat message");
                ControlFlow::Continue(())
            }
        };
    }

    state.relay.relay(peer_id, msg);
    ControlFlow::Continue(())
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
