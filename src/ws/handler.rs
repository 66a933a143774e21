//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::session::{Outbox, Session, OUTBOUND_BUFFER};
use crate::util::rate_limit::PlayerRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg, SessionId};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    info!(session_id = %session_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel::<ServerMsg>(OUTBOUND_BUFFER);

    // Writer task: session channel -> WebSocket
    let writer_handle = tokio::spawn(write_loop(session_id, ws_sink, outbound_rx));

    read_loop(session_id, ws_stream, outbound_tx, &state).await;

    // Cleanup on disconnect
    state.matchmaking.disconnect(session_id).await;
    writer_handle.abort();

    info!(session_id = %session_id, "WebSocket connection closed");
}

async fn write_loop(
    session_id: SessionId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    outbound_rx: mpsc::Receiver<ServerMsg>,
) {
    let mut outbox = Outbox::new(outbound_rx);
    while let Some(msg) = outbox.recv().await {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            debug!(session_id = %session_id, error = %e, "WebSocket send failed");
            break;
        }
    }
}

/// Reader loop: WebSocket -> matchmaking / match
async fn read_loop(
    session_id: SessionId,
    mut ws_stream: SplitStream<WebSocket>,
    outbound_tx: mpsc::Sender<ServerMsg>,
    state: &AppState,
) {
    let rate_limiter = PlayerRateLimiter::new();

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(session_id = %session_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::FindGame(profile)) => {
                        let session = Session::new(session_id, profile, outbound_tx.clone());
                        state.matchmaking.find_game(session);
                    }
                    Ok(ClientMsg::PlayerAction(action)) => {
                        state.matchmaking.submit_action(session_id, action).await;
                    }
                    Err(e) => {
                        warn!(
                            session_id = %session_id,
                            error = %e,
                            "Failed to parse client message"
                        );
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(session_id = %session_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
        }
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
