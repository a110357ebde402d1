pub mod handlers;
mod lobby;
mod play;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::broadcast::RoomEvent;
use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_VERSION};
use crate::state::AppState;
use crate::types::{LobbyCode, PlayerId};

/// Per-socket session: who this is and which room they listen to
pub struct Connection {
    pub player_id: PlayerId,
    pub lobby: Option<LobbyCode>,
    pub room: Option<broadcast::Receiver<RoomEvent>>,
}

impl Connection {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            lobby: None,
            room: None,
        }
    }

    pub fn enter(&mut self, code: LobbyCode, room: broadcast::Receiver<RoomEvent>) {
        self.lobby = Some(code);
        self.room = Some(room);
    }

    pub fn exit(&mut self) -> Option<LobbyCode> {
        self.room = None;
        self.lobby.take()
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn send(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            true
        }
    }
}

/// Next event from the joined room, or never if not in one
async fn next_event(
    room: &mut Option<broadcast::Receiver<RoomEvent>>,
) -> Result<RoomEvent, RecvError> {
    match room {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut conn = Connection::new(ulid::Ulid::new().to_string());

    tracing::info!("WebSocket connected: player {}", conn.player_id);

    let welcome = ServerMessage::Welcome {
        protocol: PROTOCOL_VERSION.to_string(),
        player_id: conn.player_id.clone(),
    };
    if !send(&mut sender, &welcome).await {
        tracing::error!("Failed to send welcome message");
        return;
    }

    loop {
        tokio::select! {
            event = next_event(&mut conn.room) => {
                match event {
                    Ok(event) => {
                        if let Some(msg) = event.render_for(&conn.player_id) {
                            if !send(&mut sender, &msg).await {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(
                            "Player {} lagged, skipped {} events",
                            conn.player_id,
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => {
                        // Lobby was torn down
                        conn.exit();
                    }
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(client_msg, &mut conn, &state).await
                                {
                                    if !send(&mut sender, &response).await {
                                        tracing::error!("Failed to send response");
                                        break;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::debug!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if !send(&mut sender, &error).await {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed by player {}", conn.player_id);
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    if let Some(code) = conn.exit() {
        if let Err(e) = state.disconnect(&code, &conn.player_id).await {
            tracing::debug!("Disconnect of {} from {}: {}", conn.player_id, code, e);
        }
    }
    tracing::info!("WebSocket connection closed: player {}", conn.player_id);
}
