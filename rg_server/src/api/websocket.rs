//! WebSocket handler for playing in a room.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws?token=<jwt_token>`
//! 2. Server validates the JWT and upgrades the connection
//! 3. Server spawns a send task that forwards room events and command
//!    responses to the socket
//! 4. Incoming client commands are handled in order on the connection task
//! 5. On disconnect the player leaves whatever room they were in
//!
//! # Client Messages
//!
//! ```text
//! { "type": "JOIN_ROOM",        "payload": { "roomCode": "ROOM-0001" } }
//! { "type": "PLAYER_READY",     "payload": { "isReady": true } }
//! { "type": "SUBMIT_GUESS",     "payload": { "guess": 2 } }
//! { "type": "NEXT_ROUND_READY" }
//! { "type": "LEAVE_ROOM" }
//! ```
//!
//! Every command is answered with
//! `{ "type": "RESPONSE", "payload": { "success": bool, "message": string } }`.
//! Room broadcasts (`LOBBY_STATE`, `GAME_START_COUNTDOWN`, ...) arrive on the
//! same socket as they happen.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use rank_guess::room::{LeaveOutcome, Outbound, PlayerAction, RoomCode, RoomEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::AppState;
use crate::{auth::AuthError, logging::log_security_event};

/// Room events buffered per connection before new ones are dropped
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Client messages received via WebSocket
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_code: RoomCode },
    #[serde(rename_all = "camelCase")]
    PlayerReady { is_ready: bool },
    SubmitGuess { guess: u32 },
    NextRoundReady,
    LeaveRoom,
}

/// Response messages sent to client
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
enum ServerResponse {
    Response { success: bool, message: String },
}

impl ServerResponse {
    fn success(message: impl Into<String>) -> Self {
        ServerResponse::Response {
            success: true,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        ServerResponse::Response {
            success: false,
            message: message.into(),
        }
    }
}

/// Per-connection state
struct Session {
    user_id: String,
    /// Room the player is seated in
    room: Option<RoomCode>,
    /// Sink handed to rooms for this connection's events
    events: Outbound,
}

/// Upgrade HTTP connection to WebSocket.
///
/// Returns `401 Unauthorized` when the token is missing, invalid or expired.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let result = match query.token.as_deref() {
        Some(token) => state.authenticate(token).await,
        None => Err(AuthError::MissingToken),
    };

    let user_id = match result {
        Ok(claims) => claims.sub,
        Err(e) => {
            log_security_event("rejected_ws_token", None, &e.to_string());
            return (StatusCode::UNAUTHORIZED, e.client_message()).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user_id, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, user_id: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket connected: user={}", user_id);

    let (event_tx, mut event_rx) = mpsc::channel::<RoomEvent>(EVENT_BUFFER);
    let (response_tx, mut response_rx) = mpsc::channel::<String>(32);

    let mut session = Session {
        user_id: user_id.clone(),
        room: None,
        events: Arc::new(event_tx),
    };

    // Forward room events and command responses to the socket
    let send_task = tokio::spawn(async move {
        loop {
            let json = tokio::select! {
                Some(event) = event_rx.recv() => match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize room event: {}", e);
                        continue;
                    }
                },
                Some(response_json) = response_rx.recv() => response_json,
                else => break,
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive messages from client
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => handle_client_message(client_msg, &mut session, &state).await,
                    Err(e) => {
                        warn!("Failed to parse client message from {}: {}", user_id, e);
                        ServerResponse::error("Invalid message format")
                    }
                };

                if let Ok(json) = serde_json::to_string(&response)
                    && response_tx.send(json).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: user={}", user_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup - automatically leave the room on disconnect
    send_task.abort();

    if let Some(code) = session.room.take() {
        let outcome = state
            .registry
            .leave_from(&code, &user_id, session.events.clone())
            .await;
        info!(
            "User {} left room {} on disconnect ({:?})",
            user_id, code, outcome
        );
    }

    info!("WebSocket disconnected: user={}", user_id);
}

/// Process a client command and return the response for the caller.
async fn handle_client_message(
    msg: ClientMessage,
    session: &mut Session,
    state: &AppState,
) -> ServerResponse {
    let action = match msg {
        ClientMessage::JoinRoom { room_code } => return join_room(room_code, session, state).await,
        ClientMessage::LeaveRoom => return leave_room(session, state).await,
        ClientMessage::PlayerReady { is_ready } => PlayerAction::SetReady { is_ready },
        ClientMessage::SubmitGuess { guess } => PlayerAction::SubmitGuess { guess },
        ClientMessage::NextRoundReady => PlayerAction::NextRoundReady,
    };

    let Some(room_code) = session.room.as_deref() else {
        return ServerResponse::error("Join a room first");
    };

    match state
        .registry
        .handle_action(room_code, &session.user_id, action)
        .await
    {
        Ok(()) => ServerResponse::success("Action processed successfully"),
        Err(e) => ServerResponse::error(e.client_message()),
    }
}

async fn join_room(room_code: RoomCode, session: &mut Session, state: &AppState) -> ServerResponse {
    let registry = &state.registry;
    let user_id = session.user_id.as_str();

    if session.room.as_deref() == Some(room_code.as_str()) {
        return ServerResponse::success(format!("Already in room {room_code}"));
    }

    if !matches!(registry.is_whitelisted(&room_code, user_id).await, Ok(true)) {
        return ServerResponse::error("Room not found or player not whitelisted");
    }

    if let Err(e) = registry.join(&room_code, user_id, session.events.clone()).await {
        return ServerResponse::error(e.client_message());
    }
    info!("User {} joined room {}", user_id, room_code);

    // One room per connection; the old seat goes only once the new one is held
    if let Some(previous) = session.room.replace(room_code.clone()) {
        registry
            .leave_from(&previous, user_id, session.events.clone())
            .await;
    }

    ServerResponse::success(format!("Joined room {room_code}"))
}

async fn leave_room(session: &mut Session, state: &AppState) -> ServerResponse {
    let Some(room_code) = session.room.take() else {
        return ServerResponse::error("Join a room first");
    };

    match state
        .registry
        .leave_from(&room_code, &session.user_id, session.events.clone())
        .await
    {
        LeaveOutcome::NotSeated => ServerResponse::error("You are not in this room"),
        LeaveOutcome::Left | LeaveOutcome::RoomEmptied => {
            ServerResponse::success(format!("Left room {room_code}"))
        }
    }
}
