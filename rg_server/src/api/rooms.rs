//! Room management API handlers.
//!
//! Every endpoint requires a JWT bearer token. Playing happens over the
//! WebSocket; these endpoints only create rooms, hand out seats on the
//! whitelist and report room state.
//!
//! # Examples
//!
//! Create a room:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/rooms -H "Authorization: Bearer TOKEN"
//! ```
//!
//! Get whitelisted for a room:
//! ```bash
//! curl -X PUT http://localhost:6969/api/v1/rooms/whitelist \
//!   -H "Authorization: Bearer TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"roomCode": "ROOM-0001"}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use rank_guess::room::{RoomCode, RoomError, RoomSnapshot};
use serde::Deserialize;

use super::{ApiResponse, AppState};
use crate::logging::log_room_event;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistRequest {
    pub room_code: RoomCode,
}

/// HTTP status for a room error
pub fn status_for(err: &RoomError) -> StatusCode {
    match err {
        RoomError::RoomNotFound(_) | RoomError::UserNotFound(_) | RoomError::PlayerNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        RoomError::RoomFull | RoomError::WrongPhase { .. } => StatusCode::CONFLICT,
        RoomError::NotWhitelisted(_) => StatusCode::FORBIDDEN,
        RoomError::InvalidGuess { .. } => StatusCode::BAD_REQUEST,
        RoomError::InvalidConfig(_) | RoomError::Deal(_) | RoomError::Evaluate(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Create a new room.
///
/// The caller is not whitelisted automatically; they reserve a seat with the
/// whitelist endpoint like everyone else.
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Room created", "data": "ROOM-0001" }
/// ```
pub async fn create_room(
    State(state): State<AppState>,
    Extension(user_id): Extension<String>,
) -> (StatusCode, Json<ApiResponse<RoomCode>>) {
    let code = state.registry.create_room().await;
    log_room_event("create", &code, &user_id, true);

    (StatusCode::OK, Json(ApiResponse::ok("Room created", code)))
}

/// Whitelist the caller for a room.
///
/// # Response
///
/// - `200 OK`: Caller may now join over the WebSocket (also when already whitelisted)
/// - `404 Not Found`: No such room
/// - `409 Conflict`: Every whitelist slot is taken
pub async fn whitelist(
    State(state): State<AppState>,
    Extension(user_id): Extension<String>,
    Json(request): Json<WhitelistRequest>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let result = state.registry.whitelist(&request.room_code, &user_id).await;
    log_room_event("whitelist", &request.room_code, &user_id, result.is_ok());

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::message(true, "Player successfully whitelisted for room")),
        ),
        Err(e) => (status_for(&e), Json(ApiResponse::message(false, e.client_message()))),
    }
}

/// Get a read-only snapshot of a room.
///
/// # Response
///
/// - `200 OK`: Snapshot with phase, capacity and roster
/// - `404 Not Found`: No such room (never created or already emptied)
pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<RoomCode>,
) -> (StatusCode, Json<ApiResponse<RoomSnapshot>>) {
    match state.registry.get_room(&code).await {
        Some(snapshot) => (StatusCode::OK, Json(ApiResponse::ok("Room found", snapshot))),
        None => {
            let err = RoomError::RoomNotFound(code);
            (
                status_for(&err),
                Json(ApiResponse {
                    success: false,
                    message: err.client_message(),
                    data: None,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&RoomError::RoomNotFound("ROOM-0001".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_for(&RoomError::RoomFull), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&RoomError::NotWhitelisted("p1".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&RoomError::InvalidGuess { guess: 9, max: 4 }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_whitelist_request_is_camel_case() {
        let request: WhitelistRequest =
            serde_json::from_str(r#"{"roomCode":"ROOM-0007"}"#).unwrap();
        assert_eq!(request.room_code, "ROOM-0007");
    }
}
