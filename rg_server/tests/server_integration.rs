//! Integration tests for the HTTP API.
//!
//! Requests are driven straight through the router with `oneshot`; tokens are
//! minted with the same secret the server verifies with.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rank_guess::room::RoomConfig;
use rg_server::api::{AppState, create_router};
use serde_json::{Value, json};
use tower::ServiceExt; // For `oneshot` method

const SECRET: &str = "test_secret_key_for_testing_only_0123456789";

fn create_test_server() -> (axum::Router, AppState) {
    let state = AppState::new(RoomConfig::default(), SECRET);
    (create_router(state.clone()), state)
}

fn token(state: &AppState, user_id: &str, name: &str) -> String {
    state
        .tokens
        .issue(user_id, name, chrono::Duration::minutes(15))
        .unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn create_room_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/rooms")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn whitelist_request(token: &str, room_code: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/api/v1/rooms/whitelist")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "roomCode": room_code }).to_string()))
        .unwrap()
}

fn get_room_request(token: &str, room_code: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/api/v1/rooms/{room_code}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, state) = create_test_server();
    state.registry.create_room().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rooms"]["active_count"], 1);
}

// ============================================================================
// Authentication Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let (app, _) = create_test_server();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/rooms")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_forged_token_is_rejected() {
    let (app, _) = create_test_server();
    let forged = AppState::new(RoomConfig::default(), "some_other_secret_that_is_long_enough!!");
    let token = token(&forged, "user-1", "Mallory");

    let (status, _) = send(&app, create_room_request(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (app, state) = create_test_server();
    let token = state
        .tokens
        .issue("user-1", "Alice", chrono::Duration::hours(-2))
        .unwrap();

    let (status, body) = send(&app, create_room_request(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access denied: token expired");
}

#[tokio::test]
async fn test_websocket_requires_token() {
    let (app, _) = create_test_server();

    let request = Request::builder().uri("/ws").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    // Rejected before any upgrade is attempted
    assert_ne!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
    assert!(response.status().is_client_error());
}

// ============================================================================
// Room Tests
// ============================================================================

#[tokio::test]
async fn test_create_room_returns_code() {
    let (app, state) = create_test_server();
    let token = token(&state, "user-1", "Alice");

    let (status, body) = send(&app, create_room_request(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "ROOM-0001");

    let (_, body) = send(&app, create_room_request(&token)).await;
    assert_eq!(body["data"], "ROOM-0002");
    assert_eq!(state.registry.room_count().await, 2);
}

#[tokio::test]
async fn test_whitelist_flow() {
    let (app, state) = create_test_server();
    let code = state.registry.create_room().await;

    for i in 1..=4 {
        let token = token(&state, &format!("user-{i}"), &format!("Player {i}"));
        let (status, body) = send(&app, whitelist_request(&token, &code)).await;
        assert_eq!(status, StatusCode::OK, "player {i} should get a slot");
        assert_eq!(body["success"], true);
    }

    // Repeating a whitelist is fine
    let again = token(&state, "user-1", "Player 1");
    let (status, _) = send(&app, whitelist_request(&again, &code)).await;
    assert_eq!(status, StatusCode::OK);

    let late = token(&state, "user-5", "Player 5");
    let (status, body) = send(&app, whitelist_request(&late, &code)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Room is full");

    assert!(state.registry.is_whitelisted(&code, "user-4").await.unwrap());
    assert!(!state.registry.is_whitelisted(&code, "user-5").await.unwrap());
}

#[tokio::test]
async fn test_whitelist_unknown_room() {
    let (app, state) = create_test_server();
    let token = token(&state, "user-1", "Alice");

    let (status, body) = send(&app, whitelist_request(&token, "ROOM-0404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Room not found");
}

#[tokio::test]
async fn test_get_room_snapshot() {
    let (app, state) = create_test_server();
    let token = token(&state, "user-1", "Alice");
    let code = state.registry.create_room().await;
    send(&app, whitelist_request(&token, &code)).await;

    let (status, body) = send(&app, get_room_request(&token, &code)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["code"], code);
    assert_eq!(body["data"]["phase"], "lobby");
    assert_eq!(body["data"]["maxPlayers"], 4);
    assert_eq!(body["data"]["whitelistCount"], 1);
    assert_eq!(body["data"]["playerCount"], 0);

    let (status, body) = send(&app, get_room_request(&token, "ROOM-0404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_authenticated_callers_get_profiles() {
    let (app, state) = create_test_server();
    let token = token(&state, "user-9", "Zoe");
    assert!(state.profiles.is_empty().await);

    send(&app, create_room_request(&token)).await;
    assert_eq!(state.profiles.len().await, 1);
}
