//! HTTP/WebSocket API for the rank guess server.
//!
//! # Modules
//!
//! - [`rooms`]: Room creation, whitelisting and lookup
//! - [`websocket`]: Real-time connection used to join a room and play
//! - [`middleware`]: Authentication middleware for protected endpoints
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                  - Health check (public)
//! POST /api/v1/rooms            - Create room (auth required)
//! PUT  /api/v1/rooms/whitelist  - Whitelist caller for a room (auth required)
//! GET  /api/v1/rooms/{code}     - Room snapshot (auth required)
//! GET  /ws?token=<jwt>          - WebSocket (auth via query parameter)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use rg_server::api::{create_router, AppState};
//! use rank_guess::RoomConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(RoomConfig::default(), "a-secret-of-at-least-32-characters!");
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development.

pub mod middleware;
pub mod rooms;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use rank_guess::room::{Profile, ProfileDirectory, RoomConfig, RoomRegistry};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::auth::{AuthError, Claims, TokenVerifier};

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloned for each request; every field is a shared handle.
#[derive(Clone)]
pub struct AppState {
    pub registry: RoomRegistry,
    pub profiles: Arc<ProfileDirectory>,
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(room_config: RoomConfig, jwt_secret: &str) -> Self {
        let profiles = Arc::new(ProfileDirectory::new());
        let registry = RoomRegistry::new(room_config, profiles.clone());

        Self {
            registry,
            profiles,
            tokens: Arc::new(TokenVerifier::new(jwt_secret)),
        }
    }

    /// Verify an access token and record the caller's display name
    pub async fn authenticate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.tokens.verify(token)?;
        self.profiles
            .upsert(Profile {
                id: claims.sub.clone(),
                name: claims.name.clone(),
            })
            .await;
        Ok(claims)
    }
}

/// Standard JSON envelope for HTTP responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: message.into(),
            data: None,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    // Root routes (health check, WebSocket - not versioned)
    let root_routes = Router::new()
        .route("/health", get(health_check))
        // WebSocket route handles its own auth via query parameter
        .route("/ws", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router. Every room route requires authentication.
fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/whitelist", put(rooms::whitelist))
        .route("/rooms/{code}", get(rooms::get_room))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ))
}

/// Health check endpoint for monitoring and load balancers.
///
/// # Example
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","rooms":{"active_count":2},"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let room_count = state.registry.room_count().await;

    let response = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "rooms": {
            "active_count": room_count
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(response))
}
