//! Authentication middleware for protected endpoints.
//!
//! Validates the JWT access token from the `Authorization` header and injects
//! the authenticated player id (`String`) into request extensions.
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//!
//! async fn protected_handler(Extension(user_id): Extension<String>) -> String {
//!     format!("Authenticated as {}", user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use super::{ApiResponse, AppState};
use crate::{auth::AuthError, logging::log_security_event};

/// Authentication middleware that validates JWT tokens and injects the user id.
///
/// # Behavior
///
/// - **Success**: Token valid → records the caller's profile, injects `user_id: String` → calls next handler
/// - **Missing header**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let result = match token {
        Some(token) => state.authenticate(token).await,
        None => Err(AuthError::MissingToken),
    };

    match result {
        Ok(claims) => {
            request.extensions_mut().insert(claims.sub);
            next.run(request).await
        }
        Err(e) => {
            log_security_event("rejected_token", None, &e.to_string());
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::message(false, e.client_message())),
            )
                .into_response()
        }
    }
}
