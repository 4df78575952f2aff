//! Structured logging configuration.
//!
//! Records from the `log` facade (used by the game core) are forwarded into
//! the same subscriber, so one `RUST_LOG` filter covers both crates.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var and default to
/// `info` with noisy transport crates turned down.
///
/// # Example
///
/// ```no_run
/// use rg_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower_http=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use rg_server::logging::log_security_event;
///
/// log_security_event("invalid_token", None, "Signature mismatch");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        "SECURITY: {}",
        message
    );
}

/// Log a room request made through the API
pub fn log_room_event(event_type: &str, room_code: &str, user_id: &str, success: bool) {
    tracing::info!(
        event_type = event_type,
        room_code = room_code,
        user_id = user_id,
        success = success,
        "Room request handled"
    );
}
