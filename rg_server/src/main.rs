//! Rank guess game server.
//!
//! Each room runs as its own actor inside the shared `RoomRegistry`; players
//! reach it through the HTTP API and a WebSocket.

use std::net::SocketAddr;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use rg_server::{api, config::ServerConfig, logging};

const HELP: &str = "\
Run a rank guess game server

USAGE:
  rg_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                 Server bind address (e.g., 0.0.0.0:8080)
  JWT_SECRET                  JWT verification secret (required, at least 32 characters)
  ROOM_MAX_PLAYERS            Seats per room, 1 to 4 [default: 4]
  ROOM_COUNTDOWN_SECS         Delay before the first deal [default: 5]
  ROOM_RESULTS_DISPLAY_SECS   How long results stay up [default: 10]
  RUST_LOG                    Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;

    logging::init();

    let config = ServerConfig::from_env(bind)?;
    config.validate()?;

    info!(
        "Rooms: {} seats, {:?} countdown, {:?} results display",
        config.room.max_players, config.room.countdown, config.room.results_display
    );

    let state = api::AppState::new(config.room.clone(), &config.security.jwt_secret);
    let app = api::create_router(state);

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
