//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use rank_guess::room::{MAX_PLAYERS, RoomConfig};
use std::{net::SocketAddr, time::Duration};

/// Default bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: &str = "127.0.0.1:6969";

/// Shortest accepted JWT secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Security configuration
    pub security: SecurityConfig,
    /// Settings applied to every room
    pub room: RoomConfig,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => {
                let raw = std::env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{raw}' is not an IP:PORT address"),
                })?
            }
        };

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let defaults = RoomConfig::default();
        let room = RoomConfig {
            max_players: parse_env_or("ROOM_MAX_PLAYERS", defaults.max_players),
            countdown: Duration::from_secs(parse_env_or(
                "ROOM_COUNTDOWN_SECS",
                defaults.countdown.as_secs(),
            )),
            results_display: Duration::from_secs(parse_env_or(
                "ROOM_RESULTS_DISPLAY_SECS",
                defaults.results_display.as_secs(),
            )),
        };

        Ok(ServerConfig {
            bind,
            security: SecurityConfig { jwt_secret },
            room,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!("Must be at least {MIN_JWT_SECRET_LEN} characters (128-bit security)"),
            });
        }

        if self.room.max_players == 0 || self.room.max_players > MAX_PLAYERS {
            return Err(ConfigError::Invalid {
                var: "ROOM_MAX_PLAYERS".to_string(),
                reason: format!("Must be between 1 and {MAX_PLAYERS}"),
            });
        }

        if self.room.countdown.is_zero() {
            return Err(ConfigError::Invalid {
                var: "ROOM_COUNTDOWN_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.room.results_display.is_zero() {
            return Err(ConfigError::Invalid {
                var: "ROOM_RESULTS_DISPLAY_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
