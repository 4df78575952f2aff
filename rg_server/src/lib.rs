//! HTTP and WebSocket front end for the rank guess card game.
//!
//! Wires [`rank_guess`] rooms to axum routes, authenticates callers with JWT
//! access tokens and forwards room events to each player's socket.

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
