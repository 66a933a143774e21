//! Node Siege match server
//!
//! Authoritative simulation for a two-player node capture game:
//! - WebSocket transport and JSON message protocol
//! - Matchmaking queue pairing sessions into matches
//! - Per-match actor running production and movement ticks

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod matchmaking;
pub mod session;
pub mod util;
pub mod ws;
