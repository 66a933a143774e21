//! Matchmaking: FIFO pairing of waiting sessions

pub mod queue;
pub mod service;

pub use service::MatchmakingService;
