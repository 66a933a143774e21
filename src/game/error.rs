//! Error types for match simulation

use thiserror::Error;

/// Reasons an attack order is rejected. None of these reach the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttackError {
    #[error("Node not found: {0}")]
    UnknownNode(String),

    #[error("Player {player_id} does not own node {node}")]
    NotOwner { node: String, player_id: String },

    #[error("Unit count must be positive, got {0}")]
    NonPositiveUnits(i64),

    #[error("Insufficient units: requested {requested}, node has {available}")]
    InsufficientUnits { requested: i64, available: u32 },

    #[error("Order claims player {claimed} but was sent by {actual}")]
    Impersonation { claimed: String, actual: String },

    #[error("Session is not part of this match")]
    UnknownSession,
}

/// Node placement could not find room on the playfield
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("No free position after {attempts} attempts ({placed} nodes placed)")]
    PlayfieldFull { placed: usize, attempts: u32 },
}
