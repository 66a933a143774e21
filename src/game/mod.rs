//! Game simulation modules

pub mod broadcast;
pub mod combat;
pub mod entity;
pub mod error;
pub mod r#match;
pub mod movement;
pub mod placement;
pub mod registry;
pub mod snapshot;
pub mod victory;

pub use entity::{Node, Owner, PlayerTag, Position, UnitStream};
pub use error::{AttackError, PlacementError};
pub use r#match::{GameMatch, MatchCommand, MatchEnd, MatchHandle, MatchState};
pub use registry::MatchRegistry;
pub use victory::MatchOutcome;
