//! Combat resolution - one arriving stream against its target node

use super::entity::{Node, Owner, UnitStream};

/// What an arrival did to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    /// Stream joined a node of its own owner
    Reinforced,
    /// Stream outnumbered the garrison and took the node
    Captured,
    /// Garrison absorbed the stream
    Repelled,
}

/// New node state after an arrival
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub owner: Owner,
    pub unit_count: u32,
    pub outcome: CombatOutcome,
}

/// Resolve a single arriving stream against `target`.
///
/// Pure: the same stream and node always give the same resolution. The
/// ownership test uses the owner stamped on the stream at launch, not the
/// current owner of its source node.
pub fn resolve(stream: &UnitStream, target: &Node) -> Resolution {
    if target.owner.is_player(&stream.owner.player_id) {
        return Resolution {
            owner: target.owner.clone(),
            unit_count: target.unit_count.saturating_add(stream.unit_value),
            outcome: CombatOutcome::Reinforced,
        };
    }

    if stream.unit_value > target.unit_count {
        Resolution {
            owner: Owner::Player(stream.owner.clone()),
            unit_count: stream.unit_value - target.unit_count,
            outcome: CombatOutcome::Captured,
        }
    } else {
        Resolution {
            owner: target.owner.clone(),
            unit_count: target.unit_count - stream.unit_value,
            outcome: CombatOutcome::Repelled,
        }
    }
}

/// Resolve `stream` against `target` and write the result back
pub fn engage(stream: &UnitStream, target: &mut Node) -> CombatOutcome {
    let Resolution {
        owner,
        unit_count,
        outcome,
    } = resolve(stream, target);
    target.owner = owner;
    target.unit_count = unit_count;
    outcome
}
