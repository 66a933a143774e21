//! Nodes and in-flight unit streams

use std::ops::{Add, Mul, Sub};

/// Point or vector on the playfield
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Position) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, `None` for the zero vector
    pub fn normalized(self) -> Option<Position> {
        let len = self.length();
        (len > f32::EPSILON).then(|| Position::new(self.x / len, self.y / len))
    }

    /// Counter-clockwise perpendicular
    pub fn perpendicular(self) -> Position {
        Position::new(-self.y, self.x)
    }

    pub fn lerp(self, to: Position, t: f32) -> Position {
        self + (to - self) * t
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Position {
    type Output = Position;

    fn mul(self, rhs: f32) -> Position {
        Position::new(self.x * rhs, self.y * rhs)
    }
}

/// Identity a player's nodes and streams are stamped with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerTag {
    pub player_id: String,
    pub display_name: String,
    pub color: String,
}

/// Who holds a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Owner {
    #[default]
    Unowned,
    Player(PlayerTag),
}

impl Owner {
    pub fn player_id(&self) -> Option<&str> {
        match self {
            Owner::Unowned => None,
            Owner::Player(tag) => Some(tag.player_id.as_str()),
        }
    }

    pub fn tag(&self) -> Option<&PlayerTag> {
        match self {
            Owner::Unowned => None,
            Owner::Player(tag) => Some(tag),
        }
    }

    pub fn is_player(&self, player_id: &str) -> bool {
        self.player_id() == Some(player_id)
    }
}

/// A capturable point on the map.
///
/// `unit_count` is unsigned, so a garrison can never go negative. Nodes are
/// never removed during a match; a node at 0 units stays capturable.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub unit_count: u32,
    pub owner: Owner,
}

impl Node {
    pub fn neutral(id: impl Into<String>, position: Position, unit_count: u32) -> Self {
        Self {
            id: id.into(),
            position,
            unit_count,
            owner: Owner::Unowned,
        }
    }

    pub fn owned(
        id: impl Into<String>,
        position: Position,
        unit_count: u32,
        tag: PlayerTag,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            unit_count,
            owner: Owner::Player(tag),
        }
    }

    /// Production step: owned nodes gain one unit, unowned nodes never grow
    pub fn produce(&mut self) {
        if matches!(self.owner, Owner::Player(_)) {
            self.unit_count = self.unit_count.saturating_add(1);
        }
    }
}

/// One unit travelling from a source node to a target node.
///
/// `progress` is the stream's raw clock: while it is below `wave_delay` the
/// stream waits at its source, afterwards `progress - wave_delay` is the
/// travelled fraction of the path from `origin` to `destination`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStream {
    pub source_node_id: String,
    pub target_node_id: String,
    pub owner: PlayerTag,
    pub unit_value: u32,
    pub progress: f32,
    pub wave_delay: f32,
    /// Source node center
    pub origin: Position,
    /// Point on the target's edge facing the source
    pub destination: Position,
    /// Perpendicular jitter applied to the rendered position
    pub offset: Position,
}

impl UnitStream {
    pub fn is_waiting(&self) -> bool {
        self.progress < self.wave_delay
    }

    /// Travelled fraction of the path, in `[0, 1]`
    pub fn travelled(&self) -> f32 {
        (self.progress - self.wave_delay).clamp(0.0, 1.0)
    }

    pub fn path_length(&self) -> f32 {
        self.origin.distance_to(self.destination).max(1.0)
    }

    pub fn remaining_distance(&self) -> f32 {
        (1.0 - self.travelled()) * self.path_length()
    }

    pub fn position(&self) -> Position {
        self.origin.lerp(self.destination, self.travelled()) + self.offset
    }
}
