//! Stream movement along the source -> target-edge line

use std::ops::RangeInclusive;

use crate::config::GameSettings;

use super::entity::{Position, UnitStream};

/// Streams per wave, clamped to the units left to send
pub const WAVE_SIZE: RangeInclusive<u32> = 3..=10;

/// Extra wait, in progress units, per wave index
pub const WAVE_DELAY_STEP: f32 = 0.5;

/// Progress gained per movement tick while a stream waits for its wave
pub const DELAY_INCREMENT: f32 = 0.1;

/// Largest perpendicular jitter, in playfield units
pub const MAX_JITTER: f32 = 10.0;

/// Arrival distance as a fraction of the node radius
const ARRIVAL_RADIUS_FRACTION: f32 = 0.1;

/// Per-match movement constants derived from settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementParams {
    /// Playfield units travelled per movement tick
    pub step_distance: f32,
    /// Remaining distance at which a stream counts as arrived
    pub arrival_threshold: f32,
}

impl MovementParams {
    pub fn from_settings(settings: &GameSettings) -> Self {
        Self {
            step_distance: settings.movement_speed * settings.movement_period().as_secs_f32(),
            arrival_threshold: settings.node_radius * ARRIVAL_RADIUS_FRACTION,
        }
    }
}

/// Result of advancing one stream by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Waiting,
    Moving,
    Arrived,
}

/// Point on the edge of the circle at `target` facing `source`
pub fn edge_point(source: Position, target: Position, radius: f32) -> Position {
    match (target - source).normalized() {
        Some(dir) => target - dir * radius,
        None => target,
    }
}

/// Advance a stream by one movement tick.
///
/// The progress increment is the step distance divided by the path length,
/// so every stream covers the same playfield distance per tick regardless
/// of how far apart its nodes are.
pub fn advance(stream: &mut UnitStream, params: &MovementParams) -> Advance {
    if stream.is_waiting() {
        stream.progress = (stream.progress + DELAY_INCREMENT).min(stream.wave_delay);
        return Advance::Waiting;
    }

    stream.progress += params.step_distance / stream.path_length();

    if stream.remaining_distance() <= params.arrival_threshold {
        stream.progress = stream.wave_delay + 1.0;
        Advance::Arrived
    } else {
        Advance::Moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::PlayerTag;

    fn stream_between(origin: Position, destination: Position, wave_delay: f32) -> UnitStream {
        UnitStream {
            source_node_id: "p1".into(),
            target_node_id: "n0".into(),
            owner: PlayerTag {
                player_id: "a".into(),
                display_name: "A".into(),
                color: "#fff".into(),
            },
            unit_value: 1,
            progress: 0.0,
            wave_delay,
            origin,
            destination,
            offset: Position::default(),
        }
    }

    fn ticks_until_arrival(stream: &mut UnitStream, params: &MovementParams) -> u32 {
        let mut ticks = 0;
        loop {
            ticks += 1;
            if advance(stream, params) == Advance::Arrived {
                return ticks;
            }
            assert!(ticks < 100_000, "stream never arrived");
        }
    }

    #[test]
    fn edge_point_faces_source() {
        let edge = edge_point(Position::new(0.0, 0.0), Position::new(100.0, 0.0), 40.0);
        assert_eq!(edge, Position::new(60.0, 0.0));
    }

    #[test]
    fn default_params_move_one_unit_per_tick() {
        let params = MovementParams::from_settings(&GameSettings::default());
        assert!((params.step_distance - 1.0).abs() < 1e-6);
        assert!((params.arrival_threshold - 4.0).abs() < 1e-6);
    }

    #[test]
    fn speed_is_independent_of_distance() {
        let params = MovementParams {
            step_distance: 2.0,
            arrival_threshold: 0.5,
        };
        let mut short = stream_between(Position::new(0.0, 0.0), Position::new(100.0, 0.0), 0.0);
        let mut long = stream_between(Position::new(0.0, 0.0), Position::new(400.0, 0.0), 0.0);

        let short_ticks = ticks_until_arrival(&mut short, &params);
        let long_ticks = ticks_until_arrival(&mut long, &params);

        assert!((49..=50).contains(&short_ticks), "short took {short_ticks}");
        assert!((199..=200).contains(&long_ticks), "long took {long_ticks}");
    }

    #[test]
    fn wave_delay_holds_stream_in_place() {
        let params = MovementParams {
            step_distance: 1.0,
            arrival_threshold: 0.5,
        };
        let mut stream = stream_between(Position::new(0.0, 0.0), Position::new(50.0, 0.0), 0.5);

        for _ in 0..5 {
            assert_eq!(advance(&mut stream, &params), Advance::Waiting);
            assert_eq!(stream.travelled(), 0.0);
        }
        assert_eq!(stream.progress, 0.5);
        assert_eq!(advance(&mut stream, &params), Advance::Moving);
        assert!(stream.travelled() > 0.0);
    }

    #[test]
    fn arrival_pins_progress_to_end() {
        let params = MovementParams {
            step_distance: 10.0,
            arrival_threshold: 4.0,
        };
        let mut stream = stream_between(Position::new(0.0, 0.0), Position::new(12.0, 0.0), 0.0);

        assert_eq!(advance(&mut stream, &params), Advance::Arrived);
        assert_eq!(stream.travelled(), 1.0);
    }
}
