//! Node placement by rejection sampling

use rand::Rng;

use crate::config::GameSettings;

use super::entity::Position;
use super::error::PlacementError;

/// Sampling attempts per node before the playfield is considered full
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;

/// Uniform point at which a whole node fits inside the playfield
pub fn random_position<R: Rng + ?Sized>(rng: &mut R, settings: &GameSettings) -> Position {
    let r = settings.node_radius;
    Position::new(
        rng.gen_range(r..=settings.playfield_width - r),
        rng.gen_range(r..=settings.playfield_height - r),
    )
}

/// True when `candidate` is at least `min_distance` from every placed center
pub fn is_clear(candidate: Position, placed: &[Position], min_distance: f32) -> bool {
    placed
        .iter()
        .all(|p| p.distance_to(candidate) >= min_distance)
}

/// Draw positions until one clears all `placed` nodes by a node diameter
pub fn place_node<R: Rng + ?Sized>(
    rng: &mut R,
    placed: &[Position],
    settings: &GameSettings,
) -> Result<Position, PlacementError> {
    let min_distance = settings.node_diameter();

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let candidate = random_position(rng, settings);
        if is_clear(candidate, placed, min_distance) {
            return Ok(candidate);
        }
    }

    Err(PlacementError::PlayfieldFull {
        placed: placed.len(),
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

/// Place `count` nodes, appending each accepted position to `placed`
pub fn place_many<R: Rng + ?Sized>(
    rng: &mut R,
    placed: &mut Vec<Position>,
    count: usize,
    settings: &GameSettings,
) -> Result<(), PlacementError> {
    for _ in 0..count {
        let position = place_node(rng, placed, settings)?;
        placed.push(position);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn placed_nodes_never_overlap() {
        let settings = GameSettings::default();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut placed = Vec::new();
            place_many(&mut rng, &mut placed, 9, &settings).unwrap();

            for (i, a) in placed.iter().enumerate() {
                let r = settings.node_radius;
                assert!(a.x >= r && a.x <= settings.playfield_width - r);
                assert!(a.y >= r && a.y <= settings.playfield_height - r);
                for b in &placed[i + 1..] {
                    assert!(a.distance_to(*b) >= settings.node_diameter());
                }
            }
        }
    }

    #[test]
    fn crowded_playfield_fails_instead_of_spinning() {
        // room for exactly one node
        let settings = GameSettings {
            playfield_width: 80.0,
            playfield_height: 80.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut placed = Vec::new();

        let err = place_many(&mut rng, &mut placed, 2, &settings).unwrap_err();
        assert_eq!(
            err,
            PlacementError::PlayfieldFull {
                placed: 1,
                attempts: MAX_PLACEMENT_ATTEMPTS,
            }
        );
    }
}
