//! Win evaluation

use super::entity::{Node, PlayerTag, UnitStream};

/// How a match ended on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Index into the match's player slots
    Winner(usize),
    /// Both players were eliminated in the same evaluation
    Draw,
}

/// Nodes plus in-flight streams owned by `player_id`
pub fn presence(player_id: &str, nodes: &[Node], streams: &[UnitStream]) -> usize {
    let owned_nodes = nodes.iter().filter(|n| n.owner.is_player(player_id)).count();
    let owned_streams = streams
        .iter()
        .filter(|s| s.owner.player_id == player_id)
        .count();
    owned_nodes + owned_streams
}

/// Decide whether the match is over.
///
/// A player with no nodes and no streams is eliminated. Returns `None`
/// while both players are still present.
pub fn evaluate(
    players: &[PlayerTag; 2],
    nodes: &[Node],
    streams: &[UnitStream],
) -> Option<MatchOutcome> {
    let alive: Vec<usize> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| presence(&p.player_id, nodes, streams) > 0)
        .map(|(slot, _)| slot)
        .collect();

    match alive.as_slice() {
        [] => Some(MatchOutcome::Draw),
        [slot] => Some(MatchOutcome::Winner(*slot)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::Position;

    fn tag(id: &str) -> PlayerTag {
        PlayerTag {
            player_id: id.to_string(),
            display_name: id.to_uppercase(),
            color: "#000".to_string(),
        }
    }

    fn stream_of(owner: &str) -> UnitStream {
        UnitStream {
            source_node_id: "p1".into(),
            target_node_id: "n0".into(),
            owner: tag(owner),
            unit_value: 1,
            progress: 0.0,
            wave_delay: 0.0,
            origin: Position::default(),
            destination: Position::new(50.0, 0.0),
            offset: Position::default(),
        }
    }

    #[test]
    fn both_present_is_ongoing() {
        let players = [tag("a"), tag("b")];
        let nodes = vec![
            Node::owned("p1", Position::default(), 1, tag("a")),
            Node::owned("p2", Position::default(), 1, tag("b")),
        ];
        assert_eq!(evaluate(&players, &nodes, &[]), None);
    }

    #[test]
    fn in_flight_streams_keep_a_player_alive() {
        let players = [tag("a"), tag("b")];
        let nodes = vec![
            Node::owned("p1", Position::default(), 0, tag("b")),
            Node::owned("p2", Position::default(), 3, tag("b")),
        ];
        assert_eq!(evaluate(&players, &nodes, &[stream_of("a")]), None);
    }

    #[test]
    fn last_player_standing_wins() {
        let players = [tag("a"), tag("b")];
        let nodes = vec![
            Node::owned("p1", Position::default(), 4, tag("b")),
            Node::neutral("n0", Position::default(), 2),
        ];
        assert_eq!(
            evaluate(&players, &nodes, &[stream_of("b")]),
            Some(MatchOutcome::Winner(1))
        );
    }

    #[test]
    fn nobody_left_is_a_draw() {
        let players = [tag("a"), tag("b")];
        let nodes = vec![Node::neutral("n0", Position::default(), 2)];
        assert_eq!(evaluate(&players, &nodes, &[]), Some(MatchOutcome::Draw));
    }
}
