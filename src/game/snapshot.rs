//! Snapshot building for network transmission

use std::collections::BTreeMap;

use crate::ws::protocol::{GameSnapshot, NodeView, ServerMsg, StreamView};

use super::entity::{Node, Owner, UnitStream};

/// Builds full-state `update_game` messages. Clients rebuild their view
/// from each snapshot, so every message carries the complete board.
pub struct SnapshotBuilder {
    player_images: BTreeMap<String, String>,
}

impl SnapshotBuilder {
    pub fn new(player_images: BTreeMap<String, String>) -> Self {
        Self { player_images }
    }

    /// Build a snapshot message
    pub fn build(&self, nodes: &[Node], streams: &[UnitStream]) -> ServerMsg {
        ServerMsg::UpdateGame(GameSnapshot {
            circles: nodes.iter().map(node_view).collect(),
            moving_dots: streams.iter().map(stream_view).collect(),
            player_images: self.player_images.clone(),
        })
    }
}

fn node_view(node: &Node) -> NodeView {
    let (is_player, player, color, player_id) = match &node.owner {
        Owner::Unowned => (false, None, None, None),
        Owner::Player(tag) => (
            true,
            Some(tag.display_name.clone()),
            Some(tag.color.clone()),
            Some(tag.player_id.clone()),
        ),
    };

    NodeView {
        id: node.id.clone(),
        x: node.position.x,
        y: node.position.y,
        units: node.unit_count,
        is_player,
        player,
        color,
        player_id,
    }
}

fn stream_view(stream: &UnitStream) -> StreamView {
    let position = stream.position();
    StreamView {
        source_id: stream.source_node_id.clone(),
        target_id: stream.target_node_id.clone(),
        progress: stream.progress,
        wave_progress: stream.wave_delay,
        units: stream.unit_value,
        offset_x: stream.offset.x,
        offset_y: stream.offset.y,
        x: position.x,
        y: position.y,
        player_id: stream.owner.player_id.clone(),
        color: stream.owner.color.clone(),
        player: stream.owner.display_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::{PlayerTag, Position};

    #[test]
    fn unowned_nodes_have_no_owner_fields() {
        let builder = SnapshotBuilder::new(BTreeMap::new());
        let ServerMsg::UpdateGame(snapshot) =
            builder.build(&[Node::neutral("n0", Position::new(5.0, 6.0), 3)], &[])
        else {
            panic!("expected update_game");
        };

        let view = &snapshot.circles[0];
        assert_eq!(view.id, "n0");
        assert_eq!((view.x, view.y, view.units), (5.0, 6.0, 3));
        assert!(!view.is_player);
        assert_eq!(view.player_id, None);
        assert_eq!(view.color, None);
    }

    #[test]
    fn owned_nodes_carry_owner_identity() {
        let tag = PlayerTag {
            player_id: "a".into(),
            display_name: "Ada".into(),
            color: "#123456".into(),
        };
        let mut images = BTreeMap::new();
        images.insert("a".to_string(), "/assets/player1Circle.png".to_string());
        let builder = SnapshotBuilder::new(images.clone());

        let ServerMsg::UpdateGame(snapshot) =
            builder.build(&[Node::owned("p1", Position::default(), 10, tag)], &[])
        else {
            panic!("expected update_game");
        };

        let view = &snapshot.circles[0];
        assert!(view.is_player);
        assert_eq!(view.player.as_deref(), Some("Ada"));
        assert_eq!(view.color.as_deref(), Some("#123456"));
        assert_eq!(view.player_id.as_deref(), Some("a"));
        assert_eq!(snapshot.player_images, images);
    }
}
