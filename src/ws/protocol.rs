//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Frames are JSON objects shaped like the browser client's socket events:
//! `{"event": "<name>", "data": {...}}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-assigned identity of one connected socket
pub type SessionId = Uuid;

/// Identifier of a running match
pub type MatchId = Uuid;

/// Player identity as supplied by the client with `find_game`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    /// Stable, client-generated player id
    pub id: String,
    #[serde(alias = "name", default = "default_display_name")]
    pub display_name: String,
    /// CSS color; a slot color is assigned when absent
    #[serde(default)]
    pub color: Option<String>,
    /// Cosmetic node image chosen by the player
    #[serde(default)]
    pub selected_image: Option<String>,
}

fn default_display_name() -> String {
    "Player".to_string()
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Enter the matchmaking queue
    FindGame(PlayerProfile),

    /// In-match command
    PlayerAction(PlayerAction),
}

/// Commands a player can issue during a match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    Attack(AttackOrder),
}

/// Send `units` from `source` towards `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOrder {
    pub player_id: String,
    pub source: String,
    pub target: String,
    /// Signed so that negative requests reach validation instead of failing to parse
    pub units: i64,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Matchmaking paired this session
    #[serde(rename_all = "camelCase")]
    MatchFound {
        match_id: MatchId,
        /// 1 or 2
        player_slot: u8,
    },

    /// Full state snapshot, sent after every tick
    UpdateGame(GameSnapshot),

    /// Terminal message of a match. `winner` is a display name, `None` on a draw.
    GameOver { winner: Option<String> },

    /// Error message
    Error { code: String, message: String },
}

impl ServerMsg {
    /// Snapshots are superseded by the next one, so a lagging session may skip them
    pub fn is_snapshot(&self) -> bool {
        matches!(self, ServerMsg::UpdateGame(_))
    }
}

/// Complete match state as seen by clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub circles: Vec<NodeView>,
    pub moving_dots: Vec<StreamView>,
    /// playerId -> selected image path
    #[serde(default)]
    pub player_images: BTreeMap<String, String>,
}

/// A node in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub units: u32,
    pub is_player: bool,
    /// Owner display name
    pub player: Option<String>,
    pub color: Option<String>,
    pub player_id: Option<String>,
}

/// An in-flight unit stream in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamView {
    pub source_id: String,
    pub target_id: String,
    pub progress: f32,
    pub wave_progress: f32,
    pub units: u32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Current authoritative position
    pub x: f32,
    pub y: f32,
    pub player_id: String,
    pub color: String,
    /// Owner display name
    pub player: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn find_game_accepts_legacy_name_field() {
        let raw = r##"{"event":"find_game","data":{"id":"player_abc","name":"Ada","color":"#fff"}}"##;
        let msg = assert_ok!(serde_json::from_str::<ClientMsg>(raw));
        match msg {
            ClientMsg::FindGame(profile) => {
                assert_eq!(profile.id, "player_abc");
                assert_eq!(profile.display_name, "Ada");
                assert_eq!(profile.color.as_deref(), Some("#fff"));
                assert_eq!(profile.selected_image, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn find_game_without_name_gets_default() {
        let raw = r#"{"event":"find_game","data":{"id":"p"}}"#;
        let msg = assert_ok!(serde_json::from_str::<ClientMsg>(raw));
        let ClientMsg::FindGame(profile) = msg else {
            panic!("expected find_game");
        };
        assert_eq!(profile.display_name, "Player");
    }

    #[test]
    fn player_action_parses_attack() {
        let raw = r#"{"event":"player_action","data":{"type":"attack","playerId":"a","source":"p1","target":"n3","units":8}}"#;
        let msg = assert_ok!(serde_json::from_str::<ClientMsg>(raw));
        let ClientMsg::PlayerAction(PlayerAction::Attack(order)) = msg else {
            panic!("expected attack");
        };
        assert_eq!(
            order,
            AttackOrder {
                player_id: "a".into(),
                source: "p1".into(),
                target: "n3".into(),
                units: 8,
            }
        );
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let raw = r#"{"event":"player_action","data":{"type":"teleport","playerId":"a"}}"#;
        assert!(serde_json::from_str::<ClientMsg>(raw).is_err());
    }

    #[test]
    fn match_found_uses_camel_case() {
        let id = Uuid::nil();
        let json = serde_json::to_value(ServerMsg::MatchFound {
            match_id: id,
            player_slot: 2,
        })
        .unwrap();
        assert_eq!(json["event"], "match_found");
        assert_eq!(json["data"]["matchId"], id.to_string());
        assert_eq!(json["data"]["playerSlot"], 2);
    }

    #[test]
    fn draw_serializes_null_winner() {
        let json = serde_json::to_value(ServerMsg::GameOver { winner: None }).unwrap();
        assert_eq!(json["event"], "game_over");
        assert!(json["data"]["winner"].is_null());
    }

    #[test]
    fn snapshot_field_names_match_client() {
        let json = serde_json::to_value(ServerMsg::UpdateGame(GameSnapshot::default())).unwrap();
        assert!(json["data"]["circles"].is_array());
        assert!(json["data"]["movingDots"].is_array());
        assert!(json["data"]["playerImages"].is_object());
    }
}
