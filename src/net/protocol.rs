//! JSON wire protocol between the browser client and the server.
//!
//! Client messages are single-key tagged objects (`{"press":"up"}`), so the
//! server can dispatch on the first key. Server frames reproduce the shapes
//! the browser client already handles: `{"id":N}` on attach,
//! `{"update":{...}}` each tick, `{"death":true,"message":...}` on a shrink
//! death. Snapshots carry only public blob fields; pilot internals like
//! input flags, momentum, and account links never cross the wire.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::game::blob::{AccountId, Blob, BlobId, BlobKind, Viewport};
use crate::game::constants::player;
use crate::game::input::{Direction, InputEvent};
use crate::game::world::World;

/// Errors arising from encoding or decoding wire messages
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Messages the client sends us
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Identity handoff after the external login flow completes
    #[serde(rename = "join")]
    Join(JoinInfo),
    #[serde(rename = "press")]
    Press(Direction),
    #[serde(rename = "release")]
    Release(Direction),
    #[serde(rename = "resize")]
    Resize(Viewport),
}

/// Messages we send the client
///
/// Untagged: each variant's field set is the frame shape on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// First message after attach, carrying the client's blob id
    Welcome { id: BlobId },
    Update { update: WorldUpdate },
    Death { death: bool, message: String },
}

/// Optional identity fields supplied by a logged-in client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_score: Option<f32>,
}

/// One tick's personalized snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldUpdate {
    /// Absent once the client's blob has been consumed or removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<BlobView>,
    pub nearby_blobs: Vec<BlobView>,
    pub status: StatusView,
}

/// Public view of one blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobView {
    pub id: BlobId,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    #[serde(rename = "type")]
    pub kind: BlobKind,
    pub color: String,
    pub name: String,
    /// Only player blobs carry this; the client renders a shield ring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_protected: Option<bool>,
}

impl BlobView {
    pub fn pack(blob: &Blob, now: Instant) -> Self {
        Self {
            id: blob.id,
            x: blob.position.x,
            y: blob.position.y,
            r: blob.r,
            kind: blob.kind,
            color: blob.color.clone(),
            name: blob.name.clone(),
            is_protected: blob.pilot.as_ref().map(|_| blob.is_protected(now)),
        }
    }
}

/// World-level status shared by every client's update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub num_players: usize,
    pub top_score: f32,
    pub top_name: String,
    pub top_account: AccountId,
}

impl StatusView {
    /// Build this tick's status from the current largest player blob.
    ///
    /// Autonomous blobs never appear here, and a record holder drops out the
    /// moment they detach or shrink; the persisted all-time stats are a
    /// separate concern. With no qualifying player the block falls back to
    /// radius 1 under the fallback name.
    pub fn from_world(world: &World) -> Self {
        let num_players = world.player_count();
        match world.top_player() {
            Some(top) => Self {
                num_players,
                top_score: top.r,
                top_name: if top.name.is_empty() {
                    player::FALLBACK_NAME.to_string()
                } else {
                    top.name.clone()
                },
                top_account: top.pilot.as_ref().and_then(|p| p.account).unwrap_or(0),
            },
            None => Self {
                num_players,
                top_score: 1.0,
                top_name: player::FALLBACK_NAME.to_string(),
                top_account: 0,
            },
        }
    }
}

impl From<ClientMessage> for InputEvent {
    fn from(message: ClientMessage) -> Self {
        match message {
            ClientMessage::Join(join) => InputEvent::Identify {
                name: join.name,
                account: join.account,
                best_radius: join.top_score,
            },
            ClientMessage::Press(direction) => InputEvent::Press(direction),
            ClientMessage::Release(direction) => InputEvent::Release(direction),
            ClientMessage::Resize(viewport) => InputEvent::Resize(viewport),
        }
    }
}

pub fn encode(message: &ServerMessage) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode(text: &str) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::game::effects::EffectBuffer;
    use crate::util::vec2::Vec2;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_decode_press_release() {
        assert_eq!(
            decode(r#"{"press":"up"}"#).unwrap(),
            ClientMessage::Press(Direction::Up)
        );
        assert_eq!(
            decode(r#"{"release":"left"}"#).unwrap(),
            ClientMessage::Release(Direction::Left)
        );
    }

    #[test]
    fn test_decode_resize_and_join() {
        assert_eq!(
            decode(r#"{"resize":{"width":800.0,"height":600.0}}"#).unwrap(),
            ClientMessage::Resize(Viewport {
                width: 800.0,
                height: 600.0,
            })
        );

        // Every join field is optional
        assert_eq!(
            decode(r#"{"join":{}}"#).unwrap(),
            ClientMessage::Join(JoinInfo {
                name: None,
                account: None,
                top_score: None,
            })
        );
        assert_eq!(
            decode(r#"{"join":{"name":"alice","account":9,"topScore":33.0}}"#).unwrap(),
            ClientMessage::Join(JoinInfo {
                name: Some("alice".to_string()),
                account: Some(9),
                top_score: Some(33.0),
            })
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not json").is_err());
        assert!(decode(r#"{"teleport":{"x":0}}"#).is_err());
        assert!(decode(r#"{"press":"diagonal"}"#).is_err());
    }

    #[test]
    fn test_welcome_and_death_shapes() {
        let welcome = encode(&ServerMessage::Welcome { id: 7 }).unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&welcome).unwrap(),
            json!({"id": 7})
        );

        let death = encode(&ServerMessage::Death {
            death: true,
            message: "You were eaten".to_string(),
        })
        .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&death).unwrap(),
            json!({"death": true, "message": "You were eaten"})
        );
    }

    #[test]
    fn test_blob_view_pack_hides_pilot_internals() {
        let now = Instant::now();
        let blob = Blob::player(
            3,
            Vec2::new(10.0, 20.0),
            "alice".to_string(),
            Some(9),
            0.0,
            Duration::from_millis(5000),
        );

        let view = BlobView::pack(&blob, now);
        assert_eq!(view.is_protected, Some(true));

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["type"], "player");
        assert_eq!(value["isProtected"], true);
        // Pilot internals stay server-side
        assert!(value.get("momentum").is_none());
        assert!(value.get("account").is_none());
        assert!(value.get("input").is_none());
    }

    #[test]
    fn test_autonomous_view_omits_protection() {
        let now = Instant::now();
        let blob = Blob::autonomous(4, BlobKind::Hostile, Vec2::new(1.0, 2.0), 12.0);

        let value = serde_json::to_value(BlobView::pack(&blob, now)).unwrap();
        assert_eq!(value["type"], "baddy");
        assert!(value.get("isProtected").is_none());
    }

    #[test]
    fn test_update_omits_player_after_death() {
        let update = ServerMessage::Update {
            update: WorldUpdate {
                player: None,
                nearby_blobs: vec![],
                status: StatusView {
                    num_players: 2,
                    top_score: 40.0,
                    top_name: "alice".to_string(),
                    top_account: 9,
                },
            },
        };

        let value = serde_json::to_value(&update).unwrap();
        assert!(value["update"].get("player").is_none());
        assert_eq!(value["update"]["status"]["numPlayers"], 2);
        assert_eq!(value["update"]["status"]["topScore"], 40.0);
    }

    #[test]
    fn test_status_reflects_current_players_only() {
        let effects = EffectBuffer::default();
        let mut world = World::new(WorldConfig::default(), effects.sender());

        let empty = StatusView::from_world(&world);
        assert_eq!(empty.num_players, 0);
        assert_eq!(empty.top_score, 1.0);
        assert_eq!(empty.top_name, "Bob Jenkins");
        assert_eq!(empty.top_account, 0);

        let id = world.spawn_player(Some("alice".to_string()), Some(9), None);
        world.blob_mut(id).unwrap().r = 44.0;
        let status = StatusView::from_world(&world);
        assert_eq!(status.num_players, 1);
        assert_eq!(status.top_score, 44.0);
        assert_eq!(status.top_name, "alice");
        assert_eq!(status.top_account, 9);

        // The record does not outlive its owner
        world.remove_blob(id);
        assert_eq!(StatusView::from_world(&world).top_score, 1.0);
    }

    #[test]
    fn test_client_message_to_input_event() {
        let event: InputEvent = ClientMessage::Press(Direction::Down).into();
        assert!(matches!(event, InputEvent::Press(Direction::Down)));

        let event: InputEvent = ClientMessage::Join(JoinInfo {
            name: Some("bob".to_string()),
            account: Some(5),
            top_score: Some(12.0),
        })
        .into();
        match event {
            InputEvent::Identify {
                name,
                account,
                best_radius,
            } => {
                assert_eq!(name.as_deref(), Some("bob"));
                assert_eq!(account, Some(5));
                assert_eq!(best_radius, Some(12.0));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
