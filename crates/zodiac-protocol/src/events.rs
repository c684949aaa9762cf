//! Inbound and outbound event records.
//!
//! Both directions use the same envelope, an adjacently tagged record:
//!
//! ```text
//! {"event": "select_animal", "data": {"roomID": "lobby", "instanceId": "k2x9..."}}
//! ```
//!
//! Anything that does not fit one of the records below (unknown event
//! name, missing `data`, missing required field) is rejected by the codec.

use serde::{Deserialize, Serialize};

use crate::{
    GameConfig, InstanceId, PlayerId, PlayerView, ProtocolError, RawConfig, RoomId,
    Tile,
};

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Payload of `join_room`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoom {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    pub username: String,
    /// Adopted only if the room has no configuration yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RawConfig>,
}

/// Payload of the events that carry a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRequest {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<RawConfig>,
}

/// Payload of the events that only name a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRef {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
}

/// Payload of the events that name one tile of the current grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRef {
    #[serde(rename = "roomID")]
    pub room_id: RoomId,
    #[serde(rename = "instanceId")]
    pub instance_id: InstanceId,
}

/// Events a client may send.
///
/// Disconnect is not an event: it is implied by the connection closing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(JoinRoom),
    ChangeConfig(ConfigRequest),
    StartGame(ConfigRequest),
    StartGameSuggest(ConfigRequest),
    RequestNextTurnTimeout(RoomRef),
    SubmitWin(RoomRef),
    SubmitWrong(RoomRef),
    SelectAnimal(TileRef),
    ToggleSelection(TileRef),
    HostConfirmReveal(RoomRef),
    NewTurnSuggest(RoomRef),
    ForceEndGame(RoomRef),
    Stt(RoomRef),
}

impl ClientEvent {
    /// The room this event is addressed to.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::JoinRoom(join) => &join.room_id,
            Self::ChangeConfig(req) | Self::StartGame(req) | Self::StartGameSuggest(req) => {
                &req.room_id
            }
            Self::SelectAnimal(tile) | Self::ToggleSelection(tile) => &tile.room_id,
            Self::RequestNextTurnTimeout(r)
            | Self::SubmitWin(r)
            | Self::SubmitWrong(r)
            | Self::HostConfirmReveal(r)
            | Self::NewTurnSuggest(r)
            | Self::ForceEndGame(r)
            | Self::Stt(r) => &r.room_id,
        }
    }

    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => "join_room",
            Self::ChangeConfig(_) => "change_config",
            Self::StartGame(_) => "start_game",
            Self::StartGameSuggest(_) => "start_game_suggest",
            Self::RequestNextTurnTimeout(_) => "request_next_turn_timeout",
            Self::SubmitWin(_) => "submit_win",
            Self::SubmitWrong(_) => "submit_wrong",
            Self::SelectAnimal(_) => "select_animal",
            Self::ToggleSelection(_) => "toggle_selection",
            Self::HostConfirmReveal(_) => "host_confirm_reveal",
            Self::NewTurnSuggest(_) => "new_turn_suggest",
            Self::ForceEndGame(_) => "force_end_game",
            Self::Stt(_) => "stt",
        }
    }

    /// Rejects events that decoded but carry a blank `roomID` or
    /// `username`.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidMessage` naming the offending field.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.room_id().is_blank() {
            return Err(ProtocolError::InvalidMessage(format!(
                "{}: roomID is empty",
                self.name()
            )));
        }
        match self {
            Self::JoinRoom(join) if join.username.trim().is_empty() => Err(
                ProtocolError::InvalidMessage("join_room: username is empty".into()),
            ),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A dealt round, as carried by `new_turn` and `personal_new_turn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnData {
    pub animals: Vec<Tile>,
    pub target: Vec<Tile>,
    pub turn_count: u32,
    /// Milliseconds.
    pub time_per_turn: u64,
    pub max_turns: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: PlayerId,
    pub username: String,
    pub score: i64,
}

/// One player's selections, as shown by `results_revealed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub player_id: PlayerId,
    pub username: String,
    pub selections: Vec<InstanceId>,
}

/// Events the server emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    UpdatePlayers(Vec<PlayerView>),
    UpdateConfig(GameConfig),
    NewTurn(TurnData),
    PersonalNewTurn(TurnData),
    PersonalGameFinished {
        score: i64,
        turns_completed: u32,
    },
    GameOver(Vec<PlayerView>),
    UpdateScores(Vec<ScoreEntry>),
    WrongAnswer {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        instance_id: Option<InstanceId>,
        score: i64,
    },
    YourSelectionsUpdated {
        selections: Vec<InstanceId>,
    },
    ResultsRevealed {
        targets: Vec<Tile>,
        ballots: Vec<Ballot>,
        players: Vec<PlayerView>,
    },
    NewTurnSuggestData {
        animals: Vec<Tile>,
        turn_count: u32,
        max_turns: u32,
    },
}

impl ServerEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdatePlayers(_) => "update_players",
            Self::UpdateConfig(_) => "update_config",
            Self::NewTurn(_) => "new_turn",
            Self::PersonalNewTurn(_) => "personal_new_turn",
            Self::PersonalGameFinished { .. } => "personal_game_finished",
            Self::GameOver(_) => "game_over",
            Self::UpdateScores(_) => "update_scores",
            Self::WrongAnswer { .. } => "wrong_answer",
            Self::YourSelectionsUpdated { .. } => "your_selections_updated",
            Self::ResultsRevealed { .. } => "results_revealed",
            Self::NewTurnSuggestData { .. } => "new_turn_suggest_data",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::TurnMode;

    fn decode(value: serde_json::Value) -> Result<ClientEvent, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_join_room_decodes_client_field_names() {
        let event = decode(json!({
            "event": "join_room",
            "data": {"roomID": "lobby", "username": "lan", "config": {"maxTurns": "3"}}
        }))
        .unwrap();

        let ClientEvent::JoinRoom(join) = &event else {
            panic!("expected join_room, got {event:?}");
        };
        assert_eq!(join.room_id, RoomId::new("lobby"));
        assert_eq!(join.username, "lan");
        assert_eq!(join.config.as_ref().unwrap().max_turns, Some(3.0));
        assert_eq!(event.name(), "join_room");
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_null_config_is_accepted() {
        let event = decode(json!({
            "event": "start_game",
            "data": {"roomID": "lobby", "config": null}
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::StartGame(ConfigRequest {
                room_id: RoomId::new("lobby"),
                config: None,
            })
        );
    }

    #[test]
    fn test_tile_events_carry_instance_id() {
        let event = decode(json!({
            "event": "toggle_selection",
            "data": {"roomID": "r", "instanceId": "abc"}
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::ToggleSelection(TileRef {
                room_id: RoomId::new("r"),
                instance_id: InstanceId::new("abc"),
            })
        );
    }

    #[test]
    fn test_every_room_only_event_name_decodes() {
        for name in [
            "request_next_turn_timeout",
            "submit_win",
            "submit_wrong",
            "host_confirm_reveal",
            "new_turn_suggest",
            "force_end_game",
            "stt",
        ] {
            let event = decode(json!({"event": name, "data": {"roomID": "r"}}))
                .unwrap_or_else(|e| panic!("{name} failed: {e}"));
            assert_eq!(event.name(), name);
            assert_eq!(event.room_id().as_str(), "r");
        }
    }

    #[test]
    fn test_unknown_or_incomplete_events_are_rejected() {
        assert!(decode(json!({"event": "hack_scores", "data": {"roomID": "r"}})).is_err());
        assert!(decode(json!({"event": "submit_win"})).is_err());
        assert!(decode(json!({"event": "submit_win", "data": {}})).is_err());
        assert!(decode(json!({"event": "join_room", "data": {"roomID": "r"}})).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let blank_room = ClientEvent::SubmitWin(RoomRef {
            room_id: RoomId::new(""),
        });
        assert!(matches!(
            blank_room.validate(),
            Err(ProtocolError::InvalidMessage(_))
        ));

        let blank_name = ClientEvent::JoinRoom(JoinRoom {
            room_id: RoomId::new("r"),
            username: "   ".into(),
            config: None,
        });
        assert!(blank_name.validate().is_err());
    }

    #[test]
    fn test_server_event_envelopes() {
        let event = ServerEvent::PersonalGameFinished {
            score: 4,
            turns_completed: 2,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"event": "personal_game_finished", "data": {"score": 4, "turnsCompleted": 2}})
        );

        let value = serde_json::to_value(ServerEvent::UpdatePlayers(vec![])).unwrap();
        assert_eq!(value, json!({"event": "update_players", "data": []}));
    }

    #[test]
    fn test_turn_data_fields() {
        let event = ServerEvent::NewTurn(TurnData {
            animals: vec![],
            target: vec![],
            turn_count: 2,
            time_per_turn: 1500,
            max_turns: 3,
        });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "new_turn");
        assert_eq!(value["data"]["turnCount"], 2);
        assert_eq!(value["data"]["timePerTurn"], 1500);
        assert_eq!(value["data"]["maxTurns"], 3);
    }

    #[test]
    fn test_wrong_answer_and_config_shapes() {
        let value = serde_json::to_value(ServerEvent::WrongAnswer {
            instance_id: Some(InstanceId::new("x1")),
            score: -1,
        })
        .unwrap();
        assert_eq!(value["data"]["instanceId"], "x1");
        assert_eq!(value["data"]["score"], -1);

        let config = GameConfig {
            turn_mode: TurnMode::Personal,
            ..GameConfig::default()
        };
        let value = serde_json::to_value(ServerEvent::UpdateConfig(config)).unwrap();
        assert_eq!(value["event"], "update_config");
        assert_eq!(value["data"]["turnMode"], "personal");
    }

    #[test]
    fn test_results_revealed_ballot_shape() {
        let value = serde_json::to_value(ServerEvent::ResultsRevealed {
            targets: vec![],
            ballots: vec![Ballot {
                player_id: PlayerId(9),
                username: "lan".into(),
                selections: vec![InstanceId::new("a")],
            }],
            players: vec![],
        })
        .unwrap();
        assert_eq!(value["data"]["ballots"][0]["playerId"], 9);
        assert_eq!(value["data"]["ballots"][0]["selections"][0], "a");
    }
}
