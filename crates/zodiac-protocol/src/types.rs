//! Core protocol types: identities, catalog records, tiles and the
//! player snapshots that are broadcast to clients.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Connection-scoped identity of a player.
///
/// Every accepted connection gets a fresh id, so the same person has a
/// different `PlayerId` after a reconnect. The stable identity across
/// reconnects is the username (see the room's identity reconciliation).
///
/// `#[serde(transparent)]` keeps this a plain number on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Client-chosen room name. Rooms are created on first join, so any
/// non-blank string is a valid room id.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for an empty or whitespace-only id.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque per-round token identifying one tile on the grid.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive a server event.
///
/// Room handlers return `(Recipient, ServerEvent)` pairs; the room actor
/// resolves them against the connections it currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every active player in the room.
    All,
    /// One specific connection.
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Catalog records and tiles
// ---------------------------------------------------------------------------

/// One entry of the species catalog.
///
/// `Cow<'static, str>` lets the compiled-in catalog borrow string literals
/// while decoded copies own their text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species {
    pub id: u8,
    pub name: Cow<'static, str>,
    pub display: Cow<'static, str>,
    pub icon: Cow<'static, str>,
}

/// One cell of a dealt grid: a species plus its per-round instance id.
///
/// On the wire the species fields are flattened next to `instanceId`:
/// `{"id":3,"name":"dần","display":"Cọp","icon":"🐅","instanceId":"k2x9..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(flatten)]
    pub species: Species,
    #[serde(rename = "instanceId")]
    pub instance_id: InstanceId,
}

impl Tile {
    pub fn species_id(&self) -> u8 {
        self.species.id
    }
}

// ---------------------------------------------------------------------------
// Modes and phases
// ---------------------------------------------------------------------------

/// How turns advance in a classic game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TurnMode {
    /// One shared round for everyone, advanced by the server's turn timer.
    #[default]
    Room,
    /// Every player gets their own rounds and advances at their own pace.
    Personal,
}

impl fmt::Display for TurnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room => f.write_str("room"),
            Self::Personal => f.write_str("personal"),
        }
    }
}

/// Lifecycle phase of a room.
///
/// ```text
/// Waiting ──start_game──────────→ Playing ───────────────┐
///    │                                                   ▼
///    └──start_game_suggest──→ Selecting ⇄ Revealed ───→ Ended
/// ```
///
/// `Ended` closes the current game only: timers are gone and
/// turn-advancing events are ignored, but a new `start_game*` may begin
/// another game in the same room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    #[default]
    Waiting,
    Playing,
    Selecting,
    Revealed,
    Ended,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("WAITING"),
            Self::Playing => f.write_str("PLAYING"),
            Self::Selecting => f.write_str("SELECTING"),
            Self::Revealed => f.write_str("REVEALED"),
            Self::Ended => f.write_str("ENDED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Player snapshot
// ---------------------------------------------------------------------------

/// Owned snapshot of a player, as broadcast in `update_players`,
/// `game_over` and `results_revealed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub username: String,
    pub score: i64,
    pub is_active: bool,
    pub turns_completed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiger() -> Species {
        Species {
            id: 3,
            name: Cow::Borrowed("dần"),
            display: Cow::Borrowed("Cọp"),
            icon: Cow::Borrowed("🐅"),
        }
    }

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_id_is_plain_string_and_blank_check() {
        let json = serde_json::to_string(&RoomId::new("phong-1")).unwrap();
        assert_eq!(json, "\"phong-1\"");
        assert!(RoomId::new("  ").is_blank());
        assert!(!RoomId::new("a").is_blank());
    }

    #[test]
    fn test_tile_flattens_species_next_to_instance_id() {
        let tile = Tile {
            species: tiger(),
            instance_id: InstanceId::new("abc123xyz"),
        };
        let json = serde_json::to_value(&tile).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "dần");
        assert_eq!(json["display"], "Cọp");
        assert_eq!(json["icon"], "🐅");
        assert_eq!(json["instanceId"], "abc123xyz");

        let back: Tile = serde_json::from_value(json).unwrap();
        assert_eq!(back, tile);
    }

    #[test]
    fn test_turn_mode_wire_names() {
        assert_eq!(serde_json::to_string(&TurnMode::Room).unwrap(), "\"room\"");
        assert_eq!(
            serde_json::to_string(&TurnMode::Personal).unwrap(),
            "\"personal\""
        );
        assert_eq!(TurnMode::default(), TurnMode::Room);
    }

    #[test]
    fn test_game_phase_wire_names_match_display() {
        for phase in [
            GamePhase::Waiting,
            GamePhase::Playing,
            GamePhase::Selecting,
            GamePhase::Revealed,
            GamePhase::Ended,
        ] {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
    }

    #[test]
    fn test_player_view_uses_camel_case() {
        let view = PlayerView {
            id: PlayerId(1),
            username: "lan".into(),
            score: -2,
            is_active: true,
            turns_completed: 3,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["isActive"], true);
        assert_eq!(json["turnsCompleted"], 3);
        assert_eq!(json["score"], -2);
    }
}
