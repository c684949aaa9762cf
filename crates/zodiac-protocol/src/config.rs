//! Game configuration: the loose form clients send and the normalized
//! form a room runs with.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{TurnMode, lenient};

/// Size of the compiled-in species catalog; the pool can never exceed it.
pub const CATALOG_SIZE: usize = 12;

/// Largest grid a round may deal.
pub const MAX_GRID_SIZE: usize = 24;

/// Configuration exactly as a client sent it.
///
/// Every field is optional and tolerant of strings, `null` and garbage;
/// [`GameConfig::from_raw`] turns it into something a room can run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawConfig {
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub max_game_time: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub time_per_turn: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub target_count: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub pool_size: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(deserialize_with = "lenient::turn_mode", skip_serializing_if = "Option::is_none")]
    pub turn_mode: Option<TurnMode>,
    #[serde(deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub use_voice: Option<bool>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub wrong_penalty: Option<f64>,
    #[serde(deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub score_floor: Option<bool>,
}

/// Normalized room configuration.
///
/// Built only through [`GameConfig::from_raw`] (or `Default`), so the
/// invariants below always hold:
///
/// - `2 <= pool_size <= 12`
/// - `1 <= target_count` and `target_count * 2 <= pool_size`
/// - `target_count * 2 <= grid_size <= 24`
///
/// Times are in seconds, as the client configured them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub max_turns: u32,
    pub max_game_time: u32,
    pub time_per_turn: f64,
    pub target_count: usize,
    pub pool_size: usize,
    pub grid_size: usize,
    pub turn_mode: TurnMode,
    pub use_voice: bool,
    pub wrong_penalty: u32,
    pub score_floor: bool,
    /// Username of the player who started the current game.
    pub boss: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_turns: 5,
            max_game_time: 120,
            time_per_turn: 2.0,
            target_count: 1,
            pool_size: 6,
            grid_size: 6,
            turn_mode: TurnMode::Room,
            use_voice: false,
            wrong_penalty: 1,
            score_floor: false,
            boss: None,
        }
    }
}

impl GameConfig {
    /// Applies defaults, lower/upper bounds and the cross-field invariants.
    pub fn from_raw(raw: &RawConfig) -> Self {
        let defaults = Self::default();
        let config = Self {
            max_turns: whole(raw.max_turns, defaults.max_turns, 1, u32::MAX),
            max_game_time: whole(raw.max_game_time, defaults.max_game_time, 1, 86_400),
            time_per_turn: raw
                .time_per_turn
                .unwrap_or(defaults.time_per_turn)
                .clamp(0.5, 3_600.0),
            target_count: whole(raw.target_count, defaults.target_count as u32, 1, u32::MAX)
                as usize,
            pool_size: whole(raw.pool_size, defaults.pool_size as u32, 2, CATALOG_SIZE as u32)
                as usize,
            grid_size: whole(raw.grid_size, defaults.grid_size as u32, 1, MAX_GRID_SIZE as u32)
                as usize,
            turn_mode: raw.turn_mode.unwrap_or(defaults.turn_mode),
            use_voice: raw.use_voice.unwrap_or(defaults.use_voice),
            wrong_penalty: whole(raw.wrong_penalty, defaults.wrong_penalty, 0, u32::MAX),
            score_floor: raw.score_floor.unwrap_or(defaults.score_floor),
            boss: None,
        };
        config.normalized()
    }

    /// Enforces the cross-field invariants. Applying it twice is a no-op.
    pub fn normalized(mut self) -> Self {
        self.pool_size = self.pool_size.clamp(2, CATALOG_SIZE);
        self.target_count = self.target_count.max(1);
        if self.target_count * 2 > self.pool_size {
            self.target_count = self.pool_size / 2;
        }
        self.grid_size = self
            .grid_size
            .max(self.target_count * 2)
            .clamp(1, MAX_GRID_SIZE);
        self
    }

    /// Stamps the username of the player who started the game.
    pub fn with_boss(mut self, username: impl Into<String>) -> Self {
        self.boss = Some(username.into());
        self
    }

    pub fn is_boss(&self, username: &str) -> bool {
        self.boss.as_deref() == Some(username)
    }

    /// Interval of the room-mode turn timer.
    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs_f64(self.time_per_turn)
    }

    /// Length of a whole classic game.
    pub fn game_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.max_game_time))
    }

    /// Turn length in milliseconds, as carried by turn events.
    pub fn time_per_turn_ms(&self) -> u64 {
        (self.time_per_turn * 1000.0).round() as u64
    }
}

impl From<&GameConfig> for RawConfig {
    fn from(config: &GameConfig) -> Self {
        Self {
            max_turns: Some(f64::from(config.max_turns)),
            max_game_time: Some(f64::from(config.max_game_time)),
            time_per_turn: Some(config.time_per_turn),
            target_count: Some(config.target_count as f64),
            pool_size: Some(config.pool_size as f64),
            grid_size: Some(config.grid_size as f64),
            turn_mode: Some(config.turn_mode),
            use_voice: Some(config.use_voice),
            wrong_penalty: Some(f64::from(config.wrong_penalty)),
            score_floor: Some(config.score_floor),
        }
    }
}

/// Floors a loose number into `min..=max`, falling back to `default`.
fn whole(value: Option<f64>, default: u32, min: u32, max: u32) -> u32 {
    match value {
        // `as` saturates, so huge or negative values land on the bounds.
        Some(v) => (v.floor() as u32).clamp(min, max),
        None => default.clamp(min, max),
    }
}
