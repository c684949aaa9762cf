//! Forgiving deserializers for client-supplied configuration.
//!
//! Browser clients send form values as numbers, numeric strings, booleans
//! or `null`. None of these may fail the whole event: a value that cannot
//! be understood becomes `None` and the normalizer substitutes its default.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::TurnMode;

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Num(f64),
    Text(String),
    Other(IgnoredAny),
}

/// A finite number, or a string that parses as one.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Loose::deserialize(deserializer)? {
        Loose::Num(n) => Some(n),
        Loose::Text(s) => s.trim().parse::<f64>().ok(),
        Loose::Bool(_) | Loose::Other(_) => None,
    };
    Ok(value.filter(|n| n.is_finite()))
}

/// `true`/`false`, their string spellings, or a number (non-zero is true).
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => Some(b),
        Loose::Num(n) => Some(n != 0.0),
        Loose::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Loose::Other(_) => None,
    })
}

/// `"room"` or `"personal"`, in any letter case.
pub(crate) fn turn_mode<'de, D>(deserializer: D) -> Result<Option<TurnMode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "room" => Some(TurnMode::Room),
            "personal" => Some(TurnMode::Personal),
            _ => None,
        },
        _ => None,
    })
}
