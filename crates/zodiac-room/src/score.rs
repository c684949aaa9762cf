//! Scoring rules. Pure functions from an action to a score change.

use std::collections::HashMap;

use zodiac_protocol::{GameConfig, Tile};

/// A correct continuous pick.
pub const CORRECT_PICK: i64 = 1;

/// Submitting a whole turn scores one point per target.
pub fn submit_win(targets: &[Tile]) -> i64 {
    targets.len() as i64
}

/// Score after a wrong pick: minus `wrong_penalty`, clamped at zero when
/// `score_floor` is set.
pub fn after_wrong_pick(score: i64, config: &GameConfig) -> i64 {
    let lowered = score - i64::from(config.wrong_penalty);
    if config.score_floor {
        lowered.max(0)
    } else {
        lowered
    }
}

/// Reveal delta for one ballot: for every distinct species selected,
/// `+n` where `n` is how many targets share that species, or `-1` if
/// none do.
pub fn reveal<'a>(selected: impl IntoIterator<Item = &'a Tile>, targets: &[Tile]) -> i64 {
    let mut per_species: HashMap<u8, i64> = HashMap::new();
    for target in targets {
        *per_species.entry(target.species_id()).or_default() += 1;
    }

    let mut seen = Vec::new();
    let mut delta = 0;
    for tile in selected {
        let species = tile.species_id();
        if seen.contains(&species) {
            continue;
        }
        seen.push(species);
        delta += per_species.get(&species).copied().unwrap_or(-1);
    }
    delta
}
