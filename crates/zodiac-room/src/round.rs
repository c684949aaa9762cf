//! Round generation: the grid of tiles and the target subset.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use zodiac_protocol::{GameConfig, InstanceId, Species, Tile, TurnData};

const INSTANCE_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One dealt round: the shuffled grid and the tiles to find.
///
/// Suggestion-mode rounds have an empty `target` until the reveal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Round {
    pub animals: Vec<Tile>,
    pub target: Vec<Tile>,
}

impl Round {
    /// Looks a tile up on the grid by instance id.
    pub fn tile(&self, instance_id: &InstanceId) -> Option<&Tile> {
        self.animals.iter().find(|t| &t.instance_id == instance_id)
    }

    /// `true` if tiles of this species count as correct picks.
    pub fn is_target_species(&self, species_id: u8) -> bool {
        self.target.iter().any(|t| t.species_id() == species_id)
    }

    /// Owned copy for a `new_turn`/`personal_new_turn` event.
    pub fn turn_data(&self, turn_count: u32, config: &GameConfig) -> TurnData {
        TurnData {
            animals: self.animals.clone(),
            target: self.target.clone(),
            turn_count,
            time_per_turn: config.time_per_turn_ms(),
            max_turns: config.max_turns,
        }
    }
}

/// Deals a full round: grid plus `min(target_count, distinct species on
/// grid)` targets, one tile per target species.
pub fn generate_round<R: Rng + ?Sized>(
    config: &GameConfig,
    catalog: &[Species],
    rng: &mut R,
) -> Round {
    let animals = generate_grid(config, catalog, rng);

    let mut present: Vec<u8> = Vec::new();
    for tile in &animals {
        if !present.contains(&tile.species_id()) {
            present.push(tile.species_id());
        }
    }
    present.shuffle(rng);
    present.truncate(config.target_count);

    let target = present
        .iter()
        .filter_map(|id| animals.iter().find(|t| t.species_id() == *id))
        .cloned()
        .collect();

    Round { animals, target }
}

/// Deals a grid only: `pool_size` distinct species drawn without
/// replacement, repeated round-robin up to `grid_size`, then shuffled.
pub fn generate_grid<R: Rng + ?Sized>(
    config: &GameConfig,
    catalog: &[Species],
    rng: &mut R,
) -> Vec<Tile> {
    let mut pool = catalog.to_vec();
    pool.shuffle(rng);
    pool.truncate(config.pool_size);
    if pool.is_empty() {
        return Vec::new();
    }

    let mut taken = HashSet::with_capacity(config.grid_size);
    let mut grid: Vec<Tile> = (0..config.grid_size)
        .map(|i| Tile {
            species: pool[i % pool.len()].clone(),
            instance_id: fresh_instance_id(rng, &mut taken),
        })
        .collect();
    grid.shuffle(rng);
    grid
}

/// Random 9-character base-36 token, unique within `taken`.
fn fresh_instance_id<R: Rng + ?Sized>(
    rng: &mut R,
    taken: &mut HashSet<InstanceId>,
) -> InstanceId {
    loop {
        let id: String = (0..INSTANCE_ID_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        let id = InstanceId(id);
        if taken.insert(id.clone()) {
            return id;
        }
    }
}
