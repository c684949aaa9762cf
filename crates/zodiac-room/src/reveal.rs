//! The reveal lottery of the suggestion mode.
//!
//! Targets are normally drawn uniformly from the grid. While the priority
//! rotation is active, the draw is biased:
//!
//! - a regular player asking for the reveal pulls each target slot from
//!   the priority holder's ballot with probability `bias`;
//! - the boss asking for the reveal pushes every balloted tile out of the
//!   eligible pool with probability `bias`.
//!
//! Whatever slots remain are filled uniformly from the rest of the grid.

use rand::Rng;
use rand::seq::SliceRandom;
use zodiac_protocol::{InstanceId, Tile};

/// Who asked for the reveal, and whose ballot the rotation favours.
#[derive(Debug, Clone, Copy)]
pub enum Priority<'a> {
    /// Draw from the holder's ballot.
    Favour(&'a [InstanceId]),
    /// Keep balloted tiles out of the draw.
    Exclude(&'a [InstanceId]),
}

/// Rotation bias: `stt / target_count` while the rotation is active,
/// capped at 1.
pub fn bias(stt: usize, target_count: usize) -> f64 {
    if stt == 0 || target_count == 0 {
        0.0
    } else {
        (stt as f64 / target_count as f64).min(1.0)
    }
}

/// Draws `min(target_count, grid.len())` distinct tiles from `grid`.
pub fn draw_targets<R: Rng + ?Sized>(
    grid: &[Tile],
    target_count: usize,
    bias: f64,
    priority: Priority<'_>,
    rng: &mut R,
) -> Vec<Tile> {
    let wanted = target_count.min(grid.len());
    let mut remaining: Vec<Tile> = grid.to_vec();
    let mut targets = Vec::with_capacity(wanted);

    match priority {
        Priority::Favour(ballot) if bias > 0.0 => {
            let mut favoured: Vec<&InstanceId> = ballot.iter().collect();
            favoured.shuffle(rng);
            let mut favoured = favoured.into_iter();
            for _ in 0..wanted {
                if !rng.random_bool(bias) {
                    continue;
                }
                let Some(id) = favoured.find(|id| remaining.iter().any(|t| &t.instance_id == *id))
                else {
                    break;
                };
                if let Some(pos) = remaining.iter().position(|t| &t.instance_id == id) {
                    targets.push(remaining.swap_remove(pos));
                }
            }
        }
        Priority::Exclude(balloted) if bias > 0.0 => {
            let (mut excluded, mut eligible): (Vec<Tile>, Vec<Tile>) =
                remaining.drain(..).partition(|t| {
                    balloted.contains(&t.instance_id) && rng.random_bool(bias)
                });
            take_uniform(&mut eligible, &mut targets, wanted, rng);
            remaining.append(&mut eligible);
            remaining.append(&mut excluded);
        }
        _ => {}
    }

    take_uniform(&mut remaining, &mut targets, wanted, rng);
    targets
}

/// Moves uniformly chosen tiles from `from` into `into` until it holds
/// `wanted` tiles or `from` runs dry.
fn take_uniform<R: Rng + ?Sized>(
    from: &mut Vec<Tile>,
    into: &mut Vec<Tile>,
    wanted: usize,
    rng: &mut R,
) {
    while into.len() < wanted && !from.is_empty() {
        let pick = rng.random_range(0..from.len());
        into.push(from.swap_remove(pick));
    }
}
