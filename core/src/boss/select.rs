//! Spawn selection
//!
//! Weighted sampling over the roster: one cumulative-weight draw picks the
//! boss, then a uniform draw picks one of its spawn points. A definition
//! without spawn points aborts the attempt; it never falls back to another
//! candidate, so misconfigured entries surface instead of silently shifting
//! the distribution.

use rand::Rng;
use thiserror::Error;

use super::{BossDefinition, SpawnPoint};

/// Reasons a spawn attempt could not select a boss.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("roster is empty")]
    EmptyRoster,

    #[error("roster total spawn weight is not positive")]
    NonPositiveWeight,

    #[error("boss '{species}' has no spawn points defined")]
    NoSpawnPoints { species: String },
}

/// Pick one definition by cumulative-weight sampling against a uniform draw
/// in `[0, total_weight)`.
pub fn pick_definition<'a, R: Rng + ?Sized>(
    roster: &'a [BossDefinition],
    rng: &mut R,
) -> Result<&'a BossDefinition, SelectError> {
    if roster.is_empty() {
        return Err(SelectError::EmptyRoster);
    }

    let total_weight: f64 = roster.iter().map(|b| b.spawn_weight.max(0.0)).sum();
    if total_weight <= 0.0 {
        return Err(SelectError::NonPositiveWeight);
    }

    let draw = rng.random_range(0.0..total_weight);
    let mut cumulative = 0.0;
    for boss in roster {
        cumulative += boss.spawn_weight.max(0.0);
        if draw < cumulative {
            return Ok(boss);
        }
    }

    // Floating-point accumulation can leave the draw a hair past the last
    // bucket boundary.
    Ok(roster
        .iter()
        .rfind(|b| b.spawn_weight > 0.0)
        .unwrap_or(&roster[roster.len() - 1]))
}

/// Pick a uniformly random spawn point from the definition's list.
pub fn pick_spawn_point<R: Rng + ?Sized>(
    boss: &BossDefinition,
    rng: &mut R,
) -> Result<SpawnPoint, SelectError> {
    if boss.spawn_points.is_empty() {
        return Err(SelectError::NoSpawnPoints {
            species: boss.species.clone(),
        });
    }
    let idx = rng.random_range(0..boss.spawn_points.len());
    Ok(boss.spawn_points[idx])
}
