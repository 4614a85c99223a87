//! Boss roster definition types
//!
//! Definitions are loaded from TOML config files and describe the bosses the
//! spawn scheduler may pick, with their stats and allowed spawn points.

use serde::{Deserialize, Serialize};

use crate::serde_defaults::{default_scale, default_weight};
use crate::world::Vec3;

/// A fixed coordinate a boss may spawn at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl SpawnPoint {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Definition of one spawnable raid boss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossDefinition {
    /// Species name handed to the host's actor spawner.
    pub species: String,

    pub level: u32,

    #[serde(default)]
    pub shiny: bool,

    /// Shared raid health pool (not the actor's native health).
    pub max_health: i64,

    /// Visual scale multiplier of the spawned actor.
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Relative spawn weight. Entries with weight 0 never spawn.
    #[serde(default = "default_weight")]
    pub spawn_weight: f64,

    /// Fixed damage applied to the pool per reported victory.
    pub damage_per_win: i64,

    /// Seconds until the boss despawns on its own. 0 = never.
    #[serde(default)]
    pub despawn_secs: u64,

    /// Allowed spawn coordinates. Must be non-empty for scheduled spawns.
    #[serde(default, rename = "spawn_point")]
    pub spawn_points: Vec<SpawnPoint>,
}

/// Root structure for roster config files (TOML).
/// A file can contain one or more boss definitions:
///
/// ```toml
/// [[boss]]
/// species = "pikachu"
/// level = 50
/// max_health = 10000
/// damage_per_win = 500
/// despawn_secs = 1800
///
/// [[boss.spawn_point]]
/// x = 0.0
/// y = 64.0
/// z = 0.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default, rename = "boss")]
    pub bosses: Vec<BossDefinition>,
}

impl Default for RosterConfig {
    /// Starter roster written on first run.
    fn default() -> Self {
        Self {
            bosses: vec![
                BossDefinition {
                    species: "pikachu".to_string(),
                    level: 50,
                    shiny: false,
                    max_health: 10_000,
                    scale: 2.0,
                    spawn_weight: 1.0,
                    damage_per_win: 500,
                    despawn_secs: 1800,
                    spawn_points: vec![SpawnPoint { x: 0.0, y: 64.0, z: 0.0 }],
                },
                BossDefinition {
                    species: "charizard".to_string(),
                    level: 80,
                    shiny: false,
                    max_health: 50_000,
                    scale: 3.0,
                    spawn_weight: 0.5,
                    damage_per_win: 1000,
                    despawn_secs: 3600,
                    spawn_points: vec![SpawnPoint { x: 0.0, y: 64.0, z: 0.0 }],
                },
            ],
        }
    }
}
