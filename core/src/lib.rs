pub mod bar;
pub mod boss;
pub mod config;
pub mod raid;
pub mod reward;
pub mod sched;
pub mod serde_defaults;
pub mod service;
pub mod signal;
pub mod world;

mod sync;

#[cfg(test)]
mod service_tests;

// Re-exports for convenience
pub use bar::{BarColor, BarSnapshot, StatusBar};
pub use boss::{
    BossDefinition, RosterConfig, RosterError, SelectError, SpawnPoint, load_roster_from_dir,
    load_roster_from_file, pick_definition, pick_spawn_point,
};
pub use config::{RaidSettings, RaidSettingsExt, format_clock, format_template};
pub use raid::{DamageOutcome, Raid, RaidRegistry, RaidSeed, RewardSource};
pub use reward::{RewardPhaseKind, RewardSequencer, RewardWindowView};
pub use sched::{TickQueue, TickSender, TimerHandle, TimerService};
pub use service::{RaidService, SpawnError, SpawnParams, SpawnReceipt};
pub use signal::RaidSignal;
pub use world::{
    ActorId, ActorSpec, ParticleEffect, PlayerId, TICKS_PER_SECOND, Vec3, WorldHost,
};
