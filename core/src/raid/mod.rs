//! Raid encounter state
//!
//! A [`Raid`] is the transient, shared-health boss state tied to one spawned
//! actor. The [`RaidRegistry`] owns every live raid and is the only place
//! they are created or removed.

mod registry;

#[cfg(test)]
mod registry_tests;

pub use registry::RaidRegistry;

use hashbrown::{HashMap, HashSet};

use crate::bar::{BarColor, StatusBar};
use crate::config::{RaidSettings, format_clock, format_template};
use crate::world::{ActorId, PlayerId, Vec3};

/// Parameters for registering a new raid.
#[derive(Debug, Clone)]
pub struct RaidSeed {
    pub boss_actor: ActorId,
    pub species: String,
    pub level: u32,
    pub shiny: bool,
    pub position: Vec3,
    pub max_health: i64,
    pub damage_per_win: i64,
    /// Seconds until auto-despawn. 0 = never.
    pub despawn_secs: u64,
}

/// Snapshot of a defeated boss, captured before the raid is torn down.
/// Reward actors mirror these attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardSource {
    pub boss_actor: ActorId,
    pub species: String,
    pub level: u32,
    pub shiny: bool,
    pub position: Vec3,
}

/// Result of applying damage to a raid.
#[derive(Debug, Clone, PartialEq)]
pub enum DamageOutcome {
    /// No raid registered under that id; logged no-op.
    UnknownRaid,
    /// The raid was already at zero health; damage is ignored.
    AlreadyDefeated,
    /// Health dropped but stayed above zero.
    Weakened,
    /// This call crossed zero. Fired exactly once per raid.
    Defeated {
        /// Every participant with ledger damage, in no particular order.
        participants: Vec<PlayerId>,
        source: RewardSource,
    },
}

/// One live raid encounter.
#[derive(Debug)]
pub struct Raid {
    pub boss_actor: ActorId,
    pub species: String,
    pub level: u32,
    pub shiny: bool,
    pub position: Vec3,

    max_health: i64,
    current_health: i64,
    damage_per_win: i64,

    /// Per-participant accumulated damage (additive merge).
    damagers: HashMap<PlayerId, i64>,

    /// Participants who have battled this boss (visibility qualification).
    battled: HashSet<PlayerId>,

    last_attacker: Option<PlayerId>,

    created_tick: u64,
    despawn_secs: u64,

    bar: StatusBar,
}

impl Raid {
    pub fn new(seed: RaidSeed, created_tick: u64, settings: &RaidSettings) -> Self {
        let bar = StatusBar::new("", BarColor::Purple);
        let raid = Self {
            boss_actor: seed.boss_actor,
            species: seed.species,
            level: seed.level,
            shiny: seed.shiny,
            position: seed.position,
            max_health: seed.max_health.max(1),
            current_health: seed.max_health.max(1),
            damage_per_win: seed.damage_per_win,
            damagers: HashMap::new(),
            battled: HashSet::new(),
            last_attacker: None,
            created_tick,
            despawn_secs: seed.despawn_secs,
            bar,
        };
        raid.update_bar_percent();
        raid.update_bar_label(settings, raid.despawn_secs);
        raid
    }

    pub fn current_health(&self) -> i64 {
        self.current_health
    }

    pub fn max_health(&self) -> i64 {
        self.max_health
    }

    pub fn damage_per_win(&self) -> i64 {
        self.damage_per_win
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }

    pub fn created_tick(&self) -> u64 {
        self.created_tick
    }

    pub fn despawn_secs(&self) -> u64 {
        self.despawn_secs
    }

    pub fn last_attacker(&self) -> Option<PlayerId> {
        self.last_attacker
    }

    pub fn bar(&self) -> &StatusBar {
        &self.bar
    }

    pub fn ledger_total(&self, player: PlayerId) -> i64 {
        self.damagers.get(&player).copied().unwrap_or(0)
    }

    pub fn has_battled(&self, player: PlayerId) -> bool {
        self.battled.contains(&player)
    }

    /// Apply damage: saturating subtraction, ledger merge, last-attacker
    /// update, bar refresh. Idempotent once defeated.
    pub fn apply_damage(&mut self, player: PlayerId, amount: i64) -> DamageOutcome {
        if self.is_defeated() {
            return DamageOutcome::AlreadyDefeated;
        }

        self.current_health = self.current_health.saturating_sub(amount.max(0)).max(0);
        *self.damagers.entry(player).or_insert(0) += amount.max(0);
        self.last_attacker = Some(player);
        self.update_bar_percent();

        if self.is_defeated() {
            DamageOutcome::Defeated {
                participants: self.damagers.keys().copied().collect(),
                source: self.reward_source(),
            }
        } else {
            DamageOutcome::Weakened
        }
    }

    pub fn mark_battled(&mut self, player: PlayerId) {
        self.battled.insert(player);
        self.bar.add_viewer(player);
    }

    pub fn reward_source(&self) -> RewardSource {
        RewardSource {
            boss_actor: self.boss_actor,
            species: self.species.clone(),
            level: self.level,
            shiny: self.shiny,
            position: self.position,
        }
    }

    fn update_bar_percent(&self) {
        self.bar
            .set_percent(self.current_health as f32 / self.max_health as f32);
    }

    /// Refresh the title with the remaining lifetime.
    pub(crate) fn update_bar_label(&self, settings: &RaidSettings, remaining_secs: u64) {
        let label = format_template(
            &settings.boss_bar_title,
            &[
                ("species", &self.species),
                ("time", &format_clock(remaining_secs)),
            ],
        );
        self.bar.set_label(label);
    }

    /// Drop all presentation state. Called exactly once on removal, but
    /// safe to repeat.
    pub(crate) fn end(&self) {
        self.bar.clear_viewers();
    }
}
