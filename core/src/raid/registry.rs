//! Raid registry
//!
//! Authoritative map from boss actor to live raid. Mutated by the tick loop
//! and by victory reports; membership operations are concurrency-safe, but
//! anything touching the world runs on the tick thread only.

use std::sync::Mutex;

use hashbrown::HashMap;

use crate::config::RaidSettings;
use crate::sync::lock;
use crate::world::{ActorId, ParticleEffect, PlayerId, TICKS_PER_SECOND, WorldHost};

use super::{DamageOutcome, Raid, RaidSeed};

/// How often (in ticks) proximity visibility is refreshed.
const VISIBILITY_REFRESH_TICKS: u64 = 100;

/// Process-wide raid bookkeeping with explicit bind/teardown lifecycle.
#[derive(Debug, Default)]
pub struct RaidRegistry {
    raids: Mutex<HashMap<ActorId, Raid>>,
    settings: Mutex<Option<RaidSettings>>,
}

impl RaidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to the host by supplying the settings snapshot. Until this is
    /// called, `create` refuses to register raids.
    pub fn bind(&self, settings: RaidSettings) {
        *lock(&self.settings) = Some(settings);
    }

    pub fn is_bound(&self) -> bool {
        lock(&self.settings).is_some()
    }

    /// Register a new raid. Returns `false` (and logs) if the registry has
    /// not been bound to a host yet.
    pub fn create(&self, seed: RaidSeed, now_tick: u64) -> bool {
        let guard = lock(&self.settings);
        let Some(settings) = guard.as_ref() else {
            tracing::error!("raid registry is not bound to a host; dropping create request");
            return false;
        };

        let raid = Raid::new(seed, now_tick, settings);
        lock(&self.raids).insert(raid.boss_actor, raid);
        true
    }

    /// Apply damage to a raid. Pure bookkeeping; the caller is responsible
    /// for world side effects based on the outcome.
    pub fn apply_damage(&self, player: PlayerId, raid_id: ActorId, amount: i64) -> DamageOutcome {
        let mut raids = lock(&self.raids);
        let Some(raid) = raids.get_mut(&raid_id) else {
            tracing::warn!(raid_id, "damage reported against unknown or ended raid");
            return DamageOutcome::UnknownRaid;
        };
        raid.apply_damage(player, amount)
    }

    /// The fixed damage one victory deals for this raid.
    pub fn damage_per_win(&self, raid_id: ActorId) -> Option<i64> {
        lock(&self.raids).get(&raid_id).map(Raid::damage_per_win)
    }

    /// Qualify a participant as having battled the boss and show them the
    /// bar.
    pub fn mark_battled(&self, player: PlayerId, raid_id: ActorId) {
        if let Some(raid) = lock(&self.raids).get_mut(&raid_id) {
            raid.mark_battled(player);
        }
    }

    /// Remove a player from every raid bar (disconnect cleanup).
    pub fn drop_viewer(&self, player: PlayerId) {
        for raid in lock(&self.raids).values() {
            raid.bar().remove_viewer(player);
        }
    }

    /// Per-tick maintenance: expiry, label refresh, visibility.
    /// Removals are deferred until after iteration completes.
    pub fn tick(&self, world: &mut dyn WorldHost, now_tick: u64) {
        let settings = lock(&self.settings).clone();
        let Some(settings) = settings else { return };

        let mut raids = lock(&self.raids);
        let mut to_remove: Vec<ActorId> = Vec::new();

        for raid in raids.values() {
            let elapsed_ticks = now_tick.saturating_sub(raid.created_tick());

            // Boss actor vanished externally (e.g. chunk unload, kill cmd)
            if !world.actor_exists(raid.boss_actor) {
                to_remove.push(raid.boss_actor);
                continue;
            }

            if raid.despawn_secs() > 0 {
                let elapsed_secs = elapsed_ticks / TICKS_PER_SECOND;
                let remaining_secs = raid.despawn_secs().saturating_sub(elapsed_secs);
                if remaining_secs == 0 {
                    let position = world
                        .actor_position(raid.boss_actor)
                        .unwrap_or(raid.position);
                    world.emit_particles(ParticleEffect::Despawn, position);
                    world.broadcast(&crate::config::format_template(
                        &settings.despawn_message,
                        &[("species", &raid.species)],
                    ));
                    to_remove.push(raid.boss_actor);
                    continue;
                }
                if elapsed_ticks % TICKS_PER_SECOND == 0 {
                    raid.update_bar_label(&settings, remaining_secs);
                }
            }

            if !settings.after_battle_only && elapsed_ticks % VISIBILITY_REFRESH_TICKS == 0 {
                let position = world
                    .actor_position(raid.boss_actor)
                    .unwrap_or(raid.position);
                let nearby = world.players_within(position, settings.proximity_radius);
                for player in &nearby {
                    raid.bar().add_viewer(*player);
                }
                for viewer in raid.bar().viewers() {
                    if !nearby.contains(&viewer) {
                        raid.bar().remove_viewer(viewer);
                    }
                }
            }
        }

        for id in to_remove {
            if let Some(raid) = raids.remove(&id) {
                raid.end();
            }
        }
    }

    /// Idempotent removal of one raid.
    pub fn end(&self, raid_id: ActorId) -> bool {
        match lock(&self.raids).remove(&raid_id) {
            Some(raid) => {
                raid.end();
                true
            }
            None => false,
        }
    }

    /// Remove every raid. Returns how many were live.
    pub fn end_all(&self) -> usize {
        let mut raids = lock(&self.raids);
        let count = raids.len();
        for (_, raid) in raids.drain() {
            raid.end();
        }
        if count > 0 {
            tracing::info!(count, "ended all active raids");
        }
        count
    }

    pub fn len(&self) -> usize {
        lock(&self.raids).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.raids).is_empty()
    }

    pub fn contains(&self, raid_id: ActorId) -> bool {
        lock(&self.raids).contains_key(&raid_id)
    }

    /// Read access for status displays and tests.
    pub fn with_raid<T>(&self, raid_id: ActorId, f: impl FnOnce(&Raid) -> T) -> Option<T> {
        lock(&self.raids).get(&raid_id).map(f)
    }

    /// Snapshot of live raid ids.
    pub fn raid_ids(&self) -> Vec<ActorId> {
        lock(&self.raids).keys().copied().collect()
    }
}
