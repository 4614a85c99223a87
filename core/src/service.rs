//! Raid service
//!
//! The lifecycle-scoped glue owning settings, roster, registry, reward
//! sequencer, tick queue, and RNG. The host wires exactly three entry
//! points: `on_tick` from its end-of-tick event, `handle_signal` for
//! collaborator events, and the admin operations. No entry point lets a
//! failure escape into the host's dispatch loop.

use std::sync::Mutex;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use thiserror::Error;

use crate::boss::{BossDefinition, SelectError, pick_definition, pick_spawn_point};
use crate::config::{RaidSettings, format_template};
use crate::raid::{DamageOutcome, RaidRegistry, RaidSeed};
use crate::reward::RewardSequencer;
use crate::sched::{TickQueue, TimerService};
use crate::signal::RaidSignal;
use crate::sync::lock;
use crate::world::{ActorId, ActorSpec, ParticleEffect, PlayerId, TICKS_PER_SECOND, Vec3, WorldHost};

/// Grace period between the anticipation countdown ending and the fallen
/// boss actor being removed from the world.
const CORPSE_DESPAWN_BUFFER_SECS: u64 = 1;

/// Reasons a spawn attempt was aborted. Scheduled attempts log these and
/// retry at the next interval; the admin surface reports them verbatim.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("a reward sequence is in progress")]
    RewardWindowOpen,

    #[error("maximum active raids reached ({0})")]
    MaxActiveRaids(usize),

    #[error(transparent)]
    Select(#[from] SelectError),

    #[error("host rejected the boss actor spawn")]
    HostRejected,

    #[error("raid registry is not bound to a host")]
    NotBound,
}

/// Explicit parameters for an admin-initiated spawn.
#[derive(Debug, Clone)]
pub struct SpawnParams {
    pub species: String,
    pub level: u32,
    pub max_health: i64,
    pub scale: f32,
    pub damage_per_win: i64,
    pub despawn_secs: u64,
}

/// Confirmation data for a successful spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnReceipt {
    pub raid_id: ActorId,
    pub species: String,
    pub level: u32,
    pub position: Vec3,
}

/// One engine instance per hosted world.
#[derive(Debug)]
pub struct RaidService {
    settings: RaidSettings,
    roster: Vec<BossDefinition>,
    registry: RaidRegistry,
    rewards: RewardSequencer,
    queue: TickQueue,
    timers: TimerService,
    rng: Mutex<StdRng>,
    last_tick: Mutex<u64>,
}

impl RaidService {
    /// Must be created within a tokio runtime (the timer service captures
    /// it).
    pub fn new(settings: RaidSettings, roster: Vec<BossDefinition>) -> Self {
        Self::with_rng(settings, roster, StdRng::from_os_rng())
    }

    /// Seeded constructor for deterministic tests.
    pub fn with_rng(settings: RaidSettings, roster: Vec<BossDefinition>, rng: StdRng) -> Self {
        let queue = TickQueue::new();
        let timers = TimerService::new();
        let registry = RaidRegistry::new();
        registry.bind(settings.clone());
        let rewards = RewardSequencer::new(settings.clone(), timers.clone(), queue.sender());

        Self {
            settings,
            roster,
            registry,
            rewards,
            queue,
            timers,
            rng: Mutex::new(rng),
            last_tick: Mutex::new(0),
        }
    }

    pub fn settings(&self) -> &RaidSettings {
        &self.settings
    }

    pub fn registry(&self) -> &RaidRegistry {
        &self.registry
    }

    pub fn rewards(&self) -> &RewardSequencer {
        &self.rewards
    }

    /// End-of-tick hook. Drains marshaled work, runs registry maintenance,
    /// and attempts a scheduled spawn on its cadence.
    pub fn on_tick(&self, world: &mut dyn WorldHost, now_tick: u64) {
        *lock(&self.last_tick) = now_tick;
        self.queue.drain(world);
        self.registry.tick(world, now_tick);

        let interval_ticks = self.settings.spawn_interval_secs * TICKS_PER_SECOND;
        if interval_ticks > 0 && now_tick > 0 && now_tick % interval_ticks == 0 {
            match self.attempt_scheduled_spawn(world) {
                Ok(receipt) => {
                    tracing::info!(species = %receipt.species, "scheduled raid boss spawned");
                }
                // Gates are routine; misconfiguration deserves a warning
                Err(SpawnError::Select(err @ SelectError::NoSpawnPoints { .. })) => {
                    tracing::warn!("spawn attempt skipped: {err}");
                }
                Err(SpawnError::HostRejected) => {
                    tracing::warn!("spawn attempt failed: host rejected the actor");
                }
                Err(err) => tracing::debug!("spawn attempt skipped: {err}"),
            }
        }
    }

    /// Route one collaborator event. Runs on the tick thread.
    pub fn handle_signal(&self, world: &mut dyn WorldHost, signal: RaidSignal) {
        match signal {
            RaidSignal::VictoryReported { player, raid_id } => {
                self.report_victory(world, player, raid_id);
            }
            RaidSignal::BattleJoined { player, raid_id } => {
                self.registry.mark_battled(player, raid_id);
            }
            RaidSignal::CaptureReported { player, actor } => {
                self.rewards.resolve_capture(player, actor);
            }
            RaidSignal::PlayerDisconnected { player } => {
                self.handle_disconnect(world, player);
            }
        }
    }

    /// Apply one victory's worth of damage and run the consequences.
    fn report_victory(&self, world: &mut dyn WorldHost, player: PlayerId, raid_id: ActorId) {
        let Some(damage) = self.registry.damage_per_win(raid_id) else {
            tracing::warn!(raid_id, "victory reported against unknown or ended raid");
            return;
        };

        match self.registry.apply_damage(player, raid_id, damage) {
            DamageOutcome::UnknownRaid | DamageOutcome::AlreadyDefeated => {}
            DamageOutcome::Weakened => {
                world.flash_hurt(raid_id);
                world.send_message(player, "The Raid Boss weakens!");
            }
            DamageOutcome::Defeated { participants, source } => {
                tracing::info!(species = %source.species, "raid boss defeated");
                world.send_message(player, "You have defeated the Raid Boss!");
                world.emit_particles(ParticleEffect::Defeat, source.position);
                world.set_defeated_pose(source.boss_actor);

                self.registry.end(raid_id);
                self.rewards.begin(&*world, &participants, &source);

                // The corpse lingers through the anticipation period, then
                // dissolves.
                let delay = Duration::from_secs(
                    self.settings.anticipation_secs + CORPSE_DESPAWN_BUFFER_SECS,
                );
                let sender = self.queue.sender();
                let actor = source.boss_actor;
                let position = source.position;
                self.timers.once(delay, move || {
                    sender.push(move |world| {
                        if world.actor_exists(actor) {
                            world.emit_particles(ParticleEffect::Despawn, position);
                            world.despawn_actor(actor);
                        }
                    });
                });
            }
        }
    }

    /// Synchronous disconnect hook.
    pub fn handle_disconnect(&self, world: &mut dyn WorldHost, player: PlayerId) {
        self.registry.drop_viewer(player);
        self.rewards.abort_for(world, player);
    }

    /// Scheduled weighted spawn, gated on the reward sequence and the
    /// active-raid cap.
    pub fn attempt_scheduled_spawn(
        &self,
        world: &mut dyn WorldHost,
    ) -> Result<SpawnReceipt, SpawnError> {
        if self.rewards.any_window_open() {
            return Err(SpawnError::RewardWindowOpen);
        }
        if self.registry.len() >= self.settings.max_active_raids {
            return Err(SpawnError::MaxActiveRaids(self.settings.max_active_raids));
        }

        let (definition, point) = {
            let mut rng = lock(&self.rng);
            let definition = pick_definition(&self.roster, &mut *rng)?.clone();
            let point = pick_spawn_point(&definition, &mut *rng)?;
            (definition, point)
        };

        let receipt = self.spawn_from_definition(world, &definition, point.position())?;

        let coords = receipt.position.display_coords();
        for line in &self.settings.spawn_message {
            world.broadcast(&format_template(
                line,
                &[("species", &receipt.species), ("coords", &coords)],
            ));
        }
        Ok(receipt)
    }

    /// Admin spawn with explicit parameters. Bypasses the scheduler gates.
    pub fn spawn_boss(
        &self,
        world: &mut dyn WorldHost,
        params: SpawnParams,
        position: Vec3,
    ) -> Result<SpawnReceipt, SpawnError> {
        let definition = BossDefinition {
            species: params.species,
            level: params.level,
            shiny: false,
            max_health: params.max_health,
            scale: params.scale,
            spawn_weight: 0.0,
            damage_per_win: params.damage_per_win,
            despawn_secs: params.despawn_secs,
            spawn_points: Vec::new(),
        };
        self.spawn_from_definition(world, &definition, position)
    }

    fn spawn_from_definition(
        &self,
        world: &mut dyn WorldHost,
        definition: &BossDefinition,
        position: Vec3,
    ) -> Result<SpawnReceipt, SpawnError> {
        let yaw: f32 = lock(&self.rng).random_range(0.0..360.0);
        let spec = ActorSpec {
            species: definition.species.clone(),
            level: definition.level,
            shiny: definition.shiny,
            scale: definition.scale,
            catchable: false,
            position,
            yaw,
        };
        let Some(actor) = world.spawn_actor(&spec) else {
            return Err(SpawnError::HostRejected);
        };

        let now_tick = self.current_tick();
        let created = self.registry.create(
            RaidSeed {
                boss_actor: actor,
                species: definition.species.clone(),
                level: definition.level,
                shiny: definition.shiny,
                position,
                max_health: definition.max_health,
                damage_per_win: definition.damage_per_win,
                despawn_secs: definition.despawn_secs,
            },
            now_tick,
        );
        if !created {
            // Never leave a half-initialized raid: take the actor back out.
            world.despawn_actor(actor);
            return Err(SpawnError::NotBound);
        }

        tracing::info!(species = %definition.species, ?position, "raid boss registered");
        Ok(SpawnReceipt {
            raid_id: actor,
            species: definition.species.clone(),
            level: definition.level,
            position,
        })
    }

    /// Admin teardown. Returns how many raids were live.
    pub fn despawn_all(&self) -> usize {
        self.registry.end_all()
    }

    fn current_tick(&self) -> u64 {
        *lock(&self.last_tick)
    }
}
