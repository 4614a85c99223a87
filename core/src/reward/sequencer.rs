//! Reward sequencing
//!
//! Drives, per victorious participant, the two-phase timed reward flow:
//! an anticipation countdown with an ambient particle pulse, then a
//! capturable reward actor on a flee countdown. Three independent timelines
//! per participant start, race, and cancel here.
//!
//! Countdown decrements are thread-safe bookkeeping done directly in timer
//! callbacks; everything that touches the world is marshaled through the
//! tick queue. Every callback re-checks window presence first, so a timer
//! that fires after its window was torn down is a silent no-op.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hashbrown::HashMap;

use crate::bar::{BarColor, StatusBar};
use crate::config::{RaidSettings, format_template};
use crate::raid::RewardSource;
use crate::sched::{TickSender, TimerService};
use crate::sync::lock;
use crate::world::{ActorId, ActorSpec, ParticleEffect, PlayerId, Vec3, WorldHost};

use super::window::{RewardPhase, RewardPhaseKind, RewardWindow, RewardWindowView};

/// Offset of the reward actor in front of the participant.
const REWARD_SPAWN_DISTANCE: f64 = 2.0;

/// Per-participant reward flow manager.
///
/// One instance per engine; cheap to clone (shared state). While any window
/// is open anywhere, scheduled boss spawns are suppressed process-wide.
#[derive(Debug, Clone)]
pub struct RewardSequencer {
    inner: Arc<SequencerInner>,
}

#[derive(Debug)]
struct SequencerInner {
    windows: Mutex<HashMap<PlayerId, RewardWindow>>,
    settings: RaidSettings,
    timers: TimerService,
    queue: TickSender,
}

impl RewardSequencer {
    pub fn new(settings: RaidSettings, timers: TimerService, queue: TickSender) -> Self {
        Self {
            inner: Arc::new(SequencerInner {
                windows: Mutex::new(HashMap::new()),
                settings,
                timers,
                queue,
            }),
        }
    }

    /// Whether any participant currently has a reward window open.
    pub fn any_window_open(&self) -> bool {
        !lock(&self.inner.windows).is_empty()
    }

    pub fn open_window_count(&self) -> usize {
        lock(&self.inner.windows).len()
    }

    /// Open an anticipation window for every connected participant.
    /// Offline participants are skipped; a participant with a window
    /// already open keeps the existing one.
    pub fn begin(&self, world: &dyn WorldHost, participants: &[PlayerId], source: &RewardSource) {
        for &player in participants {
            if !world.player_online(player) {
                tracing::debug!(player, "skipping reward window for offline participant");
                continue;
            }
            SequencerInner::open_window(&self.inner, player, source.clone());
        }
    }

    /// Capture event for a reward actor. Returns whether this resolved a
    /// window; a second call for the same capture is a no-op.
    pub fn resolve_capture(&self, player: PlayerId, actor: ActorId) -> bool {
        let mut windows = lock(&self.inner.windows);
        let Some(window) = windows.get(&player) else {
            return false;
        };
        if window.reward_actor() != Some(actor) {
            return false;
        }
        window.cancel_timers();
        window.bar().clear_viewers();
        windows.remove(&player);
        tracing::info!(player, actor, "reward actor captured");
        true
    }

    /// Synchronous disconnect cleanup: cancel timers, retract bars, and
    /// despawn any in-flight reward actor. Idempotent; safe to call while
    /// countdowns are mid-flight.
    pub fn abort_for(&self, world: &mut dyn WorldHost, player: PlayerId) {
        let Some(window) = lock(&self.inner.windows).remove(&player) else {
            return;
        };
        window.cancel_timers();
        window.bar().clear_viewers();
        if let Some(actor) = window.reward_actor()
            && world.actor_exists(actor)
        {
            world.despawn_actor(actor);
        }
        tracing::debug!(player, "aborted reward window");
    }

    /// Views of every open window, for status displays.
    pub fn views(&self) -> Vec<RewardWindowView> {
        lock(&self.inner.windows)
            .iter()
            .map(|(&player, window)| RewardWindowView {
                player,
                species: window.source.species.clone(),
                phase: window.kind(),
                remaining_secs: window.remaining_secs(),
                reward_actor: window.reward_actor(),
            })
            .collect()
    }

    pub fn phase_of(&self, player: PlayerId) -> Option<RewardPhaseKind> {
        lock(&self.inner.windows).get(&player).map(RewardWindow::kind)
    }

    pub fn bar_of(&self, player: PlayerId) -> Option<StatusBar> {
        lock(&self.inner.windows)
            .get(&player)
            .map(|w| w.bar().clone())
    }

    // ─── Advance functions (one elapsed period each) ────────────────────

    /// One elapsed second of the anticipation countdown.
    pub(crate) fn advance_anticipation(&self, player: PlayerId) -> bool {
        SequencerInner::anticipation_tick(&self.inner, player)
    }

    /// One firing of the ambient pulse.
    pub(crate) fn advance_pulse(&self, player: PlayerId) -> bool {
        SequencerInner::pulse_tick(&self.inner, player)
    }

    /// One elapsed second of the flee countdown.
    pub(crate) fn advance_flee(&self, player: PlayerId) -> bool {
        SequencerInner::flee_tick(&self.inner, player)
    }
}

impl SequencerInner {
    /// Enter Anticipation for one participant.
    ///
    /// The windows lock is held while the timers start, so a callback
    /// firing early blocks until the window entry is consistent.
    fn open_window(inner: &Arc<Self>, player: PlayerId, source: RewardSource) {
        let mut windows = lock(&inner.windows);
        if windows.contains_key(&player) {
            tracing::warn!(player, "reward window already open; keeping the existing one");
            return;
        }

        let total = inner.settings.anticipation_secs;
        let bar = StatusBar::new(
            anticipation_label(&inner.settings, &source.species, total),
            BarColor::Yellow,
        );
        bar.add_viewer(player);

        let for_countdown = Arc::clone(inner);
        let countdown = inner.timers.repeating(Duration::from_secs(1), move || {
            Self::anticipation_tick(&for_countdown, player)
        });

        let for_pulse = Arc::clone(inner);
        let pulse = inner.timers.repeating(
            Duration::from_millis(inner.settings.pulse_interval_ms.max(1)),
            move || Self::pulse_tick(&for_pulse, player),
        );

        windows.insert(
            player,
            RewardWindow {
                source,
                phase: RewardPhase::Anticipation {
                    remaining_secs: total,
                    bar,
                    countdown,
                    pulse,
                },
            },
        );
        tracing::info!(player, "reward anticipation started");
    }

    /// Countdown bookkeeping for Anticipation. Returns whether the timer
    /// stays alive.
    fn anticipation_tick(inner: &Arc<Self>, player: PlayerId) -> bool {
        let mut windows = lock(&inner.windows);
        let Some(window) = windows.get_mut(&player) else {
            return false; // torn down; stale callback
        };
        let RewardWindow { source, phase } = window;
        let RewardPhase::Anticipation { remaining_secs, bar, .. } = phase else {
            return false;
        };

        *remaining_secs = remaining_secs.saturating_sub(1);
        let total = inner.settings.anticipation_secs.max(1);
        bar.set_label(anticipation_label(&inner.settings, &source.species, *remaining_secs));
        bar.set_percent(*remaining_secs as f32 / total as f32);

        if *remaining_secs == 0 {
            let for_transition = Arc::clone(inner);
            inner.queue.push(move |world| {
                Self::enter_catchable(&for_transition, world, player);
            });
            return false;
        }
        true
    }

    /// Ambient heartbeat during Anticipation: particles at the fallen
    /// boss's position, marshaled to the tick thread.
    fn pulse_tick(inner: &Arc<Self>, player: PlayerId) -> bool {
        let windows = lock(&inner.windows);
        let Some(window) = windows.get(&player) else {
            return false;
        };
        if window.kind() != RewardPhaseKind::Anticipation {
            return false;
        }
        let position = window.source.position;
        drop(windows);

        inner.queue.push(move |world| {
            world.emit_particles(ParticleEffect::AnticipationPulse, position);
        });
        true
    }

    /// Transition Anticipation → Catchable. Runs on the tick thread.
    fn enter_catchable(inner: &Arc<Self>, world: &mut dyn WorldHost, player: PlayerId) {
        let mut windows = lock(&inner.windows);
        let Some(window) = windows.get(&player) else {
            return; // disconnected (or otherwise torn down) while enqueued
        };
        if window.kind() != RewardPhaseKind::Anticipation {
            return;
        }
        window.cancel_timers();
        window.bar().clear_viewers();
        let source = window.source.clone();
        windows.remove(&player);

        if !world.player_online(player) {
            return;
        }
        let Some(player_pos) = world.player_position(player) else {
            return;
        };

        let facing = world
            .player_facing(player)
            .and_then(|v| v.horizontal_unit())
            .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
        let spawn_pos = player_pos.add(facing.scaled(REWARD_SPAWN_DISTANCE));
        let yaw = world.player_yaw(player).unwrap_or(0.0);

        let spec = ActorSpec {
            species: source.species.clone(),
            level: source.level,
            shiny: source.shiny,
            scale: 1.0,
            catchable: true,
            position: spawn_pos,
            yaw,
        };
        let Some(actor) = world.spawn_actor(&spec) else {
            tracing::error!(player, species = %source.species, "host rejected reward actor spawn");
            return;
        };

        world.emit_particles(ParticleEffect::RewardSpawn, spawn_pos);
        world.send_message(
            player,
            &format!(
                "A {} appeared! Catch it before it runs away!",
                source.species
            ),
        );

        let total = inner.settings.flee_secs;
        let bar = StatusBar::new(flee_label(&inner.settings, &source.species, total), BarColor::Red);
        bar.add_viewer(player);

        let for_countdown = Arc::clone(inner);
        let countdown = inner
            .timers
            .repeating(Duration::from_secs(1), move || {
                Self::flee_tick(&for_countdown, player)
            });

        windows.insert(
            player,
            RewardWindow {
                source,
                phase: RewardPhase::Catchable {
                    actor,
                    remaining_secs: total,
                    bar,
                    countdown,
                },
            },
        );
        tracing::info!(player, actor, "reward actor catchable");
    }

    /// Countdown bookkeeping for Catchable.
    fn flee_tick(inner: &Arc<Self>, player: PlayerId) -> bool {
        let mut windows = lock(&inner.windows);
        let Some(window) = windows.get_mut(&player) else {
            return false;
        };
        let RewardWindow { source, phase } = window;
        let RewardPhase::Catchable { remaining_secs, bar, .. } = phase else {
            return false;
        };

        *remaining_secs = remaining_secs.saturating_sub(1);
        let total = inner.settings.flee_secs.max(1);
        bar.set_label(flee_label(&inner.settings, &source.species, *remaining_secs));
        bar.set_percent(*remaining_secs as f32 / total as f32);

        if *remaining_secs == 0 {
            let for_expiry = Arc::clone(inner);
            inner.queue.push(move |world| {
                Self::expire_catchable(&for_expiry, world, player);
            });
            return false;
        }
        true
    }

    /// Flee timeout: despawn the reward actor with a notice. Tick thread.
    fn expire_catchable(inner: &Arc<Self>, world: &mut dyn WorldHost, player: PlayerId) {
        let mut windows = lock(&inner.windows);
        let Some(window) = windows.get(&player) else {
            return; // captured or disconnected while enqueued
        };
        let Some(actor) = window.reward_actor() else {
            return;
        };
        window.cancel_timers();
        window.bar().clear_viewers();
        let species = window.source.species.clone();
        windows.remove(&player);

        if world.actor_exists(actor) {
            let position = world.actor_position(actor).unwrap_or_default();
            world.emit_particles(ParticleEffect::Despawn, position);
            world.despawn_actor(actor);
        }
        world.send_message(player, &format!("The {species} ran away!"));
        tracing::info!(player, actor, "reward window expired");
    }
}

fn anticipation_label(settings: &RaidSettings, species: &str, remaining: u64) -> String {
    format_template(
        &settings.anticipation_title,
        &[("species", species), ("time", &remaining.to_string())],
    )
}

fn flee_label(settings: &RaidSettings, species: &str, remaining: u64) -> String {
    format_template(
        &settings.flee_title,
        &[("species", species), ("time", &remaining.to_string())],
    )
}
