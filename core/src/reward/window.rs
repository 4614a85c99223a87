//! Reward window state
//!
//! One [`RewardWindow`] per victorious participant, walking
//! Anticipation → Catchable → gone. The window owns its presentation bar
//! and the timer handles driving it; removing the window and cancelling
//! those handles is the only teardown required.

use crate::bar::StatusBar;
use crate::raid::RewardSource;
use crate::sched::TimerHandle;
use crate::world::ActorId;

/// Current phase of a participant's reward flow.
#[derive(Debug)]
pub enum RewardPhase {
    /// Countdown before the reward actor materializes. The ambient pulse
    /// runs concurrently as a pure presentation heartbeat.
    Anticipation {
        remaining_secs: u64,
        bar: StatusBar,
        countdown: TimerHandle,
        pulse: TimerHandle,
    },

    /// Reward actor is in the world, waiting to be captured or to flee.
    Catchable {
        actor: ActorId,
        remaining_secs: u64,
        bar: StatusBar,
        countdown: TimerHandle,
    },
}

/// Phase discriminant for status displays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardPhaseKind {
    Anticipation,
    Catchable,
}

/// Live reward flow of one participant.
#[derive(Debug)]
pub struct RewardWindow {
    pub source: RewardSource,
    pub phase: RewardPhase,
}

impl RewardWindow {
    pub fn kind(&self) -> RewardPhaseKind {
        match self.phase {
            RewardPhase::Anticipation { .. } => RewardPhaseKind::Anticipation,
            RewardPhase::Catchable { .. } => RewardPhaseKind::Catchable,
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        match &self.phase {
            RewardPhase::Anticipation { remaining_secs, .. }
            | RewardPhase::Catchable { remaining_secs, .. } => *remaining_secs,
        }
    }

    pub fn bar(&self) -> &StatusBar {
        match &self.phase {
            RewardPhase::Anticipation { bar, .. } | RewardPhase::Catchable { bar, .. } => bar,
        }
    }

    /// The in-flight reward actor, once one exists.
    pub fn reward_actor(&self) -> Option<ActorId> {
        match &self.phase {
            RewardPhase::Anticipation { .. } => None,
            RewardPhase::Catchable { actor, .. } => Some(*actor),
        }
    }

    /// Cancel every timer this window owns. Idempotent.
    pub fn cancel_timers(&self) {
        match &self.phase {
            RewardPhase::Anticipation { countdown, pulse, .. } => {
                countdown.cancel();
                pulse.cancel();
            }
            RewardPhase::Catchable { countdown, .. } => countdown.cancel(),
        }
    }
}

/// Read-only view of one window for status displays.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardWindowView {
    pub player: crate::world::PlayerId,
    pub species: String,
    pub phase: RewardPhaseKind,
    pub remaining_secs: u64,
    pub reward_actor: Option<ActorId>,
}
