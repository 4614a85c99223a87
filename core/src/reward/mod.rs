//! Per-participant reward flow
//!
//! This module provides:
//! - **Window**: the per-participant state machine
//!   (Anticipation → Catchable → gone)
//! - **Sequencer**: timer wiring, transitions, and cleanup

mod sequencer;
mod window;


pub use sequencer::RewardSequencer;
pub use window::{RewardPhase, RewardPhaseKind, RewardWindow, RewardWindowView};
