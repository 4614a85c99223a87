//! Background scheduling and tick marshaling
//!
//! Two execution contexts exist: the host's single-threaded simulation tick
//! and wall-clock timers running on the tokio runtime. This module provides:
//! - **TimerService**: one-shot and fixed-rate wall-clock callbacks
//! - **TickQueue**: closures enqueued from any thread, drained in order on
//!   the tick thread. This is the only path by which background work may
//!   mutate the world

mod queue;
mod timer;

pub use queue::{TickFn, TickQueue, TickSender};
pub use timer::{TimerHandle, TimerService};
