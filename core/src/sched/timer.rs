//! Wall-clock timer service
//!
//! Timers run as tokio tasks, independent of the simulation tick rate.
//! Cancellation is best-effort: a callback that has already been dequeued
//! may still run once, so callbacks must re-check liveness before acting.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Issues one-shot and fixed-rate callbacks on wall-clock time.
///
/// Captures the current tokio runtime at construction, so timers may be
/// started later from threads outside the runtime (e.g. the tick thread).
#[derive(Debug, Clone)]
pub struct TimerService {
    handle: Handle,
}

impl TimerService {
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Run `callback` once after `delay`.
    pub fn once<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        TimerHandle { task }
    }

    /// Run `callback` every `period`, first firing one full period after
    /// scheduling, until it returns `false` or the handle is cancelled.
    pub fn repeating<F>(&self, period: Duration, mut callback: F) -> TimerHandle
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let task = self.handle.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !callback() {
                    break;
                }
            }
        });
        TimerHandle { task }
    }
}

/// Opaque cancellable token for a scheduled timer.
///
/// Owned by whoever scheduled the timer; dropping the handle does NOT stop
/// the timer, cancellation is always explicit.
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Best-effort cancellation. Idempotent.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
