use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use incursion_core::{
    RaidService, RaidSettings, RaidSettingsExt, RosterConfig, TICKS_PER_SECOND,
    load_roster_from_dir,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::sim::SimWorld;

/// Tasks the console owns for its lifetime.
#[derive(Default)]
pub struct BackgroundTasks {
    pub tick_loop: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn abort_all(&mut self) {
        if let Some(handle) = self.tick_loop.take() {
            handle.abort();
        }
    }
}

/// Holds all shared state for the admin console.
/// This is a lightweight container - logic lives in the engine and the sim.
#[derive(Clone)]
pub struct CliContext {
    pub service: Arc<RaidService>,
    pub world: Arc<Mutex<SimWorld>>,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
    tick: Arc<AtomicU64>,
}

impl CliContext {
    /// Load settings and roster, then stand up the engine.
    /// Must be called within a tokio runtime.
    pub fn new() -> Self {
        let settings = RaidSettings::load();

        let roster = match load_roster_from_dir(Path::new("bosses")) {
            Ok(roster) if !roster.is_empty() => roster,
            Ok(_) => {
                tracing::info!("no roster files found; using the starter roster");
                RosterConfig::default().bosses
            }
            Err(err) => {
                tracing::error!("failed to load roster: {err}; using the starter roster");
                RosterConfig::default().bosses
            }
        };

        Self {
            service: Arc::new(RaidService::new(settings, roster)),
            world: Arc::new(Mutex::new(SimWorld::new())),
            tasks: Arc::new(Mutex::new(BackgroundTasks::default())),
            tick: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }

    /// Drive the engine at the fixed simulation rate.
    pub fn start_tick_loop(&self) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let world = Arc::clone(&self.world);
        let tick = Arc::clone(&self.tick);

        tokio::spawn(async move {
            let period = Duration::from_millis(1000 / TICKS_PER_SECOND);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let now = tick.fetch_add(1, Ordering::Relaxed) + 1;
                let mut world = world.lock().await;
                service.on_tick(&mut *world, now);
            }
        })
    }
}

impl Default for CliContext {
    fn default() -> Self {
        Self::new()
    }
}
