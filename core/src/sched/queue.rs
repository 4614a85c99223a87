//! Tick marshaling queue
//!
//! Background timers never mutate the world directly: they push closures
//! here, and the host drains the queue once per tick. Closures run in
//! enqueue order, never concurrently with each other or with tick logic.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::sync::lock;
use crate::world::WorldHost;

/// Work marshaled onto the tick thread.
pub type TickFn = Box<dyn FnOnce(&mut dyn WorldHost) + Send>;

/// Cloneable producer side, handed to timer callbacks.
#[derive(Debug, Clone)]
pub struct TickSender {
    tx: mpsc::UnboundedSender<TickFn>,
}

impl TickSender {
    /// Enqueue work for the next tick. Silently dropped if the engine has
    /// been torn down; late timer callbacks are expected.
    pub fn push<F>(&self, task: F)
    where
        F: FnOnce(&mut dyn WorldHost) + Send + 'static,
    {
        if self.tx.send(Box::new(task)).is_err() {
            tracing::debug!("tick queue closed; dropping marshaled task");
        }
    }
}

/// Consumer side, drained by the tick thread.
#[derive(Debug)]
pub struct TickQueue {
    tx: mpsc::UnboundedSender<TickFn>,
    rx: Mutex<mpsc::UnboundedReceiver<TickFn>>,
}

impl Default for TickQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TickQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn sender(&self) -> TickSender {
        TickSender {
            tx: self.tx.clone(),
        }
    }

    /// Run every queued closure in enqueue order. Returns how many ran.
    pub fn drain(&self, world: &mut dyn WorldHost) -> usize {
        let mut rx = lock(&self.rx);
        let mut ran = 0;
        while let Ok(task) = rx.try_recv() {
            task(world);
            ran += 1;
        }
        ran
    }
}
