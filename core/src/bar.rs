//! Presentation bars
//!
//! A [`StatusBar`] is a named percent indicator with an explicit viewer set.
//! The engine mutates bars from the tick thread and from background timer
//! callbacks; the host reads a [`BarSnapshot`] per viewer on its next render
//! pass. Bars never touch the world themselves, so mutation counts as
//! thread-safe bookkeeping.

use std::sync::{Arc, Mutex};

use hashbrown::HashSet;

use crate::sync::lock;
use crate::world::PlayerId;

/// Display color of a bar (mapped by the host to its own styling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarColor {
    /// Raid boss health.
    #[default]
    Purple,
    /// Reward anticipation countdown.
    Yellow,
    /// Reward flee countdown.
    Red,
}

/// Point-in-time view of a bar for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSnapshot {
    pub label: String,
    /// Fill fraction in [0.0, 1.0].
    pub percent: f32,
    pub color: BarColor,
}

#[derive(Debug)]
struct BarInner {
    label: Mutex<String>,
    percent: Mutex<f32>,
    viewers: Mutex<HashSet<PlayerId>>,
    color: BarColor,
}

/// Cheaply cloneable handle to one shared bar.
#[derive(Debug, Clone)]
pub struct StatusBar {
    inner: Arc<BarInner>,
}

impl StatusBar {
    pub fn new(label: impl Into<String>, color: BarColor) -> Self {
        Self {
            inner: Arc::new(BarInner {
                label: Mutex::new(label.into()),
                percent: Mutex::new(1.0),
                viewers: Mutex::new(HashSet::new()),
                color,
            }),
        }
    }

    /// Replace the label text atomically.
    pub fn set_label(&self, label: impl Into<String>) {
        *lock(&self.inner.label) = label.into();
    }

    /// Set the fill fraction, clamped to [0.0, 1.0].
    pub fn set_percent(&self, percent: f32) {
        *lock(&self.inner.percent) = percent.clamp(0.0, 1.0);
    }

    /// Subscribe a viewer. Idempotent.
    pub fn add_viewer(&self, player: PlayerId) {
        lock(&self.inner.viewers).insert(player);
    }

    /// Unsubscribe a viewer. Idempotent.
    pub fn remove_viewer(&self, player: PlayerId) {
        lock(&self.inner.viewers).remove(&player);
    }

    pub fn has_viewer(&self, player: PlayerId) -> bool {
        lock(&self.inner.viewers).contains(&player)
    }

    pub fn viewers(&self) -> Vec<PlayerId> {
        lock(&self.inner.viewers).iter().copied().collect()
    }

    pub fn viewer_count(&self) -> usize {
        lock(&self.inner.viewers).len()
    }

    /// Drop every subscription (bar teardown).
    pub fn clear_viewers(&self) {
        lock(&self.inner.viewers).clear();
    }

    pub fn snapshot(&self) -> BarSnapshot {
        BarSnapshot {
            label: lock(&self.inner.label).clone(),
            percent: *lock(&self.inner.percent),
            color: self.inner.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_clamped() {
        let bar = StatusBar::new("hp", BarColor::Purple);
        bar.set_percent(1.7);
        assert_eq!(bar.snapshot().percent, 1.0);
        bar.set_percent(-0.3);
        assert_eq!(bar.snapshot().percent, 0.0);
    }

    #[test]
    fn viewer_set_is_idempotent() {
        let bar = StatusBar::new("hp", BarColor::Purple);
        bar.add_viewer(7);
        bar.add_viewer(7);
        assert_eq!(bar.viewer_count(), 1);

        bar.remove_viewer(7);
        bar.remove_viewer(7);
        assert_eq!(bar.viewer_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let bar = StatusBar::new("hp", BarColor::Red);
        let other = bar.clone();
        other.set_label("flees in 30s");
        assert_eq!(bar.snapshot().label, "flees in 30s");
    }
}
