//! Engine settings
//!
//! Read-only to the engine at runtime. Persisted with confy the way the
//! application config works: a single TOML file in the platform config
//! directory, loaded once at startup.

use serde::{Deserialize, Serialize};

use crate::serde_defaults::default_true;

/// General raid settings.
///
/// Every field has a serde default so configs written by older versions
/// keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidSettings {
    /// Most raids allowed to be live at once (scheduled spawns only).
    pub max_active_raids: usize,

    /// Seconds between automatic spawn attempts. 0 disables the scheduler.
    pub spawn_interval_secs: u64,

    /// When true, the boss bar is shown only to players who have battled
    /// the boss; proximity auto-subscription is disabled.
    pub after_battle_only: bool,

    /// Radius of the proximity visibility query.
    pub proximity_radius: f64,

    // ─── Label templates ────────────────────────────────────────────────
    /// Boss bar title. Placeholders: `{species}`, `{time}`.
    pub boss_bar_title: String,

    /// Broadcast when a boss reaches its despawn horizon. `{species}`.
    pub despawn_message: String,

    /// Broadcast lines on a scheduled spawn. `{species}`, `{coords}`.
    pub spawn_message: Vec<String>,

    /// Anticipation bar title. `{species}`, `{time}`.
    pub anticipation_title: String,

    /// Flee bar title. `{species}`, `{time}`.
    pub flee_title: String,

    // ─── Reward sequence timing ─────────────────────────────────────────
    /// Countdown before a reward actor materializes.
    pub anticipation_secs: u64,

    /// How long a reward actor waits before fleeing.
    pub flee_secs: u64,

    /// Period of the ambient particle pulse during anticipation.
    pub pulse_interval_ms: u64,
}

impl Default for RaidSettings {
    fn default() -> Self {
        Self {
            max_active_raids: 1,
            spawn_interval_secs: 30,
            after_battle_only: default_true(),
            proximity_radius: 150.0,
            boss_bar_title: "{species} | Despawns in: {time}".to_string(),
            despawn_message: "{species} has despawned!".to_string(),
            spawn_message: vec![
                "A new Raid Boss has appeared!".to_string(),
                "A wild {species} has spawned at {coords}.".to_string(),
            ],
            anticipation_title: "Prepare to catch {species} in {time}s...".to_string(),
            flee_title: "{species} flees in {time}s".to_string(),
            anticipation_secs: 15,
            flee_secs: 30,
            pulse_interval_ms: 500,
        }
    }
}

/// Extension trait for settings persistence.
pub trait RaidSettingsExt {
    fn load() -> Self;
    fn save(self);
}

impl RaidSettingsExt for RaidSettings {
    fn load() -> Self {
        confy::load("incursion", "config").unwrap_or_default()
    }

    fn save(self) {
        if let Err(err) = confy::store("incursion", "config", self) {
            tracing::error!("failed to save configuration: {err}");
        }
    }
}

/// Substitute `{key}` placeholders in a label template.
///
/// Unknown placeholders are left in place so a typo in a config file is
/// visible rather than silently blanked.
pub fn format_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in substitutions {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Render a duration in seconds as `MM:SS`.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitutes_all_placeholders() {
        let line = format_template(
            "A wild {species} has spawned at {coords}.",
            &[("species", "Charizard"), ("coords", "0, 64, 0")],
        );
        assert_eq!(line, "A wild Charizard has spawned at 0, 64, 0.");
    }

    #[test]
    fn template_leaves_unknown_placeholders() {
        assert_eq!(format_template("{specees}", &[("species", "x")]), "{specees}");
    }

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(1800), "30:00");
        assert_eq!(format_clock(3661), "61:01");
    }
}
