//! Boss roster
//!
//! This module provides:
//! - **Definitions**: weighted boss templates loaded from TOML
//! - **Loader**: roster file/directory loading
//! - **Selection**: cumulative-weight sampling for scheduled spawns

mod definition;
mod loader;
mod select;


pub use definition::{BossDefinition, RosterConfig, SpawnPoint};
pub use loader::{RosterError, load_roster_from_dir, load_roster_from_file};
pub use select::{SelectError, pick_definition, pick_spawn_point};
