//! Roster loading
//!
//! Load boss roster definitions from TOML files. A roster directory may hold
//! any number of files; their `[[boss]]` entries are concatenated.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{BossDefinition, RosterConfig};

/// Errors during roster loading
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse roster TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read roster directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load boss definitions from a single TOML file.
pub fn load_roster_from_file(path: &Path) -> Result<Vec<BossDefinition>, RosterError> {
    let content = fs::read_to_string(path).map_err(|source| RosterError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let config: RosterConfig =
        toml::from_str(&content).map_err(|source| RosterError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(config.bosses)
}

/// Load all boss definitions from a directory (non-recursive).
///
/// A missing directory yields an empty roster rather than an error, so a
/// fresh install starts clean.
pub fn load_roster_from_dir(dir: &Path) -> Result<Vec<BossDefinition>, RosterError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| RosterError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut bosses = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "toml") {
            bosses.extend(load_roster_from_file(&path)?);
        }
    }

    Ok(bosses)
}
