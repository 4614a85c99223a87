//! Common serde default value functions
//!
//! Used across settings and boss roster definitions to avoid duplication.

/// Default for enabled/visibility flags
pub fn default_true() -> bool {
    true
}

/// Default visual scale for spawned actors
pub fn default_scale() -> f32 {
    1.0
}

/// Default spawn weight for roster entries
pub fn default_weight() -> f64 {
    1.0
}
