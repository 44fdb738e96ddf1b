//! Error types
//!
//! The simulation itself is closed and numeric: nothing inside a tick can fail.
//! Errors only surface at the edges - loading configuration and spending
//! experience on upgrades.

use thiserror::Error;

use crate::sim::upgrades::EffectKind;

/// Rejected configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration text was not valid JSON for [`crate::GameConfig`]
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field that must be strictly positive was zero, negative or NaN
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    /// A count that must be at least one was zero
    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },
    /// A weapon costs more ammo per shot than it can ever hold
    #[error("{weapon}: ammo cost {cost} exceeds max ammo {max}")]
    AmmoCostExceedsMax {
        weapon: &'static str,
        cost: u32,
        max: u32,
    },
    /// A fraction-valued field fell outside [0, 1]
    #[error("{field} must lie in [0, 1] (got {value})")]
    OutOfUnitRange { field: &'static str, value: f32 },
}

/// Rejected upgrade purchase
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpgradeError {
    /// The upgrade already reached its purchase cap
    #[error("{0:?} is already at its maximum level")]
    Maxed(EffectKind),
    /// Not enough experience banked
    #[error("{kind:?} costs {cost} experience, only {available} available")]
    InsufficientExperience {
        kind: EffectKind,
        cost: u32,
        available: u32,
    },
}
