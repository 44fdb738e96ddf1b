//! Wave Combat - a wave-based arcade combat simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (waves, enemies, weapons, collisions)
//! - `config`: Data-driven tuning, loaded once by the embedding layer
//! - `error`: Configuration and purchase errors

pub mod config;
pub mod error;
pub mod sim;

pub use config::GameConfig;
pub use error::{ConfigError, UpgradeError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (55 Hz)
    pub const SIM_DT: f32 = 1.0 / 55.0;

    /// Player collision radius
    pub const PLAYER_RADIUS: f32 = 14.0;
    /// Extra slack added to player/enemy contact checks
    pub const CONTACT_BUFFER: f32 = 5.0;
    /// Enemy projectile collision radius
    pub const ENEMY_PROJECTILE_RADIUS: f32 = 4.0;
    /// Enemy projectiles hit when their center is this close to the player
    pub const ENEMY_PROJECTILE_HIT_DISTANCE: f32 = PLAYER_RADIUS + ENEMY_PROJECTILE_RADIUS;

    /// Weapon projectile collision radius
    pub const WEAPON_PROJECTILE_RADIUS: f32 = 3.0;
    /// Slack added to weapon projectile hits
    pub const WEAPON_HIT_BUFFER: f32 = 2.0;

    /// Damage dealt by each weapon projectile hit
    pub const WEAPON_PROJECTILE_DAMAGE: f32 = 10.0;
    /// Damage dealt by the burst pulse per tick of overlap
    pub const BURST_DAMAGE: f32 = 25.0;
    /// Damage dealt by a melee swipe
    pub const SWIPE_DAMAGE: f32 = 15.0;

    /// Boundary repulsion starts this far from each edge
    pub const BOUNDARY_MARGIN: f32 = 50.0;
    /// Strength of boundary repulsion at full penetration
    pub const BOUNDARY_FORCE: f32 = 0.3;
    /// Enemies spawn this far outside the playfield
    pub const SPAWN_OFFSET: f32 = 50.0;

    /// Weapon projectiles are culled this far outside the playfield
    pub const WEAPON_CULL_MARGIN: f32 = 10.0;
    /// Enemy projectiles are culled this far outside the playfield
    pub const ENEMY_PROJECTILE_CULL_MARGIN: f32 = 50.0;

    /// Countdown between the wave trigger and the next wave (seconds)
    pub const WAVE_COUNTDOWN: f32 = 3.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed shortest rotation from `from` to `to`, in (-π, π]
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let d = normalize_angle(to - from);
    if d == -std::f32::consts::PI {
        std::f32::consts::PI
    } else {
        d
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Unit direction from `from` to `to`, or `fallback` when the points coincide
#[inline]
pub fn direction_or(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    (to - from).try_normalize().unwrap_or(fallback)
}
