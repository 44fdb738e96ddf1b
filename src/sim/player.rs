//! Player health
//!
//! Position is owned by the input layer and copied in each tick; the core
//! only tracks health and the post-hit invulnerability window.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Seconds of immunity left
    pub invulnerable_for: f32,
    invulnerability_duration: f32,
}

impl Player {
    pub fn new(config: &PlayerConfig, pos: Vec2) -> Self {
        Self {
            pos,
            health: config.max_health,
            max_health: config.max_health,
            invulnerable_for: 0.0,
            invulnerability_duration: config.invulnerability_duration,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.invulnerable_for = (self.invulnerable_for - dt).max(0.0);
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Apply damage unless immune; returns whether it landed
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_invulnerable() || self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.invulnerable_for = self.invulnerability_duration;
        true
    }

    /// Restore up to `amount`; returns the health actually gained
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Change max health, keeping the current fraction
    pub fn set_max_health(&mut self, max_health: f32) {
        if max_health <= 0.0 {
            return;
        }
        let fraction = self.health_fraction();
        self.max_health = max_health;
        self.health = (max_health * fraction).min(max_health);
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }
}
