//! Melee swipe
//!
//! A half-circle sector in front of the attacker that reveals from one edge
//! to the other over a short window. Only the revealed part can hit.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{AngularRange, Sector};
use crate::config::SwipeConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeleeSwipeAttack {
    pub active: bool,
    /// Seconds since trigger
    pub elapsed: f32,
    /// 0..=1, non-decreasing while active
    pub reveal_progress: f32,
    /// Bearing from attacker to target at trigger time
    pub angle: f32,
    /// +1 reveals clockwise from the start edge, -1 from the end edge
    pub reveal_direction: f32,
    /// Attacker position; follows the attacker while active
    pub origin: Vec2,
    /// One hit per activation
    pub hit_registered: bool,
    radius: f32,
    duration: f32,
}

impl MeleeSwipeAttack {
    pub fn new(config: &SwipeConfig) -> Self {
        Self {
            active: false,
            elapsed: 0.0,
            reveal_progress: 0.0,
            angle: 0.0,
            reveal_direction: 1.0,
            origin: Vec2::ZERO,
            hit_registered: false,
            radius: config.radius,
            duration: config.duration,
        }
    }

    /// Start a swipe from `origin` toward `target`; no-op while active
    pub fn trigger(&mut self, origin: Vec2, target: Vec2) -> bool {
        if self.active {
            return false;
        }
        let d = target - origin;
        self.active = true;
        self.elapsed = 0.0;
        self.reveal_progress = 0.0;
        self.origin = origin;
        self.angle = d.y.atan2(d.x);
        self.reveal_direction = if d.x >= 0.0 { 1.0 } else { -1.0 };
        self.hit_registered = false;
        true
    }

    /// Keep the sector anchored on a moving attacker
    pub fn follow(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Advance by `dt` seconds
    ///
    /// The tick that crosses the window end shows the full reveal; the swipe
    /// deactivates on the following tick.
    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        if self.reveal_progress >= 1.0 {
            self.reset();
            return;
        }
        self.elapsed += dt;
        self.reveal_progress = (self.elapsed / self.duration).min(1.0);
    }

    /// Live for collision purposes
    pub fn is_active(&self) -> bool {
        self.active && self.reveal_progress > 0.0
    }

    /// Visual fade, 1 at trigger down to 0 at the window end
    pub fn alpha(&self) -> f32 {
        if self.active {
            1.0 - self.reveal_progress
        } else {
            0.0
        }
    }

    /// The currently revealed sub-range of the half circle
    pub fn revealed_range(&self) -> AngularRange {
        let start = self.angle - FRAC_PI_2;
        let end = self.angle + FRAC_PI_2;
        let swept = PI * self.reveal_progress;
        if self.reveal_direction > 0.0 {
            AngularRange::new(start, start + swept)
        } else {
            AngularRange::new(end - swept, end)
        }
    }

    /// Sector test against a circle, ignoring the one-hit guard
    pub fn overlaps(&self, pos: Vec2, radius: f32) -> bool {
        if !self.is_active() {
            return false;
        }
        let sector = Sector {
            center: self.origin,
            radius: self.radius,
            range: self.revealed_range(),
        };
        sector.contains_circle(pos, radius)
    }

    /// Register a hit on `pos` if the sector covers it and none landed yet
    pub fn try_hit(&mut self, pos: Vec2, radius: f32) -> bool {
        if self.hit_registered || !self.overlaps(pos, radius) {
            return false;
        }
        self.hit_registered = true;
        true
    }

    fn reset(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
        self.reveal_progress = 0.0;
        self.hit_registered = false;
    }
}
