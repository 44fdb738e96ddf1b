//! Burst pulse ability
//!
//! A ring that compounds outward from where it was triggered and fades.
//! Trigger latches for one tick, then the pulse expands until it is too big
//! or fully faded.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::BurstConfig;

/// Lifecycle of the pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurstPhase {
    Idle,
    /// Trigger latched; expansion starts next advance
    Triggered,
    Expanding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstAbility {
    pub phase: BurstPhase,
    /// Fixed at the trigger position
    pub center: Vec2,
    pub scale: f32,
    pub alpha: f32,
    /// Ticks left before a forced reset; `None` when not armed
    decay_remaining: Option<u32>,
    config: BurstConfig,
}

impl BurstAbility {
    pub fn new(config: BurstConfig) -> Self {
        Self {
            phase: BurstPhase::Idle,
            center: Vec2::ZERO,
            scale: 1.0,
            alpha: 0.0,
            decay_remaining: None,
            config,
        }
    }

    /// Request a pulse at `pos`
    ///
    /// Ignored unless idle. Returns whether the trigger was accepted.
    pub fn trigger(&mut self, pos: Vec2) -> bool {
        if self.phase != BurstPhase::Idle {
            return false;
        }
        self.phase = BurstPhase::Triggered;
        self.center = pos;
        self.decay_remaining = Some(self.config.decay_ticks);
        log::debug!("Burst triggered at ({:.0}, {:.0})", pos.x, pos.y);
        true
    }

    /// Advance one tick
    pub fn advance(&mut self) {
        if let Some(remaining) = self.decay_remaining {
            match remaining.checked_sub(1) {
                Some(left) => self.decay_remaining = Some(left),
                None => {
                    self.reset();
                    return;
                }
            }
        }

        if self.phase == BurstPhase::Triggered {
            self.phase = BurstPhase::Expanding;
            self.alpha = self.config.alpha;
        }

        if self.phase != BurstPhase::Expanding {
            return;
        }

        // Compounding growth
        self.scale += 0.5 + 0.44 * self.scale;
        self.alpha -= self.config.alpha_decay;

        if self.radius() > self.config.max_radius || self.alpha <= 0.0 {
            self.reset();
        }
    }

    pub fn is_expanding(&self) -> bool {
        self.phase == BurstPhase::Expanding
    }

    /// Current collision radius (zero unless expanding)
    pub fn radius(&self) -> f32 {
        if self.is_expanding() {
            self.config.unit_radius * self.scale
        } else {
            0.0
        }
    }

    /// Strict overlap against a circle
    pub fn hits_circle(&self, pos: Vec2, radius: f32) -> bool {
        self.is_expanding() && pos.distance(self.center) < self.radius() + radius
    }

    fn reset(&mut self) {
        self.phase = BurstPhase::Idle;
        self.scale = 1.0;
        self.alpha = 0.0;
        self.decay_remaining = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn burst() -> BurstAbility {
        BurstAbility::new(BurstConfig::default())
    }

    #[test]
    fn test_trigger_latches_one_tick() {
        let mut b = burst();
        assert!(b.trigger(Vec2::new(100.0, 100.0)));
        assert_eq!(b.phase, BurstPhase::Triggered);
        assert_eq!(b.radius(), 0.0);
        b.advance();
        assert!(b.is_expanding());
        assert!((b.scale - 2.94).abs() < 1e-4);
        assert!((b.alpha - 0.79).abs() < 1e-4);
    }

    #[test]
    fn test_retrigger_ignored_while_active() {
        let mut b = burst();
        b.trigger(Vec2::ZERO);
        b.advance();
        assert!(!b.trigger(Vec2::new(50.0, 50.0)));
        assert_eq!(b.center, Vec2::ZERO);
    }

    #[test]
    fn test_growth_compounds() {
        let mut b = burst();
        b.trigger(Vec2::ZERO);
        b.advance();
        let first = b.scale;
        b.advance();
        let second = b.scale;
        b.advance();
        let third = b.scale;
        assert!(third - second > second - first);
    }

    #[test]
    fn test_pulse_ends_and_can_fire_again() {
        let mut b = burst();
        b.trigger(Vec2::ZERO);
        let mut ticks = 0;
        loop {
            b.advance();
            ticks += 1;
            if !b.is_expanding() {
                break;
            }
            assert!(ticks < 100, "pulse never ended");
        }
        assert_eq!(b.phase, BurstPhase::Idle);
        assert_eq!(b.scale, 1.0);
        assert!(b.trigger(Vec2::ZERO));
    }

    #[test]
    fn test_hits_circle_only_while_expanding() {
        let mut b = burst();
        assert!(!b.hits_circle(Vec2::ZERO, 100.0));
        b.trigger(Vec2::ZERO);
        assert!(!b.hits_circle(Vec2::ZERO, 100.0));
        b.advance();
        // radius 2.94 + probe 7
        assert!(b.hits_circle(Vec2::new(9.0, 0.0), 7.0));
        assert!(!b.hits_circle(Vec2::new(10.0, 0.0), 7.0));
    }

    #[test]
    fn test_decay_ceiling_forces_reset() {
        let config = BurstConfig {
            decay_ticks: 2,
            alpha_decay: 0.0001,
            max_radius: 1.0e9,
            ..BurstConfig::default()
        };
        let mut b = BurstAbility::new(config);
        b.trigger(Vec2::ZERO);
        b.advance();
        b.advance();
        assert!(b.is_expanding());
        b.advance();
        assert_eq!(b.phase, BurstPhase::Idle);
    }
}
