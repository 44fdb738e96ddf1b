//! Experience orbs dropped by destroyed enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::OrbConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceOrb {
    pub pos: Vec2,
    pub value: u32,
}

impl ExperienceOrb {
    pub fn new(pos: Vec2, value: u32) -> Self {
        Self { pos, value }
    }

    /// Drift toward the player, faster inside the magnet range
    ///
    /// Returns true once close enough to be collected.
    pub fn advance(&mut self, player_pos: Vec2, magnet_range: f32, config: &OrbConfig) -> bool {
        let to_player = player_pos - self.pos;
        let distance = to_player.length();
        if distance < config.collection_radius {
            return true;
        }
        let mut speed = config.base_speed;
        if distance < magnet_range {
            speed += config.magnet_speed * (1.0 - distance / magnet_range);
        }
        if let Some(dir) = to_player.try_normalize() {
            self.pos += dir * speed;
        }
        self.pos.distance(player_pos) < config.collection_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drifts_slowly_outside_magnet() {
        let config = OrbConfig::default();
        let mut orb = ExperienceOrb::new(Vec2::new(0.0, 0.0), 5);
        assert!(!orb.advance(Vec2::new(500.0, 0.0), 100.0, &config));
        assert!((orb.pos.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_magnet_speeds_up_when_close() {
        let config = OrbConfig::default();
        let mut orb = ExperienceOrb::new(Vec2::new(0.0, 0.0), 5);
        // Half-way into the magnet range: 0.5 + 4 * 0.5
        orb.advance(Vec2::new(50.0, 0.0), 100.0, &config);
        assert!((orb.pos.x - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_collected_within_radius() {
        let config = OrbConfig::default();
        let mut orb = ExperienceOrb::new(Vec2::new(0.0, 0.0), 5);
        assert!(orb.advance(Vec2::new(15.0, 0.0), 100.0, &config));
    }

    #[test]
    fn test_reaches_player_eventually() {
        let config = OrbConfig::default();
        let mut orb = ExperienceOrb::new(Vec2::new(0.0, 0.0), 5);
        let mut collected = false;
        for _ in 0..200 {
            if orb.advance(Vec2::new(90.0, 0.0), 100.0, &config) {
                collected = true;
                break;
            }
        }
        assert!(collected);
    }
}
