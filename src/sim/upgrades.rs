//! Upgrade ledger
//!
//! Purchase counts per effect, and the multipliers derived from them. This is
//! a pure function of purchase history: no timers, no randomness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::weapons::WeaponKind;
use crate::error::UpgradeError;

/// Upgrade categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    BulletSpeed,
    FireRate,
    ExtraAmmo,
    MoveSpeed,
    MaxHealth,
    MagnetRange,
    UnlockOrbitBeads,
    UnlockFanSpread,
    UnlockHoming,
}

impl EffectKind {
    pub const ALL: [EffectKind; 9] = [
        EffectKind::BulletSpeed,
        EffectKind::FireRate,
        EffectKind::ExtraAmmo,
        EffectKind::MoveSpeed,
        EffectKind::MaxHealth,
        EffectKind::MagnetRange,
        EffectKind::UnlockOrbitBeads,
        EffectKind::UnlockFanSpread,
        EffectKind::UnlockHoming,
    ];

    /// Experience cost of the first purchase
    pub fn base_cost(&self) -> u32 {
        match self {
            EffectKind::BulletSpeed => 40,
            EffectKind::FireRate => 60,
            EffectKind::ExtraAmmo => 40,
            EffectKind::MoveSpeed => 30,
            EffectKind::MaxHealth => 50,
            EffectKind::MagnetRange => 25,
            EffectKind::UnlockOrbitBeads => 80,
            EffectKind::UnlockFanSpread => 120,
            EffectKind::UnlockHoming => 160,
        }
    }

    /// Purchase cap
    pub fn max_level(&self) -> u32 {
        match self {
            EffectKind::UnlockOrbitBeads
            | EffectKind::UnlockFanSpread
            | EffectKind::UnlockHoming => 1,
            EffectKind::FireRate => 4,
            _ => 5,
        }
    }

    /// Weapon unlocked by this effect, if any
    pub fn unlocks(&self) -> Option<WeaponKind> {
        match self {
            EffectKind::UnlockOrbitBeads => Some(WeaponKind::OrbitBeads),
            EffectKind::UnlockFanSpread => Some(WeaponKind::FanSpread),
            EffectKind::UnlockHoming => Some(WeaponKind::Homing),
            _ => None,
        }
    }
}

/// Bullet speed gain per purchase
const BULLET_SPEED_STEP: f32 = 0.15;
/// Cooldown scale per fire-rate purchase
const FIRE_RATE_STEP: f32 = 0.85;
/// Max ammo added per purchase
const EXTRA_AMMO_STEP: u32 = 25;
const MOVE_SPEED_STEP: f32 = 0.1;
const MAX_HEALTH_STEP: f32 = 20.0;
const MAGNET_RANGE_STEP: f32 = 0.5;
/// Cost growth per level already owned
const COST_GROWTH: f32 = 1.5;

/// Purchase history for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeLedger {
    purchases: BTreeMap<EffectKind, u32>,
}

impl UpgradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times `kind` has been bought
    pub fn count(&self, kind: EffectKind) -> u32 {
        self.purchases.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_maxed(&self, kind: EffectKind) -> bool {
        self.count(kind) >= kind.max_level()
    }

    /// Cost of the next purchase of `kind`
    pub fn scaled_cost(&self, kind: EffectKind) -> u32 {
        let scale = COST_GROWTH.powi(self.count(kind) as i32);
        (kind.base_cost() as f32 * scale).floor() as u32
    }

    /// Effects that can still be bought, in catalogue order
    pub fn eligible(&self) -> Vec<EffectKind> {
        EffectKind::ALL
            .iter()
            .copied()
            .filter(|k| !self.is_maxed(*k))
            .collect()
    }

    /// Record a purchase
    pub fn record(&mut self, kind: EffectKind) -> Result<u32, UpgradeError> {
        if self.is_maxed(kind) {
            return Err(UpgradeError::Maxed(kind));
        }
        let count = self.purchases.entry(kind).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Forget every purchase (new run)
    pub fn reset(&mut self) {
        self.purchases.clear();
    }

    /// Multiplier on every projectile's speed
    pub fn bullet_speed_multiplier(&self) -> f32 {
        1.0 + BULLET_SPEED_STEP * self.count(EffectKind::BulletSpeed) as f32
    }

    /// Multiplier on every weapon's cooldown (below 1 fires faster)
    pub fn fire_rate_multiplier(&self) -> f32 {
        FIRE_RATE_STEP.powi(self.count(EffectKind::FireRate) as i32)
    }

    /// Flat bonus added to every weapon's max ammo
    pub fn extra_ammo(&self) -> u32 {
        EXTRA_AMMO_STEP * self.count(EffectKind::ExtraAmmo)
    }

    /// Multiplier on player movement, consumed by the input layer
    pub fn move_speed_multiplier(&self) -> f32 {
        1.0 + MOVE_SPEED_STEP * self.count(EffectKind::MoveSpeed) as f32
    }

    /// Flat bonus on the player's max health
    pub fn max_health_bonus(&self) -> f32 {
        MAX_HEALTH_STEP * self.count(EffectKind::MaxHealth) as f32
    }

    /// Multiplier on reward-orb magnet range
    pub fn magnet_range_multiplier(&self) -> f32 {
        1.0 + MAGNET_RANGE_STEP * self.count(EffectKind::MagnetRange) as f32
    }

    /// Is a weapon kind available for selection?
    pub fn is_unlocked(&self, weapon: WeaponKind) -> bool {
        match weapon {
            WeaponKind::Direct | WeaponKind::TwinBurst => true,
            other => EffectKind::ALL
                .iter()
                .any(|k| k.unlocks() == Some(other) && self.count(*k) > 0),
        }
    }

    /// Every unlocked weapon kind, in cycling order
    pub fn unlocked_weapons(&self) -> Vec<WeaponKind> {
        WeaponKind::ALL
            .iter()
            .copied()
            .filter(|w| self.is_unlocked(*w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ledger_is_neutral() {
        let ledger = UpgradeLedger::new();
        assert_eq!(ledger.bullet_speed_multiplier(), 1.0);
        assert_eq!(ledger.fire_rate_multiplier(), 1.0);
        assert_eq!(ledger.extra_ammo(), 0);
        assert_eq!(ledger.max_health_bonus(), 0.0);
        assert_eq!(
            ledger.unlocked_weapons(),
            vec![WeaponKind::Direct, WeaponKind::TwinBurst]
        );
    }

    #[test]
    fn test_multipliers_follow_counts() {
        let mut ledger = UpgradeLedger::new();
        ledger.record(EffectKind::BulletSpeed).unwrap();
        ledger.record(EffectKind::BulletSpeed).unwrap();
        ledger.record(EffectKind::FireRate).unwrap();
        ledger.record(EffectKind::ExtraAmmo).unwrap();
        assert!((ledger.bullet_speed_multiplier() - 1.3).abs() < 1e-5);
        assert!((ledger.fire_rate_multiplier() - 0.85).abs() < 1e-5);
        assert_eq!(ledger.extra_ammo(), 25);
    }

    #[test]
    fn test_unlock_is_one_shot() {
        let mut ledger = UpgradeLedger::new();
        assert!(!ledger.is_unlocked(WeaponKind::Homing));
        ledger.record(EffectKind::UnlockHoming).unwrap();
        assert!(ledger.is_unlocked(WeaponKind::Homing));
        assert_eq!(
            ledger.record(EffectKind::UnlockHoming),
            Err(UpgradeError::Maxed(EffectKind::UnlockHoming))
        );
        assert!(!ledger.eligible().contains(&EffectKind::UnlockHoming));
    }

    #[test]
    fn test_cost_scales_with_level() {
        let mut ledger = UpgradeLedger::new();
        assert_eq!(ledger.scaled_cost(EffectKind::BulletSpeed), 40);
        ledger.record(EffectKind::BulletSpeed).unwrap();
        assert_eq!(ledger.scaled_cost(EffectKind::BulletSpeed), 60);
        ledger.record(EffectKind::BulletSpeed).unwrap();
        assert_eq!(ledger.scaled_cost(EffectKind::BulletSpeed), 90);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut ledger = UpgradeLedger::new();
        ledger.record(EffectKind::UnlockFanSpread).unwrap();
        ledger.reset();
        assert_eq!(ledger.count(EffectKind::UnlockFanSpread), 0);
        assert!(!ledger.is_unlocked(WeaponKind::FanSpread));
    }
}
