//! Outbound notifications
//!
//! Every tick records what happened as [`GameEvent`]s. Once the tick has
//! fully resolved they are replayed into a [`CombatHooks`] implementation
//! (screen shake, sounds, UI popups live on the other side of it).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::AttackPattern;
use super::upgrades::EffectKind;
use super::wave::EnemySpawnInfo;
use super::weapons::WeaponKind;

/// Who took damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTarget {
    Player,
    Enemy(u32),
}

/// What dealt it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    /// Body contact with an enemy
    Contact,
    Swipe,
    EnemyProjectile,
    Burst,
    Weapon(WeaponKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Damage {
    pub target: DamageTarget,
    pub amount: f32,
    pub source: DamageSource,
}

/// A destroyed enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kill {
    pub enemy_id: u32,
    pub pattern: AttackPattern,
    /// Where it died (reward orbs spawn here)
    pub pos: Vec2,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted(u32),
    WaveCompleted(u32),
    /// Countdown to wave `n` began
    WaveCountdown(u32),
    EnemySpawned {
        id: u32,
        pattern: AttackPattern,
        info: EnemySpawnInfo,
    },
    EnemyKilled(Kill),
    Damage(Damage),
    BurstTriggered(Vec2),
    WeaponSelected(WeaponKind),
    ExperienceCollected(u32),
    UpgradePurchased {
        kind: EffectKind,
        level: u32,
    },
    HealthTraded {
        gained: f32,
    },
    PlayerDied,
}

/// Receiver for combat notifications; every method defaults to a no-op
pub trait CombatHooks {
    fn wave_started(&mut self, _number: u32) {}
    fn wave_completed(&mut self, _number: u32) {}
    fn enemy_spawned(&mut self, _info: &EnemySpawnInfo, _pattern: AttackPattern) {}
    fn enemy_killed(&mut self, _kill: &Kill) {}
    fn damage_applied(&mut self, _damage: &Damage) {}
    fn player_died(&mut self) {}
    /// Catch-all, called for every event after the specific method
    fn event(&mut self, _event: &GameEvent) {}
}

/// Hooks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl CombatHooks for NoHooks {}

/// Hooks that keep every event
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kills(&self) -> impl Iterator<Item = &Kill> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::EnemyKilled(k) => Some(k),
            _ => None,
        })
    }

    pub fn damage(&self) -> impl Iterator<Item = &Damage> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Damage(d) => Some(d),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl CombatHooks for EventLog {
    fn event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

impl GameEvent {
    /// Route this event to the matching hook method
    pub fn dispatch(&self, hooks: &mut dyn CombatHooks) {
        match self {
            GameEvent::WaveStarted(n) => hooks.wave_started(*n),
            GameEvent::WaveCompleted(n) => hooks.wave_completed(*n),
            GameEvent::EnemySpawned { pattern, info, .. } => hooks.enemy_spawned(info, *pattern),
            GameEvent::EnemyKilled(kill) => hooks.enemy_killed(kill),
            GameEvent::Damage(damage) => hooks.damage_applied(damage),
            GameEvent::PlayerDied => hooks.player_died(),
            _ => {}
        }
        hooks.event(self);
    }
}
