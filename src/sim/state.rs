//! Combat state
//!
//! Everything one run needs, owned in one place and passed explicitly to the
//! tick. Nothing in the simulation reaches for global state.

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::burst::BurstAbility;
use super::enemy::{AttackPattern, Enemy};
use super::events::GameEvent;
use super::orbs::ExperienceOrb;
use super::player::Player;
use super::upgrades::{EffectKind, UpgradeLedger};
use super::wave::{EnemySpawnInfo, WaveDirector, WaveState};
use super::weapons::Arsenal;
use crate::config::GameConfig;
use crate::error::{ConfigError, UpgradeError};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Player died; ticks are no-ops from here on
    GameOver,
}

fn unseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete run state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: GameConfig,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Live enemies, in spawn (id) order
    pub enemies: Vec<Enemy>,
    pub arsenal: Arsenal,
    pub burst: BurstAbility,
    pub waves: WaveDirector,
    pub orbs: Vec<ExperienceOrb>,
    pub upgrades: UpgradeLedger,
    /// Spendable experience
    pub experience: u32,
    pub score: u64,
    pub kills: u32,
    /// Seconds until health can be traded again
    pub health_trade_cooldown: f32,
    /// Events waiting to be dispatched at the end of the next tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip, default = "unseeded_rng")]
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl CombatState {
    /// New run with the player at the playfield center
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let center = config.playfield.center();
        Ok(Self {
            seed,
            phase: GamePhase::Playing,
            time_ticks: 0,
            player: Player::new(&config.player, center),
            enemies: Vec::new(),
            arsenal: Arsenal::new(&config.weapons),
            burst: BurstAbility::new(config.burst.clone()),
            waves: WaveDirector::new(&config),
            orbs: Vec::new(),
            upgrades: UpgradeLedger::new(),
            experience: 0,
            score: 0,
            kills: 0,
            health_trade_cooldown: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            config,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an enemy for a spawn request; returns its id
    pub fn spawn_enemy(&mut self, info: &EnemySpawnInfo, pattern: AttackPattern) -> u32 {
        let id = self.next_entity_id();
        let enemy = Enemy::spawn(id, info, pattern, &self.config, &mut self.rng);
        log::debug!(
            "Spawned enemy {} ({:?}) at ({:.0}, {:.0}) hp {:.0}",
            id,
            pattern,
            info.pos.x,
            info.pos.y,
            enemy.hp
        );
        self.enemies.push(enemy);
        id
    }

    pub fn enemy_positions(&self) -> Vec<Vec2> {
        self.enemies.iter().map(|e| e.pos).collect()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Random selection of purchasable upgrades for the rest-phase shop
    pub fn upgrade_offers(&mut self, count: usize) -> Vec<EffectKind> {
        let mut pool = self.upgrades.eligible();
        pool.shuffle(&mut self.rng);
        pool.truncate(count);
        pool
    }

    /// Spend experience on an upgrade and apply it immediately
    ///
    /// Returns the new purchase level.
    pub fn purchase_upgrade(&mut self, kind: EffectKind) -> Result<u32, UpgradeError> {
        if self.upgrades.is_maxed(kind) {
            log::warn!("Rejected purchase of {:?}: already maxed", kind);
            return Err(UpgradeError::Maxed(kind));
        }
        let cost = self.upgrades.scaled_cost(kind);
        if self.experience < cost {
            log::warn!(
                "Rejected purchase of {:?}: costs {}, have {}",
                kind,
                cost,
                self.experience
            );
            return Err(UpgradeError::InsufficientExperience {
                kind,
                cost,
                available: self.experience,
            });
        }
        let level = self.upgrades.record(kind)?;
        self.experience -= cost;
        self.apply_upgrades();
        log::info!("Purchased {:?} level {} for {} xp", kind, level, cost);
        self.events.push(GameEvent::UpgradePurchased { kind, level });
        Ok(level)
    }

    /// Push ledger-derived stats into the weapons and the player
    pub fn apply_upgrades(&mut self) {
        self.arsenal.apply_upgrades(&self.upgrades);
        let max = self.config.player.max_health + self.upgrades.max_health_bonus();
        if (max - self.player.max_health).abs() > f32::EPSILON {
            self.player.set_max_health(max);
        }
    }

    /// Exchange experience for health while resting
    ///
    /// Returns the health gained (zero when the trade is not allowed).
    pub fn trade_health(&mut self) -> f32 {
        let trade = &self.config.health_trade;
        if self.waves.state() != WaveState::Rest
            || self.health_trade_cooldown > 0.0
            || self.experience < trade.experience_cost
            || self.player.health >= self.player.max_health
        {
            return 0.0;
        }
        self.experience -= trade.experience_cost;
        self.health_trade_cooldown = trade.cooldown;
        let gained = self.player.heal(trade.health_gain);
        log::debug!("Traded {} xp for {:.0} health", trade.experience_cost, gained);
        self.events.push(GameEvent::HealthTraded { gained });
        gained
    }
}
