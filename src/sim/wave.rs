//! Wave progression
//!
//! `Preparation -> Active -> Rest -> (trigger) countdown -> Preparation`.
//! Rest never times out on its own; the next wave only starts after an
//! explicit trigger and a fixed countdown.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::AttackPattern;
use crate::config::{GameConfig, Playfield, WaveConfig};
use crate::consts::{SPAWN_OFFSET, WAVE_COUNTDOWN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveState {
    Preparation,
    Active,
    Rest,
    /// Reserved; normal play never reaches it
    Complete,
}

/// One-shot spawn request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawnInfo {
    pub pos: Vec2,
    pub hp: f32,
    /// Max speed per tick
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub number: u32,
    pub total_enemies: u32,
    pub enemies_remaining: u32,
    pub enemies_spawned: u32,
    pub state: WaveState,
}

impl Wave {
    fn new(number: u32, config: &WaveConfig) -> Self {
        let total = config.base_enemy_count + (number - 1) * config.enemy_scaling;
        Self {
            number,
            total_enemies: total,
            enemies_remaining: total,
            enemies_spawned: 0,
            state: WaveState::Preparation,
        }
    }
}

/// What the director wants the caller to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveSignal {
    /// Wave `n` just went active
    Started(u32),
    Spawn(EnemySpawnInfo),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveDirector {
    pub wave: Wave,
    /// Seconds until the next spawn
    pub spawn_timer: f32,
    /// Seconds left on the manual-trigger countdown
    pub countdown: Option<f32>,
    config: WaveConfig,
    playfield: Playfield,
    base_hp: f32,
    base_speed: f32,
}

impl WaveDirector {
    /// Director parked in wave 1 preparation
    pub fn new(config: &GameConfig) -> Self {
        Self {
            wave: Wave::new(1, &config.waves),
            spawn_timer: 0.0,
            countdown: None,
            config: config.waves.clone(),
            playfield: config.playfield,
            base_hp: config.enemy.base.hp,
            base_speed: config.enemy.base.speed,
        }
    }

    pub fn state(&self) -> WaveState {
        self.wave.state
    }

    /// Advance by `dt` seconds
    pub fn advance<R: Rng>(&mut self, dt: f32, rng: &mut R) -> Option<WaveSignal> {
        match self.wave.state {
            WaveState::Preparation => {
                self.wave.state = WaveState::Active;
                self.spawn_timer = 0.0;
                log::info!(
                    "Wave {} started ({} enemies)",
                    self.wave.number,
                    self.wave.total_enemies
                );
                Some(WaveSignal::Started(self.wave.number))
            }
            WaveState::Active => {
                if self.wave.enemies_spawned >= self.wave.total_enemies {
                    return None;
                }
                self.spawn_timer -= dt;
                if self.spawn_timer > 0.0 {
                    return None;
                }
                self.spawn_timer = self.config.spawn_delay;
                self.wave.enemies_spawned += 1;
                Some(WaveSignal::Spawn(self.spawn_info(rng)))
            }
            WaveState::Rest => {
                let remaining = self.countdown? - dt;
                if remaining > 0.0 {
                    self.countdown = Some(remaining);
                    return None;
                }
                self.countdown = None;
                self.wave = Wave::new(self.wave.number + 1, &self.config);
                None
            }
            WaveState::Complete => None,
        }
    }

    /// Record a kill; returns true if it cleared the wave
    ///
    /// Kills beyond the number of enemies spawned so far are ignored.
    pub fn on_enemy_killed(&mut self) -> bool {
        if self.wave.state != WaveState::Active {
            return false;
        }
        let killed = self.wave.total_enemies.saturating_sub(self.wave.enemies_remaining);
        if killed >= self.wave.enemies_spawned {
            log::warn!(
                "Ignoring kill in wave {}: only {} enemies spawned",
                self.wave.number,
                self.wave.enemies_spawned
            );
            return false;
        }
        self.wave.enemies_remaining -= 1;
        if self.wave.enemies_remaining > 0 {
            return false;
        }
        self.wave.state = WaveState::Rest;
        log::info!("Wave {} complete", self.wave.number);
        true
    }

    /// Start the countdown to the next wave
    ///
    /// Only valid while resting; a running countdown is left alone.
    pub fn trigger_start(&mut self) -> bool {
        if self.wave.state != WaveState::Rest || self.countdown.is_some() {
            return false;
        }
        self.countdown = Some(WAVE_COUNTDOWN);
        log::info!("Wave {} countdown started", self.wave.number + 1);
        true
    }

    /// Geometric difficulty scaling for wave `number`
    pub fn scaled_stats(&self, number: u32) -> (f32, f32) {
        let exp = (number.max(1) - 1) as i32;
        let hp = (self.base_hp * self.config.hp_multiplier.powi(exp)).floor();
        let speed = self.base_speed * self.config.speed_multiplier.powi(exp);
        (hp, speed)
    }

    fn spawn_info<R: Rng>(&self, rng: &mut R) -> EnemySpawnInfo {
        let (hp, speed) = self.scaled_stats(self.wave.number);
        EnemySpawnInfo {
            pos: edge_spawn_point(&self.playfield, rng),
            hp,
            speed,
        }
    }
}

/// Random point just outside one of the four edges
pub fn edge_spawn_point<R: Rng>(playfield: &Playfield, rng: &mut R) -> Vec2 {
    let (w, h) = (playfield.width, playfield.height);
    match rng.random_range(0..4) {
        0 => Vec2::new(rng.random::<f32>() * w, -SPAWN_OFFSET),
        1 => Vec2::new(w + SPAWN_OFFSET, rng.random::<f32>() * h),
        2 => Vec2::new(rng.random::<f32>() * w, h + SPAWN_OFFSET),
        _ => Vec2::new(-SPAWN_OFFSET, rng.random::<f32>() * h),
    }
}

/// Pick an attack pattern for a spawn in `wave`
///
/// `roll(p)` answers "did a check with probability `p` succeed?". Checks run
/// in precedence order and the first success wins.
pub fn assign_attack_pattern(wave: u32, mut roll: impl FnMut(f32) -> bool) -> AttackPattern {
    let n = wave as f32;
    if wave >= 4 && roll((0.15 + 0.05 * (n - 4.0)).min(0.30)) {
        return AttackPattern::DashDodger;
    }
    if wave >= 5 && roll((0.20 + 0.05 * (n - 5.0)).min(0.40)) {
        return AttackPattern::HeavyGunner;
    }
    if wave >= 3 && roll((0.30 + 0.10 * (n - 3.0)).min(0.60)) {
        return AttackPattern::OrbitShooter;
    }
    AttackPattern::Chase
}

/// [`assign_attack_pattern`] driven by `rng`
pub fn roll_attack_pattern<R: Rng>(wave: u32, rng: &mut R) -> AttackPattern {
    assign_attack_pattern(wave, |p| rng.random::<f32>() < p)
}
