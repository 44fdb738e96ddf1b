//! Game tuning
//!
//! Loaded once by whoever embeds the simulation (the native runner reads a
//! JSON file through [`GameConfig::load`]). The tick treats it as an
//! immutable input record. Every field has a default matching the shipped tuning,
//! so partial JSON documents are fine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Playfield dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 1400.0,
            height: 800.0,
        }
    }
}

impl Playfield {
    /// Center of the playfield
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True if `pos` lies outside the playfield grown by `margin` on every side
    pub fn is_outside(&self, pos: glam::Vec2, margin: f32) -> bool {
        pos.x < -margin
            || pos.x > self.width + margin
            || pos.y < -margin
            || pos.y > self.height + margin
    }
}

/// Player tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    /// Seconds of immunity after taking damage
    pub invulnerability_duration: f32,
    /// Damage taken from touching an enemy body
    pub damage_per_collision: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            invulnerability_duration: 1.0,
            damage_per_collision: 10.0,
        }
    }
}

/// Chase enemy tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaseConfig {
    pub collision_radius: f32,
    /// Distance at which the melee swipe triggers
    pub swipe_range: f32,
    /// Seconds between swipes
    pub swipe_cooldown: f32,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            collision_radius: 7.0,
            swipe_range: 42.0,
            swipe_cooldown: 3.0,
        }
    }
}

/// Orbit shooter tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitShooterConfig {
    pub collision_radius: f32,
    /// Desired orbit radius around the player
    pub radius: f32,
    /// Orbit angle advance per tick (radians, before the 1.5x boost)
    pub angular_speed: f32,
    /// Orbit target is clamped this far inside the playfield
    pub target_margin: f32,
    pub shoot_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
}

impl Default for OrbitShooterConfig {
    fn default() -> Self {
        Self {
            collision_radius: 8.0,
            radius: 40.0,
            angular_speed: 0.01,
            target_margin: 30.0,
            shoot_cooldown: 2.0,
            projectile_speed: 3.0,
            projectile_damage: 15.0,
            projectile_lifetime: 5.0,
        }
    }
}

/// Heavy gunner tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeavyGunnerConfig {
    pub speed: f32,
    pub hp: f32,
    /// Body radius, also the collision radius
    pub size: f32,
    /// Preferred standoff distance from the player
    pub optimal_distance: f32,
    pub shoot_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
}

impl Default for HeavyGunnerConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            hp: 150.0,
            size: 30.0,
            optimal_distance: 200.0,
            shoot_cooldown: 1.2,
            projectile_speed: 10.0,
            projectile_damage: 20.0,
            projectile_lifetime: 6.0,
        }
    }
}

/// Dash dodger tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashDodgerConfig {
    pub speed: f32,
    pub hp: f32,
    pub dash_speed: f32,
    pub dash_cooldown: f32,
    pub dash_duration: f32,
    /// Dashes are only considered while the player is this close
    pub detection_radius: f32,
    /// Per-tick chance to start a dash once the cooldown has elapsed
    pub dash_chance: f32,
    pub segment_count: u32,
    /// Radius of each body segment (also the capsule radius between segments)
    pub segment_size: f32,
    pub head_size: f32,
    /// Segments only start easing once their gap exceeds this
    pub segment_spacing: f32,
    /// Fraction of the gap closed per tick
    pub segment_follow: f32,
}

impl Default for DashDodgerConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            hp: 25.0,
            dash_speed: 15.0,
            dash_cooldown: 2.5,
            dash_duration: 0.3,
            detection_radius: 80.0,
            dash_chance: 0.3,
            segment_count: 5,
            segment_size: 8.0,
            head_size: 6.0,
            segment_spacing: 10.0,
            segment_follow: 0.1,
        }
    }
}

/// Shared enemy tuning plus per-pattern blocks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub base: EnemyBaseConfig,
    pub chase: ChaseConfig,
    pub orbit_shooter: OrbitShooterConfig,
    pub heavy_gunner: HeavyGunnerConfig,
    pub dash_dodger: DashDodgerConfig,
}

/// Baseline stats every pattern starts from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyBaseConfig {
    /// Max speed per tick
    pub speed: f32,
    /// Acceleration per tick
    pub acceleration: f32,
    pub hp: f32,
}

impl Default for EnemyBaseConfig {
    fn default() -> Self {
        Self {
            speed: 7.5,
            acceleration: 0.12,
            hp: 50.0,
        }
    }
}

/// Melee swipe effect tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    pub radius: f32,
    /// Reveal + fade window in seconds
    pub duration: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            radius: 42.0,
            duration: 0.3,
        }
    }
}

/// Tunables shared by every weapon kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Max live projectiles
    pub limit: u32,
    /// Projectile speed per tick
    pub speed: f32,
    pub max_ammo: u32,
    /// Ammo regenerated per second
    pub regen_rate: f32,
    pub ammo_cost: u32,
    /// Seconds between shots
    pub cooldown: f32,
    /// Starting projectile alpha
    pub alpha: f32,
    /// Alpha lost per tick
    pub alpha_decay: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            limit: 200,
            speed: 16.0,
            max_ammo: 100,
            regen_rate: 2.0,
            ammo_cost: 1,
            cooldown: 0.05,
            alpha: 1.0,
            alpha_decay: 0.015,
        }
    }
}

/// Twin-burst extras
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwinBurstConfig {
    pub base: WeaponConfig,
    /// Sideways spawn offset, alternating sign each shot
    pub side_offset: f32,
    /// Nominal projectile length
    pub amplitude: f32,
    /// Random reduction applied to each projectile's length
    pub amplitude_jitter: f32,
    pub cycle_max: f32,
    pub cycle_step: f32,
    /// Cycle collapses once firing stops and it sits above this
    pub cycle_idle_threshold: f32,
}

impl Default for TwinBurstConfig {
    fn default() -> Self {
        Self {
            base: WeaponConfig {
                speed: 8.0,
                alpha: 0.7,
                alpha_decay: 0.02,
                ..WeaponConfig::default()
            },
            side_offset: 2.5,
            amplitude: 40.0,
            amplitude_jitter: 10.0,
            cycle_max: 2.0,
            cycle_step: 0.001,
            cycle_idle_threshold: 0.4,
        }
    }
}

/// Orbit-bead extras
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitBeadsConfig {
    pub base: WeaponConfig,
    /// Radius of the circle each bead traces around its travelling center
    pub orbit_radius: f32,
    /// Orbit phase advance per tick (radians)
    pub orbit_speed: f32,
}

impl Default for OrbitBeadsConfig {
    fn default() -> Self {
        Self {
            base: WeaponConfig {
                limit: 50,
                speed: 4.0,
                ammo_cost: 3,
                cooldown: 0.15,
                alpha_decay: 0.01,
                ..WeaponConfig::default()
            },
            orbit_radius: 12.0,
            orbit_speed: 0.25,
        }
    }
}

/// Fan-spread extras
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FanSpreadConfig {
    pub base: WeaponConfig,
    pub projectiles_per_shot: u32,
    /// Total angular spread of one volley (radians)
    pub spread: f32,
    /// Each pellet's speed varies by up to this fraction either way
    pub speed_jitter: f32,
}

impl Default for FanSpreadConfig {
    fn default() -> Self {
        Self {
            base: WeaponConfig {
                limit: 120,
                speed: 12.0,
                ammo_cost: 5,
                cooldown: 0.4,
                alpha_decay: 0.025,
                ..WeaponConfig::default()
            },
            projectiles_per_shot: 5,
            spread: 0.6,
            speed_jitter: 0.1,
        }
    }
}

/// Homing extras
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    pub base: WeaponConfig,
    pub tracking_range: f32,
    /// Fraction of the heading error corrected per tick
    pub tracking_strength: f32,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            base: WeaponConfig {
                limit: 40,
                speed: 9.0,
                max_ammo: 60,
                regen_rate: 1.5,
                ammo_cost: 4,
                cooldown: 0.3,
                alpha_decay: 0.008,
                ..WeaponConfig::default()
            },
            tracking_range: 300.0,
            tracking_strength: 0.08,
        }
    }
}

/// All weapon kinds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponsConfig {
    pub direct: WeaponConfig,
    pub twin_burst: TwinBurstConfig,
    pub orbit_beads: OrbitBeadsConfig,
    pub fan_spread: FanSpreadConfig,
    pub homing: HomingConfig,
}

/// Burst pulse tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Pulse resets once its radius exceeds this
    pub max_radius: f32,
    /// Radius at scale 1
    pub unit_radius: f32,
    /// Alpha when the pulse starts expanding
    pub alpha: f32,
    /// Alpha lost per tick
    pub alpha_decay: f32,
    /// Hard ceiling on an activation, in ticks
    pub decay_ticks: u32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            max_radius: 200.0,
            unit_radius: 1.0,
            alpha: 0.85,
            alpha_decay: 0.06,
            decay_ticks: 100,
        }
    }
}

/// Wave progression tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Enemies in wave 1
    pub base_enemy_count: u32,
    /// Extra enemies per subsequent wave
    pub enemy_scaling: u32,
    /// Seconds between spawns
    pub spawn_delay: f32,
    /// Per-wave geometric hp growth
    pub hp_multiplier: f32,
    /// Per-wave geometric speed growth
    pub speed_multiplier: f32,
    pub points_per_kill: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            base_enemy_count: 3,
            enemy_scaling: 2,
            spawn_delay: 1.5,
            hp_multiplier: 1.2,
            speed_multiplier: 1.1,
            points_per_kill: 10,
        }
    }
}

/// Reward orb tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbConfig {
    /// Drift speed per tick
    pub base_speed: f32,
    pub magnet_range: f32,
    /// Extra speed at zero distance inside the magnet range
    pub magnet_speed: f32,
    pub collection_radius: f32,
    pub value: u32,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.5,
            magnet_range: 100.0,
            magnet_speed: 4.0,
            collection_radius: 20.0,
            value: 5,
        }
    }
}

/// Experience-for-health exchange during rest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthTradeConfig {
    pub experience_cost: u32,
    pub health_gain: f32,
    pub cooldown: f32,
}

impl Default for HealthTradeConfig {
    fn default() -> Self {
        Self {
            experience_cost: 5,
            health_gain: 10.0,
            cooldown: 2.0,
        }
    }
}

/// Complete tuning record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed tick rate
    pub fps: f32,
    pub playfield: Playfield,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub swipe: SwipeConfig,
    pub weapons: WeaponsConfig,
    pub burst: BurstConfig,
    pub waves: WaveConfig,
    pub orbs: OrbConfig,
    pub health_trade: HealthTradeConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: 55.0,
            playfield: Playfield::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            swipe: SwipeConfig::default(),
            weapons: WeaponsConfig::default(),
            burst: BurstConfig::default(),
            waves: WaveConfig::default(),
            orbs: OrbConfig::default(),
            health_trade: HealthTradeConfig::default(),
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // NaN fails this comparison too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn unit_range(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

fn at_least_one(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::ZeroCount { field })
    }
}

impl WeaponConfig {
    fn validate(&self, weapon: &'static str) -> Result<(), ConfigError> {
        at_least_one("weapon.limit", self.limit)?;
        positive("weapon.speed", self.speed)?;
        at_least_one("weapon.max_ammo", self.max_ammo)?;
        non_negative("weapon.regen_rate", self.regen_rate)?;
        at_least_one("weapon.ammo_cost", self.ammo_cost)?;
        if self.ammo_cost > self.max_ammo {
            return Err(ConfigError::AmmoCostExceedsMax {
                weapon,
                cost: self.ammo_cost,
                max: self.max_ammo,
            });
        }
        positive("weapon.cooldown", self.cooldown)?;
        positive("weapon.alpha", self.alpha)?;
        positive("weapon.alpha_decay", self.alpha_decay)?;
        Ok(())
    }
}

impl GameConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serialize to pretty JSON (for writing out a starter file)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fixed timestep implied by the tick rate
    pub fn dt(&self) -> f32 {
        1.0 / self.fps
    }

    /// Reject anything that would make a tick misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fps", self.fps)?;
        positive("playfield.width", self.playfield.width)?;
        positive("playfield.height", self.playfield.height)?;

        positive("player.max_health", self.player.max_health)?;
        non_negative(
            "player.invulnerability_duration",
            self.player.invulnerability_duration,
        )?;
        non_negative("player.damage_per_collision", self.player.damage_per_collision)?;

        let e = &self.enemy;
        positive("enemy.base.speed", e.base.speed)?;
        positive("enemy.base.acceleration", e.base.acceleration)?;
        positive("enemy.base.hp", e.base.hp)?;
        positive("enemy.chase.collision_radius", e.chase.collision_radius)?;
        positive("enemy.chase.swipe_range", e.chase.swipe_range)?;
        positive("enemy.chase.swipe_cooldown", e.chase.swipe_cooldown)?;
        positive("enemy.orbit_shooter.collision_radius", e.orbit_shooter.collision_radius)?;
        positive("enemy.orbit_shooter.radius", e.orbit_shooter.radius)?;
        positive("enemy.orbit_shooter.shoot_cooldown", e.orbit_shooter.shoot_cooldown)?;
        positive("enemy.orbit_shooter.projectile_speed", e.orbit_shooter.projectile_speed)?;
        positive(
            "enemy.orbit_shooter.projectile_lifetime",
            e.orbit_shooter.projectile_lifetime,
        )?;
        positive("enemy.heavy_gunner.speed", e.heavy_gunner.speed)?;
        positive("enemy.heavy_gunner.hp", e.heavy_gunner.hp)?;
        positive("enemy.heavy_gunner.size", e.heavy_gunner.size)?;
        positive("enemy.heavy_gunner.optimal_distance", e.heavy_gunner.optimal_distance)?;
        positive("enemy.heavy_gunner.shoot_cooldown", e.heavy_gunner.shoot_cooldown)?;
        positive("enemy.heavy_gunner.projectile_speed", e.heavy_gunner.projectile_speed)?;
        positive(
            "enemy.heavy_gunner.projectile_lifetime",
            e.heavy_gunner.projectile_lifetime,
        )?;
        positive("enemy.dash_dodger.speed", e.dash_dodger.speed)?;
        positive("enemy.dash_dodger.hp", e.dash_dodger.hp)?;
        positive("enemy.dash_dodger.dash_speed", e.dash_dodger.dash_speed)?;
        positive("enemy.dash_dodger.dash_cooldown", e.dash_dodger.dash_cooldown)?;
        positive("enemy.dash_dodger.dash_duration", e.dash_dodger.dash_duration)?;
        positive("enemy.dash_dodger.detection_radius", e.dash_dodger.detection_radius)?;
        unit_range("enemy.dash_dodger.dash_chance", e.dash_dodger.dash_chance)?;
        at_least_one("enemy.dash_dodger.segment_count", e.dash_dodger.segment_count)?;
        positive("enemy.dash_dodger.segment_size", e.dash_dodger.segment_size)?;
        positive("enemy.dash_dodger.head_size", e.dash_dodger.head_size)?;
        non_negative("enemy.dash_dodger.segment_spacing", e.dash_dodger.segment_spacing)?;
        unit_range("enemy.dash_dodger.segment_follow", e.dash_dodger.segment_follow)?;

        positive("swipe.radius", self.swipe.radius)?;
        positive("swipe.duration", self.swipe.duration)?;

        let w = &self.weapons;
        w.direct.validate("direct")?;
        w.twin_burst.base.validate("twin_burst")?;
        positive("weapons.twin_burst.cycle_step", w.twin_burst.cycle_step)?;
        positive("weapons.twin_burst.cycle_max", w.twin_burst.cycle_max)?;
        w.orbit_beads.base.validate("orbit_beads")?;
        non_negative("weapons.orbit_beads.orbit_radius", w.orbit_beads.orbit_radius)?;
        w.fan_spread.base.validate("fan_spread")?;
        at_least_one(
            "weapons.fan_spread.projectiles_per_shot",
            w.fan_spread.projectiles_per_shot,
        )?;
        non_negative("weapons.fan_spread.spread", w.fan_spread.spread)?;
        unit_range("weapons.fan_spread.speed_jitter", w.fan_spread.speed_jitter)?;
        w.homing.base.validate("homing")?;
        positive("weapons.homing.tracking_range", w.homing.tracking_range)?;
        unit_range("weapons.homing.tracking_strength", w.homing.tracking_strength)?;

        positive("burst.max_radius", self.burst.max_radius)?;
        positive("burst.unit_radius", self.burst.unit_radius)?;
        positive("burst.alpha", self.burst.alpha)?;
        positive("burst.alpha_decay", self.burst.alpha_decay)?;
        at_least_one("burst.decay_ticks", self.burst.decay_ticks)?;

        at_least_one("waves.base_enemy_count", self.waves.base_enemy_count)?;
        positive("waves.spawn_delay", self.waves.spawn_delay)?;
        positive("waves.hp_multiplier", self.waves.hp_multiplier)?;
        positive("waves.speed_multiplier", self.waves.speed_multiplier)?;

        non_negative("orbs.base_speed", self.orbs.base_speed)?;
        non_negative("orbs.magnet_range", self.orbs.magnet_range)?;
        positive("orbs.collection_radius", self.orbs.collection_radius)?;

        positive("health_trade.cooldown", self.health_trade.cooldown)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "fps": 60, "waves": { "spawn_delay": 0.5 } }"#)
            .expect("partial config should parse");
        assert_eq!(config.fps, 60.0);
        assert_eq!(config.waves.spawn_delay, 0.5);
        assert_eq!(config.waves.base_enemy_count, 3);
        assert_eq!(config.weapons.direct.limit, 200);
    }

    #[test]
    fn test_rejects_non_positive_cooldown() {
        let mut config = GameConfig::default();
        config.weapons.homing.base.cooldown = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "weapon.cooldown",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan_spawn_delay() {
        let mut config = GameConfig::default();
        config.waves.spawn_delay = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_ammo_cost_above_max() {
        let mut config = GameConfig::default();
        config.weapons.fan_spread.base.ammo_cost = 500;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::AmmoCostExceedsMax {
                weapon: "fan_spread",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_tuning() {
        let json = GameConfig::default().to_json().expect("serialize");
        let back = GameConfig::from_json(&json).expect("parse");
        assert_eq!(back.enemy.dash_dodger.segment_count, 5);
        assert_eq!(back.weapons.fan_spread.projectiles_per_shot, 5);
    }
}
