//! Player weapons
//!
//! Every weapon kind owns its ammo record and its live projectile list. All
//! kinds advance every tick (ammo keeps regenerating, projectiles keep
//! flying); only the selected kind fires.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::upgrades::UpgradeLedger;
use crate::config::{Playfield, WeaponConfig, WeaponsConfig};
use crate::consts::WEAPON_CULL_MARGIN;
use crate::{angle_delta, direction_or, polar_to_cartesian};

/// Weapon kinds, in cycling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Single fast bolt along the aim line
    Direct,
    /// Slower wide bolts, alternating left/right of the aim line
    TwinBurst,
    /// Beads that trace small circles as they travel
    OrbitBeads,
    /// Several pellets fanned around the aim line
    FanSpread,
    /// Bolts that steer toward the nearest enemy
    Homing,
}

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::Direct,
        WeaponKind::TwinBurst,
        WeaponKind::OrbitBeads,
        WeaponKind::FanSpread,
        WeaponKind::Homing,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Ammo with a fractional regeneration accumulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoState {
    pub current: u32,
    pub max: u32,
    /// Banked fractional regeneration (ammo units, always < 1 after a tick)
    pub regen_timer: f32,
}

impl AmmoState {
    /// Full ammo
    pub fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            regen_timer: 0.0,
        }
    }

    /// Bank `elapsed * rate` and pay out whole units, keeping the remainder
    ///
    /// Returns the ammo actually gained. Nothing accrues while full.
    pub fn regenerate(&mut self, elapsed: f32, rate: f32) -> u32 {
        if self.current >= self.max {
            return 0;
        }
        self.regen_timer += elapsed * rate;
        if self.regen_timer < 1.0 {
            return 0;
        }
        let whole = self.regen_timer.floor();
        self.regen_timer -= whole;
        let before = self.current;
        self.current = self.current.saturating_add(whole as u32).min(self.max);
        self.current - before
    }

    /// Spend `cost` if affordable
    pub fn try_spend(&mut self, cost: u32) -> bool {
        if self.current < cost {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Change the capacity; growth is credited to the current count
    pub fn set_max(&mut self, new_max: u32) {
        if new_max > self.max {
            self.current = self.current.saturating_add(new_max - self.max);
        }
        self.max = new_max;
        self.current = self.current.min(self.max);
    }

    /// Fill level in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

/// Circular path a bead traces around its travelling center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitPath {
    pub center: Vec2,
    pub phase: f32,
    pub radius: f32,
}

/// A live player projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProjectile {
    pub pos: Vec2,
    /// Velocity per tick
    pub vel: Vec2,
    /// Heading in radians
    pub rotation: f32,
    /// Doubles as remaining lifetime; culled at or below zero
    pub alpha: f32,
    /// Twin-burst bolt length
    pub amplitude: Option<f32>,
    pub homing: bool,
    pub orbit: Option<OrbitPath>,
}

impl WeaponProjectile {
    fn new(pos: Vec2, vel: Vec2, alpha: f32) -> Self {
        Self {
            pos,
            vel,
            rotation: vel.y.atan2(vel.x),
            alpha,
            amplitude: None,
            homing: false,
            orbit: None,
        }
    }

    /// Alive until it fades out
    pub fn is_live(&self) -> bool {
        self.alpha > 0.0
    }
}

/// Per-tick inputs shared by every weapon
#[derive(Debug, Clone, Copy)]
pub struct FireContext<'a> {
    pub dt: f32,
    pub player_pos: Vec2,
    pub aim_pos: Vec2,
    /// Candidate homing targets (enemy positions)
    pub targets: &'a [Vec2],
    pub bullet_speed_multiplier: f32,
    pub fire_rate_multiplier: f32,
    pub playfield: Playfield,
}

/// Kind-specific tunables and state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WeaponExtras {
    Direct,
    TwinBurst {
        side_offset: f32,
        amplitude: f32,
        amplitude_jitter: f32,
        cycle_max: f32,
        cycle_step: f32,
        cycle_idle_threshold: f32,
        /// Side of the next shot (+1 / -1)
        flip: f32,
        /// Width-scale oscillator shared by all bolts
        cycle: f32,
        cycle_down: bool,
    },
    OrbitBeads {
        orbit_radius: f32,
        orbit_speed: f32,
    },
    FanSpread {
        projectiles_per_shot: u32,
        spread: f32,
        speed_jitter: f32,
    },
    Homing {
        tracking_range: f32,
        tracking_strength: f32,
    },
}

/// One weapon slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub stats: WeaponConfig,
    pub extras: WeaponExtras,
    pub ammo: AmmoState,
    pub projectiles: Vec<WeaponProjectile>,
    pub firing: bool,
    /// Seconds since the last shot
    pub since_last_shot: f32,
    /// Total volleys fired
    pub shots_fired: u64,
}

impl Weapon {
    pub fn new(kind: WeaponKind, config: &WeaponsConfig) -> Self {
        let (stats, extras) = match kind {
            WeaponKind::Direct => (config.direct.clone(), WeaponExtras::Direct),
            WeaponKind::TwinBurst => {
                let c = &config.twin_burst;
                (
                    c.base.clone(),
                    WeaponExtras::TwinBurst {
                        side_offset: c.side_offset,
                        amplitude: c.amplitude,
                        amplitude_jitter: c.amplitude_jitter,
                        cycle_max: c.cycle_max,
                        cycle_step: c.cycle_step,
                        cycle_idle_threshold: c.cycle_idle_threshold,
                        flip: 1.0,
                        cycle: 0.0,
                        cycle_down: false,
                    },
                )
            }
            WeaponKind::OrbitBeads => {
                let c = &config.orbit_beads;
                (
                    c.base.clone(),
                    WeaponExtras::OrbitBeads {
                        orbit_radius: c.orbit_radius,
                        orbit_speed: c.orbit_speed,
                    },
                )
            }
            WeaponKind::FanSpread => {
                let c = &config.fan_spread;
                (
                    c.base.clone(),
                    WeaponExtras::FanSpread {
                        projectiles_per_shot: c.projectiles_per_shot,
                        spread: c.spread,
                        speed_jitter: c.speed_jitter,
                    },
                )
            }
            WeaponKind::Homing => {
                let c = &config.homing;
                (
                    c.base.clone(),
                    WeaponExtras::Homing {
                        tracking_range: c.tracking_range,
                        tracking_strength: c.tracking_strength,
                    },
                )
            }
        };
        Self {
            kind,
            ammo: AmmoState::new(stats.max_ammo),
            stats,
            extras,
            projectiles: Vec::new(),
            firing: false,
            since_last_shot: f32::MAX,
            shots_fired: 0,
        }
    }

    /// Firing gate: ammo, cooldown (scaled by fire rate) and live-projectile cap
    pub fn can_fire(&self, fire_rate_multiplier: f32) -> bool {
        self.ammo.current >= self.stats.ammo_cost
            && self.since_last_shot >= self.stats.cooldown * fire_rate_multiplier
            && self.projectiles.len() < self.stats.limit as usize
    }

    /// Width scale of twin-burst bolts (1.0 for other kinds)
    pub fn width_scale(&self) -> f32 {
        match self.extras {
            WeaponExtras::TwinBurst { cycle, flip, .. } => cycle * flip,
            _ => 1.0,
        }
    }

    /// Advance one tick: regenerate, maybe fire, move projectiles, cull
    pub fn advance<R: Rng>(&mut self, ctx: &FireContext, rng: &mut R) {
        self.ammo.regenerate(ctx.dt, self.stats.regen_rate);
        if self.since_last_shot < f32::MAX {
            self.since_last_shot += ctx.dt;
        }

        if self.firing && self.can_fire(ctx.fire_rate_multiplier) {
            self.fire(ctx, rng);
        }

        self.update_cycle();
        self.move_projectiles(ctx);

        let playfield = ctx.playfield;
        self.projectiles
            .retain(|p| p.is_live() && !playfield.is_outside(p.pos, WEAPON_CULL_MARGIN));
    }

    /// Spawn one volley and pay for it
    fn fire<R: Rng>(&mut self, ctx: &FireContext, rng: &mut R) {
        let dir = direction_or(ctx.player_pos, ctx.aim_pos, Vec2::NEG_Y);
        let speed = self.stats.speed * ctx.bullet_speed_multiplier;
        let alpha = self.stats.alpha;

        match &mut self.extras {
            WeaponExtras::Direct => {
                self.projectiles
                    .push(WeaponProjectile::new(ctx.player_pos, dir * speed, alpha));
            }
            WeaponExtras::TwinBurst {
                side_offset,
                amplitude,
                amplitude_jitter,
                flip,
                ..
            } => {
                let length = *amplitude - rng.random::<f32>() * *amplitude_jitter;
                let pos = ctx.player_pos + dir.perp() * *side_offset * *flip;
                let mut p = WeaponProjectile::new(pos, dir * speed, alpha);
                p.amplitude = Some(length);
                self.projectiles.push(p);
                *flip = -*flip;
            }
            WeaponExtras::OrbitBeads {
                orbit_radius,
                orbit_speed: _,
            } => {
                let phase = 0.0;
                let mut p = WeaponProjectile::new(
                    ctx.player_pos + polar_to_cartesian(*orbit_radius, phase),
                    dir * speed,
                    alpha,
                );
                p.orbit = Some(OrbitPath {
                    center: ctx.player_pos,
                    phase,
                    radius: *orbit_radius,
                });
                self.projectiles.push(p);
            }
            WeaponExtras::FanSpread {
                projectiles_per_shot,
                spread,
                speed_jitter,
            } => {
                let aim = dir.y.atan2(dir.x);
                for angle in fan_angles(aim, *spread, *projectiles_per_shot) {
                    let jitter = if *speed_jitter > 0.0 {
                        rng.random_range(-*speed_jitter..=*speed_jitter)
                    } else {
                        0.0
                    };
                    let vel = polar_to_cartesian(speed * (1.0 + jitter), angle);
                    self.projectiles
                        .push(WeaponProjectile::new(ctx.player_pos, vel, alpha));
                }
            }
            WeaponExtras::Homing { .. } => {
                let mut p = WeaponProjectile::new(ctx.player_pos, dir * speed, alpha);
                p.homing = true;
                self.projectiles.push(p);
            }
        }

        self.ammo.current = self.ammo.current.saturating_sub(self.stats.ammo_cost);
        self.since_last_shot = 0.0;
        self.shots_fired += 1;
    }

    /// Twin-burst width oscillator: ramps up while firing, collapses when idle
    fn update_cycle(&mut self) {
        let firing = self.firing;
        if let WeaponExtras::TwinBurst {
            cycle,
            cycle_down,
            cycle_max,
            cycle_step,
            cycle_idle_threshold,
            ..
        } = &mut self.extras
        {
            if *cycle < *cycle_max && !*cycle_down {
                *cycle += *cycle_step;
            } else {
                *cycle_down = true;
            }
            if *cycle_down && *cycle > 0.0 {
                *cycle -= *cycle_step;
            }
            if *cycle <= 0.0 {
                *cycle_down = false;
            }
            if !firing && *cycle > *cycle_idle_threshold {
                *cycle_down = true;
                *cycle -= *cycle_step;
            }
        }
    }

    fn move_projectiles(&mut self, ctx: &FireContext) {
        let decay = self.stats.alpha_decay;
        match self.extras {
            WeaponExtras::Homing {
                tracking_range,
                tracking_strength,
            } => {
                for p in &mut self.projectiles {
                    steer_toward_nearest(p, ctx.targets, tracking_range, tracking_strength);
                    p.pos += p.vel;
                    p.alpha -= decay;
                }
            }
            WeaponExtras::OrbitBeads { orbit_speed, .. } => {
                for p in &mut self.projectiles {
                    if let Some(orbit) = &mut p.orbit {
                        orbit.center += p.vel;
                        orbit.phase += orbit_speed;
                        p.pos = orbit.center + polar_to_cartesian(orbit.radius, orbit.phase);
                    } else {
                        p.pos += p.vel;
                    }
                    p.alpha -= decay;
                }
            }
            _ => {
                for p in &mut self.projectiles {
                    p.pos += p.vel;
                    p.alpha -= decay;
                }
            }
        }
    }
}

/// Evenly spaced headings across `spread`, centered on `aim`
pub fn fan_angles(aim: f32, spread: f32, count: u32) -> Vec<f32> {
    if count <= 1 {
        return vec![aim];
    }
    let step = spread / (count - 1) as f32;
    let first = aim - spread / 2.0;
    (0..count).map(|i| first + step * i as f32).collect()
}

/// Rotate a projectile's heading part-way toward the nearest target in range
///
/// Speed magnitude is preserved. With no target in range it flies straight.
pub fn steer_toward_nearest(
    projectile: &mut WeaponProjectile,
    targets: &[Vec2],
    range: f32,
    strength: f32,
) {
    let nearest = targets
        .iter()
        .map(|t| (*t, t.distance_squared(projectile.pos)))
        .filter(|(_, d2)| *d2 <= range * range)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let Some((target, _)) = nearest else {
        return;
    };
    let to_target = target - projectile.pos;
    if to_target.length_squared() < 1e-6 {
        return;
    }
    let speed = projectile.vel.length();
    let heading = projectile.vel.y.atan2(projectile.vel.x);
    let bearing = to_target.y.atan2(to_target.x);
    let new_heading = heading + angle_delta(heading, bearing) * strength;
    projectile.vel = polar_to_cartesian(speed, new_heading);
    projectile.rotation = new_heading;
}

/// Every weapon slot plus the current selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arsenal {
    pub weapons: Vec<Weapon>,
    pub active: WeaponKind,
    /// Base max ammo per kind before upgrades
    base_max_ammo: Vec<u32>,
}

impl Arsenal {
    pub fn new(config: &WeaponsConfig) -> Self {
        let weapons: Vec<Weapon> = WeaponKind::ALL
            .iter()
            .map(|k| Weapon::new(*k, config))
            .collect();
        let base_max_ammo = weapons.iter().map(|w| w.stats.max_ammo).collect();
        Self {
            weapons,
            active: WeaponKind::Direct,
            base_max_ammo,
        }
    }

    pub fn weapon(&self, kind: WeaponKind) -> &Weapon {
        &self.weapons[kind.index()]
    }

    pub fn weapon_mut(&mut self, kind: WeaponKind) -> &mut Weapon {
        &mut self.weapons[kind.index()]
    }

    pub fn active_weapon(&self) -> &Weapon {
        self.weapon(self.active)
    }

    /// Start or stop firing the selected weapon
    pub fn set_firing(&mut self, firing: bool) {
        let active = self.active;
        for w in &mut self.weapons {
            w.firing = firing && w.kind == active;
        }
    }

    /// Select the next unlocked kind after the current one
    pub fn cycle(&mut self, ledger: &UpgradeLedger) -> WeaponKind {
        let unlocked = ledger.unlocked_weapons();
        let next = unlocked
            .iter()
            .copied()
            .find(|k| *k > self.active)
            .or_else(|| unlocked.first().copied())
            .unwrap_or(WeaponKind::Direct);
        let was_firing = self.active_weapon().firing;
        self.active = next;
        self.set_firing(was_firing);
        next
    }

    /// Apply the ledger's extra-ammo bonus to every kind at once
    pub fn apply_upgrades(&mut self, ledger: &UpgradeLedger) {
        let bonus = ledger.extra_ammo();
        for (w, base) in self.weapons.iter_mut().zip(&self.base_max_ammo) {
            w.ammo.set_max(base + bonus);
        }
    }

    /// Advance every weapon one tick
    pub fn advance<R: Rng>(&mut self, ctx: &FireContext, rng: &mut R) {
        for w in &mut self.weapons {
            w.advance(ctx, rng);
        }
    }

    /// Total live projectiles across kinds
    pub fn live_projectiles(&self) -> usize {
        self.weapons.iter().map(|w| w.projectiles.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::upgrades::EffectKind;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 55.0;

    fn ctx(targets: &[Vec2]) -> FireContext<'_> {
        FireContext {
            dt: DT,
            player_pos: Vec2::new(700.0, 400.0),
            aim_pos: Vec2::new(900.0, 400.0),
            targets,
            bullet_speed_multiplier: 1.0,
            fire_rate_multiplier: 1.0,
            playfield: Playfield::default(),
        }
    }

    #[test]
    fn test_regen_keeps_fraction() {
        let mut ammo = AmmoState::new(100);
        ammo.current = 10;
        assert_eq!(ammo.regenerate(0.3, 2.0), 0);
        assert!((ammo.regen_timer - 0.6).abs() < 1e-5);
        assert_eq!(ammo.regenerate(0.3, 2.0), 1);
        assert!((ammo.regen_timer - 0.2).abs() < 1e-5);
        assert_eq!(ammo.current, 11);
    }

    #[test]
    fn test_regen_caps_at_max() {
        let mut ammo = AmmoState::new(10);
        ammo.current = 9;
        assert_eq!(ammo.regenerate(5.0, 2.0), 1);
        assert_eq!(ammo.current, 10);
        assert_eq!(ammo.regenerate(5.0, 2.0), 0);
    }

    proptest! {
        // Steps are multiples of 1/64 s so every partial sum is exact in f32
        #[test]
        fn prop_regen_independent_of_chunking(
            steps in proptest::collection::vec(1u32..40, 1..60),
            rate in 1u32..6,
        ) {
            let mut ammo = AmmoState { current: 0, max: 1_000_000, regen_timer: 0.0 };
            let mut gained = 0u32;
            let mut total_sixty_fourths = 0u32;
            for s in &steps {
                gained += ammo.regenerate(*s as f32 / 64.0, rate as f32);
                total_sixty_fourths += s;
            }
            prop_assert_eq!(gained, total_sixty_fourths * rate / 64);
            prop_assert!(ammo.regen_timer >= 0.0 && ammo.regen_timer < 1.0);
        }
    }

    #[test]
    fn test_set_max_credits_growth_and_clamps() {
        let mut ammo = AmmoState::new(100);
        ammo.current = 40;
        ammo.set_max(125);
        assert_eq!((ammo.current, ammo.max), (65, 125));
        ammo.set_max(50);
        assert_eq!((ammo.current, ammo.max), (50, 50));
    }

    #[test]
    fn test_gate_respects_cooldown_and_ammo() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = Weapon::new(WeaponKind::Direct, &config.weapons);
        w.firing = true;
        w.advance(&ctx(&[]), &mut rng);
        assert_eq!(w.shots_fired, 1);
        assert_eq!(w.ammo.current, 99);
        // 0.05 s cooldown at 55 Hz: the next shot waits three ticks
        w.advance(&ctx(&[]), &mut rng);
        w.advance(&ctx(&[]), &mut rng);
        assert_eq!(w.shots_fired, 1);
        w.advance(&ctx(&[]), &mut rng);
        assert_eq!(w.shots_fired, 2);

        w.ammo.current = 0;
        for _ in 0..5 {
            w.advance(&ctx(&[]), &mut rng);
        }
        assert_eq!(w.shots_fired, 2);
    }

    #[test]
    fn test_gate_respects_limit() {
        let mut config = GameConfig::default();
        config.weapons.direct.limit = 1;
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = Weapon::new(WeaponKind::Direct, &config.weapons);
        w.firing = true;
        for _ in 0..10 {
            w.advance(&ctx(&[]), &mut rng);
        }
        assert_eq!(w.shots_fired, 1);
        assert_eq!(w.projectiles.len(), 1);
    }

    #[test]
    fn test_direct_projectile_flies_and_fades() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = Weapon::new(WeaponKind::Direct, &config.weapons);
        w.firing = true;
        w.advance(&ctx(&[]), &mut rng);
        let p = &w.projectiles[0];
        assert!((p.pos.x - 716.0).abs() < 1e-3);
        assert!((p.alpha - 0.985).abs() < 1e-5);
    }

    #[test]
    fn test_projectiles_culled_outside_playfield() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = Weapon::new(WeaponKind::Direct, &config.weapons);
        w.projectiles
            .push(WeaponProjectile::new(Vec2::new(1405.0, 400.0), Vec2::new(16.0, 0.0), 1.0));
        w.advance(&ctx(&[]), &mut rng);
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_twin_burst_alternates_sides() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut w = Weapon::new(WeaponKind::TwinBurst, &config.weapons);
        w.firing = true;
        for _ in 0..4 {
            w.advance(&ctx(&[]), &mut rng);
        }
        assert_eq!(w.projectiles.len(), 2);
        // Aim is +x, so the side offset shows up in y
        let a = w.projectiles[0].pos.y - 400.0;
        let b = w.projectiles[1].pos.y - 400.0;
        assert!(a * b < 0.0);
        let amp = w.projectiles[0].amplitude.unwrap();
        assert!((30.0..=40.0).contains(&amp));
    }

    #[test]
    fn test_twin_burst_cycle_rises_while_firing() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut w = Weapon::new(WeaponKind::TwinBurst, &config.weapons);
        w.firing = true;
        for _ in 0..10 {
            w.advance(&ctx(&[]), &mut rng);
        }
        assert!(w.width_scale().abs() > 0.0);
    }

    #[test]
    fn test_fan_angles_even_and_centered() {
        let angles = fan_angles(1.0, 0.6, 5);
        assert_eq!(angles.len(), 5);
        assert!((angles[0] - 0.7).abs() < 1e-5);
        assert!((angles[2] - 1.0).abs() < 1e-5);
        assert!((angles[4] - 1.3).abs() < 1e-5);
        assert_eq!(fan_angles(0.2, 0.6, 1), vec![0.2]);
    }

    #[test]
    fn test_fan_spread_speed_jitter_bounded() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut w = Weapon::new(WeaponKind::FanSpread, &config.weapons);
        w.firing = true;
        w.advance(&ctx(&[]), &mut rng);
        assert_eq!(w.projectiles.len(), 5);
        assert_eq!(w.ammo.current, 95);
        for p in &w.projectiles {
            let speed = p.vel.length();
            assert!(speed >= 12.0 * 0.9 - 1e-3 && speed <= 12.0 * 1.1 + 1e-3);
        }
    }

    #[test]
    fn test_homing_turns_partially_and_keeps_speed() {
        let mut p = WeaponProjectile::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0);
        p.homing = true;
        // Target straight "down" (+y) at 90 degrees
        steer_toward_nearest(&mut p, &[Vec2::new(0.0, 100.0)], 300.0, 0.1);
        let heading = p.vel.y.atan2(p.vel.x);
        assert!((heading - std::f32::consts::FRAC_PI_2 * 0.1).abs() < 1e-4);
        assert!((p.vel.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_homing_picks_nearest_and_ignores_out_of_range() {
        let mut p = WeaponProjectile::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 1.0);
        steer_toward_nearest(&mut p, &[Vec2::new(0.0, 500.0)], 300.0, 0.5);
        assert_eq!(p.vel, Vec2::new(10.0, 0.0));

        steer_toward_nearest(
            &mut p,
            &[Vec2::new(0.0, -200.0), Vec2::new(0.0, 50.0)],
            300.0,
            0.5,
        );
        assert!(p.vel.y > 0.0);
    }

    #[test]
    fn test_homing_wraps_across_pi() {
        // Heading just under +π, target just past -π: the short way is a small turn
        let mut p =
            WeaponProjectile::new(Vec2::ZERO, polar_to_cartesian(10.0, 3.0), 1.0);
        steer_toward_nearest(&mut p, &[polar_to_cartesian(100.0, -3.0)], 300.0, 1.0);
        let heading = p.vel.y.atan2(p.vel.x);
        assert!((heading - (-3.0)).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_beads_circle_their_center() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = Weapon::new(WeaponKind::OrbitBeads, &config.weapons);
        w.firing = true;
        w.advance(&ctx(&[]), &mut rng);
        let p = &w.projectiles[0];
        let orbit = p.orbit.unwrap();
        assert!((p.pos.distance(orbit.center) - 12.0).abs() < 1e-3);
        assert!((orbit.center.x - 704.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_length_aim_falls_back() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut w = Weapon::new(WeaponKind::Direct, &config.weapons);
        w.firing = true;
        let mut c = ctx(&[]);
        c.aim_pos = c.player_pos;
        w.advance(&c, &mut rng);
        let p = &w.projectiles[0];
        assert!(p.vel.x.is_finite() && p.vel.y.is_finite());
        assert!(p.vel.y < 0.0);
    }

    #[test]
    fn test_arsenal_upgrades_apply_to_all_kinds() {
        let config = GameConfig::default();
        let mut arsenal = Arsenal::new(&config.weapons);
        let mut ledger = UpgradeLedger::new();
        ledger.record(EffectKind::ExtraAmmo).unwrap();
        arsenal.apply_upgrades(&ledger);
        for w in &arsenal.weapons {
            assert_eq!(w.ammo.max, w.stats.max_ammo + 25);
            assert_eq!(w.ammo.current, w.ammo.max);
        }
    }

    #[test]
    fn test_arsenal_cycle_skips_locked() {
        let config = GameConfig::default();
        let mut arsenal = Arsenal::new(&config.weapons);
        let mut ledger = UpgradeLedger::new();
        assert_eq!(arsenal.cycle(&ledger), WeaponKind::TwinBurst);
        assert_eq!(arsenal.cycle(&ledger), WeaponKind::Direct);
        ledger.record(EffectKind::UnlockHoming).unwrap();
        arsenal.cycle(&ledger);
        assert_eq!(arsenal.cycle(&ledger), WeaponKind::Homing);
    }

    #[test]
    fn test_only_active_weapon_fires() {
        let config = GameConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut arsenal = Arsenal::new(&config.weapons);
        arsenal.set_firing(true);
        arsenal.advance(&ctx(&[]), &mut rng);
        assert_eq!(arsenal.weapon(WeaponKind::Direct).shots_fired, 1);
        assert_eq!(arsenal.weapon(WeaponKind::TwinBurst).shots_fired, 0);
    }
}
