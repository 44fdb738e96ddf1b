//! Enemy behavior
//!
//! One [`Enemy`] per live combatant. The attack pattern is a tagged variant
//! carrying its own sub-state; every pattern shares the same kinematics:
//! pattern steering, then boundary repulsion, then position integration.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Capsule, circles_overlap};
use super::swipe::MeleeSwipeAttack;
use super::wave::EnemySpawnInfo;
use crate::config::{EnemyConfig, GameConfig, Playfield};
use crate::consts::{BOUNDARY_FORCE, BOUNDARY_MARGIN, ENEMY_PROJECTILE_CULL_MARGIN};
use crate::{direction_or, polar_to_cartesian};

/// Orbit shooters lead their shots by this long (seconds)
const LEAD_TIME: f32 = 0.5;

/// Behavioral variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPattern {
    Chase,
    OrbitShooter,
    HeavyGunner,
    DashDodger,
}

/// Dash dodger movement mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DashState {
    Approaching,
    Dashing { remaining: f32 },
}

/// Pattern-specific sub-state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PatternState {
    Chase {
        swipe: MeleeSwipeAttack,
        /// Seconds until the next swipe is allowed
        swipe_cooldown: f32,
    },
    OrbitShooter {
        circle_angle: f32,
        shot_cooldown: f32,
    },
    HeavyGunner {
        shot_cooldown: f32,
    },
    DashDodger {
        dash: DashState,
        dash_cooldown: f32,
        /// Body segments, nearest the head first
        segments: Vec<Vec2>,
        head_size: f32,
        segment_size: f32,
    },
}

/// Something notable an enemy did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyAction {
    Fired,
    Swiped,
    Dashed,
}

/// Shot fired by an enemy; owned by (and dies with) its shooter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyProjectile {
    pub pos: Vec2,
    /// Velocity per tick
    pub vel: Vec2,
    pub damage: f32,
    /// Seconds alive
    pub lifetime: f32,
    pub max_lifetime: f32,
}

impl EnemyProjectile {
    /// Aimed shot from `from` toward `target`
    pub fn aimed(from: Vec2, target: Vec2, speed: f32, damage: f32, max_lifetime: f32) -> Self {
        Self {
            pos: from,
            vel: direction_or(from, target, Vec2::X) * speed,
            damage,
            lifetime: 0.0,
            max_lifetime,
        }
    }

    /// Move one tick; returns false once expired or far off-field
    pub fn advance(&mut self, dt: f32, playfield: &Playfield) -> bool {
        self.lifetime += dt;
        self.pos += self.vel;
        self.lifetime < self.max_lifetime
            && !playfield.is_outside(self.pos, ENEMY_PROJECTILE_CULL_MARGIN)
    }
}

/// Per-tick inputs for enemy steering
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub dt: f32,
    pub player_pos: Vec2,
    pub playfield: Playfield,
    pub config: &'a EnemyConfig,
}

/// Soft push away from edges, proportional to penetration into the margin
///
/// Zero everywhere at least `BOUNDARY_MARGIN` inside the playfield.
pub fn boundary_force(pos: Vec2, playfield: &Playfield) -> Vec2 {
    let margin = BOUNDARY_MARGIN;
    let mut force = Vec2::ZERO;

    if pos.x < margin {
        force.x += BOUNDARY_FORCE * (margin - pos.x) / margin;
    }
    if pos.x > playfield.width - margin {
        force.x -= BOUNDARY_FORCE * (pos.x - (playfield.width - margin)) / margin;
    }
    if pos.y < margin {
        force.y += BOUNDARY_FORCE * (margin - pos.y) / margin;
    }
    if pos.y > playfield.height - margin {
        force.y -= BOUNDARY_FORCE * (pos.y - (playfield.height - margin)) / margin;
    }
    force
}

/// Scale `vel` down to `max` if it is faster
fn clamp_speed(vel: Vec2, max: f32) -> Vec2 {
    vel.clamp_length_max(max)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    /// Velocity per tick
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Max speed per tick
    pub speed: f32,
    pub acceleration: f32,
    /// Facing in radians
    pub angle: f32,
    /// Body radius for circle tests
    pub radius: f32,
    pub state: PatternState,
    pub projectiles: Vec<EnemyProjectile>,
}

impl Enemy {
    /// Build an enemy from a spawn request
    ///
    /// Heavy gunners and dash dodgers keep their pattern identity by scaling
    /// the wave's hp/speed with their own base-stat ratio.
    pub fn spawn<R: Rng>(
        id: u32,
        info: &EnemySpawnInfo,
        pattern: AttackPattern,
        config: &GameConfig,
        rng: &mut R,
    ) -> Self {
        let e = &config.enemy;
        let (hp, speed, radius, state) = match pattern {
            AttackPattern::Chase => (
                info.hp,
                info.speed,
                e.chase.collision_radius,
                PatternState::Chase {
                    swipe: MeleeSwipeAttack::new(&config.swipe),
                    swipe_cooldown: 0.0,
                },
            ),
            AttackPattern::OrbitShooter => (
                info.hp,
                info.speed,
                e.orbit_shooter.collision_radius,
                PatternState::OrbitShooter {
                    circle_angle: rng.random::<f32>() * TAU,
                    shot_cooldown: 0.0,
                },
            ),
            AttackPattern::HeavyGunner => (
                info.hp * e.heavy_gunner.hp / e.base.hp,
                info.speed * e.heavy_gunner.speed / e.base.speed,
                e.heavy_gunner.size,
                PatternState::HeavyGunner { shot_cooldown: 0.0 },
            ),
            AttackPattern::DashDodger => {
                let d = &e.dash_dodger;
                (
                    info.hp * d.hp / e.base.hp,
                    info.speed * d.speed / e.base.speed,
                    d.head_size,
                    PatternState::DashDodger {
                        dash: DashState::Approaching,
                        dash_cooldown: d.dash_cooldown,
                        segments: vec![info.pos; d.segment_count as usize],
                        head_size: d.head_size,
                        segment_size: d.segment_size,
                    },
                )
            }
        };

        Self {
            id,
            pos: info.pos,
            vel: Vec2::ZERO,
            hp,
            max_hp: hp,
            speed,
            acceleration: e.base.acceleration,
            angle: 0.0,
            radius,
            state,
            projectiles: Vec::new(),
        }
    }

    pub fn pattern(&self) -> AttackPattern {
        match self.state {
            PatternState::Chase { .. } => AttackPattern::Chase,
            PatternState::OrbitShooter { .. } => AttackPattern::OrbitShooter,
            PatternState::HeavyGunner { .. } => AttackPattern::HeavyGunner,
            PatternState::DashDodger { .. } => AttackPattern::DashDodger,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Apply damage, saturating at zero
    ///
    /// Returns true only on the hit that kills.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        !self.is_alive()
    }

    /// Active melee swipe, if this enemy has one
    pub fn swipe_mut(&mut self) -> Option<&mut MeleeSwipeAttack> {
        match &mut self.state {
            PatternState::Chase { swipe, .. } => Some(swipe),
            _ => None,
        }
    }

    pub fn swipe(&self) -> Option<&MeleeSwipeAttack> {
        match &self.state {
            PatternState::Chase { swipe, .. } => Some(swipe),
            _ => None,
        }
    }

    /// Body segments (empty for single-body patterns)
    pub fn segments(&self) -> &[Vec2] {
        match &self.state {
            PatternState::DashDodger { segments, .. } => segments,
            _ => &[],
        }
    }

    /// Does a circle at `point` with `radius` touch this enemy's body?
    ///
    /// Segmented bodies test the head, every segment, and the capsule
    /// spanning each adjacent pair.
    pub fn hit_test(&self, point: Vec2, radius: f32) -> bool {
        match &self.state {
            PatternState::DashDodger {
                segments,
                head_size,
                segment_size,
                ..
            } => {
                if circles_overlap(self.pos, *head_size, point, radius) {
                    return true;
                }
                if segments
                    .iter()
                    .any(|s| circles_overlap(*s, *segment_size, point, radius))
                {
                    return true;
                }
                std::iter::once(&self.pos)
                    .chain(segments.iter())
                    .zip(segments.iter())
                    .any(|(a, b)| Capsule::new(*a, *b, *segment_size).overlaps_circle(point, radius))
            }
            _ => circles_overlap(self.pos, self.radius, point, radius),
        }
    }

    /// Advance steering, attacks and owned projectiles by one tick
    pub fn advance<R: Rng>(&mut self, ctx: &EnemyContext, rng: &mut R) -> Option<EnemyAction> {
        let player = ctx.player_pos;
        let to_player = player - self.pos;
        let distance = to_player.length();
        let dir = direction_or(self.pos, player, Vec2::ZERO);
        let c = ctx.config;
        let mut action = None;

        match &mut self.state {
            PatternState::Chase {
                swipe,
                swipe_cooldown,
            } => {
                self.vel += dir * self.acceleration * 1.5;
                self.vel += boundary_force(self.pos, &ctx.playfield);
                self.vel = clamp_speed(self.vel, self.speed);
                if self.vel != Vec2::ZERO {
                    self.angle = self.vel.y.atan2(self.vel.x);
                }
                self.pos += self.vel;

                swipe.follow(self.pos);
                swipe.advance(ctx.dt);
                *swipe_cooldown -= ctx.dt;
                if *swipe_cooldown <= 0.0
                    && (player - self.pos).length() < c.chase.swipe_range
                    && swipe.trigger(self.pos, player)
                {
                    *swipe_cooldown = c.chase.swipe_cooldown;
                    action = Some(EnemyAction::Swiped);
                }
            }
            PatternState::OrbitShooter {
                circle_angle,
                shot_cooldown,
            } => {
                let o = &c.orbit_shooter;
                *circle_angle += o.angular_speed * 1.5;
                let desired = player + polar_to_cartesian(o.radius, *circle_angle);
                let target = desired.clamp(
                    Vec2::splat(o.target_margin),
                    Vec2::new(
                        ctx.playfield.width - o.target_margin,
                        ctx.playfield.height - o.target_margin,
                    ),
                );
                if let Some(toward) = (target - self.pos).try_normalize() {
                    self.vel = toward * self.speed * 0.9;
                }
                self.vel += boundary_force(self.pos, &ctx.playfield);
                self.angle = to_player.y.atan2(to_player.x);
                self.pos += self.vel;

                *shot_cooldown -= ctx.dt;
                if *shot_cooldown <= 0.0 {
                    // Player velocity is not tracked, so the lead is zero
                    let aim = player + Vec2::ZERO * LEAD_TIME;
                    self.projectiles.push(EnemyProjectile::aimed(
                        self.pos,
                        aim,
                        o.projectile_speed,
                        o.projectile_damage,
                        o.projectile_lifetime,
                    ));
                    *shot_cooldown = o.shoot_cooldown;
                    action = Some(EnemyAction::Fired);
                }
            }
            PatternState::HeavyGunner { shot_cooldown } => {
                let h = &c.heavy_gunner;
                let multiplier = if distance < h.optimal_distance * 0.7 {
                    -0.3
                } else if distance > h.optimal_distance * 1.5 {
                    1.2
                } else {
                    0.8
                };
                self.vel += dir * self.acceleration * multiplier;
                self.vel += boundary_force(self.pos, &ctx.playfield);
                self.vel = clamp_speed(self.vel, self.speed);
                if distance > 0.0 {
                    self.angle = to_player.y.atan2(to_player.x);
                }
                self.pos += self.vel;

                *shot_cooldown -= ctx.dt;
                if *shot_cooldown <= 0.0 {
                    self.projectiles.push(EnemyProjectile::aimed(
                        self.pos,
                        player,
                        h.projectile_speed,
                        h.projectile_damage,
                        h.projectile_lifetime,
                    ));
                    *shot_cooldown = h.shoot_cooldown;
                    action = Some(EnemyAction::Fired);
                }
            }
            PatternState::DashDodger {
                dash,
                dash_cooldown,
                segments,
                ..
            } => {
                let d = &c.dash_dodger;
                *dash_cooldown -= ctx.dt;

                match dash {
                    DashState::Dashing { remaining } => {
                        *remaining -= ctx.dt;
                        if *remaining <= 0.0 {
                            *dash = DashState::Approaching;
                        }
                    }
                    DashState::Approaching => {
                        if distance < d.detection_radius
                            && *dash_cooldown <= 0.0
                            && rng.random::<f32>() < d.dash_chance
                        {
                            let side = if rng.random::<bool>() { 1.0 } else { -1.0 };
                            let twist = rng.random_range(-FRAC_PI_4..=FRAC_PI_4);
                            let heading = Vec2::from_angle(twist).rotate(dir.perp() * side);
                            let heading = heading.try_normalize().unwrap_or(Vec2::X);
                            self.vel = heading * d.dash_speed;
                            *dash = DashState::Dashing {
                                remaining: d.dash_duration,
                            };
                            *dash_cooldown = d.dash_cooldown;
                            action = Some(EnemyAction::Dashed);
                        }
                    }
                }

                let dashing = matches!(dash, DashState::Dashing { .. });
                if !dashing {
                    self.vel += dir * self.acceleration * 0.8;
                }
                self.vel += boundary_force(self.pos, &ctx.playfield);
                if dashing {
                    // Edges may bend a dash but never slow or speed it
                    self.vel = self.vel.normalize_or_zero() * d.dash_speed;
                } else {
                    self.vel = clamp_speed(self.vel, self.speed);
                }
                if self.vel != Vec2::ZERO {
                    self.angle = self.vel.y.atan2(self.vel.x);
                }
                self.pos += self.vel;

                // Each segment eases toward the one ahead once the gap opens
                let mut leader = self.pos;
                for seg in segments.iter_mut() {
                    let gap = leader - *seg;
                    if gap.length() > d.segment_spacing {
                        *seg += gap * d.segment_follow;
                    }
                    leader = *seg;
                }
            }
        }

        let playfield = ctx.playfield;
        let dt = ctx.dt;
        self.projectiles.retain_mut(|p| p.advance(dt, &playfield));

        if let Some(a) = action {
            log::debug!("Enemy {} ({:?}) {:?}", self.id, self.pattern(), a);
        }
        action
    }
}
