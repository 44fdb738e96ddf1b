//! Collision resolution
//!
//! Runs once per tick after every entity has advanced. This is the only place
//! that writes across component boundaries (player health, enemy hp, the
//! wave director's kill count), and it does so in a fixed order:
//!
//! 1. player vs enemy bodies
//! 2. player vs melee swipes
//! 3. player vs enemy projectiles
//! 4. burst pulse vs enemies
//! 5. weapon projectiles vs enemies
//!
//! Steps 1-3 stop the pass as soon as the player dies. Dead enemies are
//! compacted at the end, each producing exactly one kill.

use super::events::{Damage, DamageSource, DamageTarget, GameEvent, Kill};
use super::orbs::ExperienceOrb;
use super::state::CombatState;
use crate::consts::{
    BURST_DAMAGE, CONTACT_BUFFER, ENEMY_PROJECTILE_HIT_DISTANCE, PLAYER_RADIUS, SWIPE_DAMAGE,
    WEAPON_HIT_BUFFER, WEAPON_PROJECTILE_DAMAGE, WEAPON_PROJECTILE_RADIUS,
};

/// Result of one resolver pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub player_died: bool,
    pub kills: u32,
}

/// Hurt the player, recording the event; true if this hit was fatal
fn hurt_player(state: &mut CombatState, amount: f32, source: DamageSource) -> bool {
    if !state.player.take_damage(amount) {
        return false;
    }
    state.events.push(GameEvent::Damage(Damage {
        target: DamageTarget::Player,
        amount,
        source,
    }));
    if state.player.is_dead() {
        log::info!("Player died on tick {}", state.time_ticks);
        state.events.push(GameEvent::PlayerDied);
        return true;
    }
    false
}

/// Steps 1-3; true if the player died
fn resolve_player_hits(state: &mut CombatState) -> bool {
    let player_pos = state.player.pos;

    let contact_probe = PLAYER_RADIUS + CONTACT_BUFFER;
    let contact_damage = state.config.player.damage_per_collision;
    let touching = state
        .enemies
        .iter()
        .filter(|e| e.is_alive() && e.hit_test(player_pos, contact_probe))
        .count();
    for _ in 0..touching {
        if hurt_player(state, contact_damage, DamageSource::Contact) {
            return true;
        }
    }

    let mut swipe_hits = 0;
    for enemy in state.enemies.iter_mut() {
        if let Some(swipe) = enemy.swipe_mut() {
            if swipe.try_hit(player_pos, PLAYER_RADIUS) {
                swipe_hits += 1;
            }
        }
    }
    for _ in 0..swipe_hits {
        if hurt_player(state, SWIPE_DAMAGE, DamageSource::Swipe) {
            return true;
        }
    }

    let mut projectile_damage = Vec::new();
    for enemy in state.enemies.iter_mut() {
        enemy.projectiles.retain(|p| {
            if p.pos.distance(player_pos) < ENEMY_PROJECTILE_HIT_DISTANCE {
                projectile_damage.push(p.damage);
                false
            } else {
                true
            }
        });
    }
    for amount in projectile_damage {
        if hurt_player(state, amount, DamageSource::EnemyProjectile) {
            return true;
        }
    }
    false
}

/// Step 4
fn resolve_burst(state: &mut CombatState) {
    if !state.burst.is_expanding() {
        return;
    }
    let center = state.burst.center;
    let radius = state.burst.radius();
    for enemy in state.enemies.iter_mut() {
        if enemy.is_alive() && enemy.hit_test(center, radius) {
            enemy.take_damage(BURST_DAMAGE);
            state.events.push(GameEvent::Damage(Damage {
                target: DamageTarget::Enemy(enemy.id),
                amount: BURST_DAMAGE,
                source: DamageSource::Burst,
            }));
        }
    }
}

/// Step 5: each live projectile hits at most one enemy
fn resolve_weapon_hits(state: &mut CombatState) {
    let probe = WEAPON_PROJECTILE_RADIUS + WEAPON_HIT_BUFFER;
    for weapon in state.arsenal.weapons.iter_mut() {
        let source = DamageSource::Weapon(weapon.kind);
        for projectile in weapon.projectiles.iter_mut() {
            if !projectile.is_live() {
                continue;
            }
            let target = state
                .enemies
                .iter_mut()
                .find(|e| e.is_alive() && e.hit_test(projectile.pos, probe));
            if let Some(enemy) = target {
                enemy.take_damage(WEAPON_PROJECTILE_DAMAGE);
                projectile.alpha = 0.0;
                state.events.push(GameEvent::Damage(Damage {
                    target: DamageTarget::Enemy(enemy.id),
                    amount: WEAPON_PROJECTILE_DAMAGE,
                    source,
                }));
            }
        }
        weapon.projectiles.retain(|p| p.is_live());
    }
}

/// Remove dead enemies (reverse index order), dropping orbs and reporting
/// kills to the wave director
fn compact_dead(state: &mut CombatState) -> u32 {
    let mut dead = Vec::new();
    for i in (0..state.enemies.len()).rev() {
        if !state.enemies[i].is_alive() {
            dead.push(state.enemies.remove(i));
        }
    }
    // Report in spawn order
    dead.reverse();

    let points = state.config.waves.points_per_kill;
    for enemy in &dead {
        let kill = Kill {
            enemy_id: enemy.id,
            pattern: enemy.pattern(),
            pos: enemy.pos,
            score: points,
        };
        log::debug!("Enemy {} ({:?}) destroyed", enemy.id, kill.pattern);
        state.score += u64::from(points);
        // Kill points are also spendable in the upgrade shop
        state.experience += points;
        state.kills += 1;
        state
            .orbs
            .push(ExperienceOrb::new(enemy.pos, state.config.orbs.value));
        state.events.push(GameEvent::EnemyKilled(kill));
        if state.waves.on_enemy_killed() {
            state
                .events
                .push(GameEvent::WaveCompleted(state.waves.wave.number));
        }
    }
    dead.len() as u32
}

/// Resolve every collision for this tick
pub fn resolve(state: &mut CombatState) -> ResolveOutcome {
    if resolve_player_hits(state) {
        return ResolveOutcome {
            player_died: true,
            kills: 0,
        };
    }
    resolve_burst(state);
    resolve_weapon_hits(state);
    let kills = compact_dead(state);
    ResolveOutcome {
        player_died: false,
        kills,
    }
}
