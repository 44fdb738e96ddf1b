//! Fixed timestep simulation tick
//!
//! Core combat loop that advances the simulation deterministically.

use glam::Vec2;

use super::collision::resolve;
use super::enemy::EnemyContext;
use super::events::{CombatHooks, GameEvent};
use super::state::{CombatState, GamePhase};
use super::wave::{WaveSignal, WaveState, roll_attack_pattern};
use super::weapons::FireContext;
use crate::direction_or;

/// Autopilot movement speed per tick, before upgrades
const AUTOPILOT_SPEED: f32 = 4.0;
/// Autopilot backs away from enemies closer than this
const AUTOPILOT_KITE_DISTANCE: f32 = 160.0;
/// Autopilot fires the burst when an enemy gets this close
const AUTOPILOT_BURST_DISTANCE: f32 = 60.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player position from the input layer
    pub player_pos: Vec2,
    /// Pointer position the weapons aim at
    pub aim_pos: Vec2,
    /// Fire held
    pub fire: bool,
    /// Trigger the burst pulse
    pub burst: bool,
    /// Select the next unlocked weapon
    pub cycle_weapon: bool,
    /// Player touched the wave trigger
    pub wave_trigger: bool,
    /// Trade experience for health (rest only)
    pub trade_health: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - AI plays the game
    pub autopilot: bool,
}

/// Fill in inputs for demo mode
fn autopilot_input(state: &CombatState, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    let pos = state.player.pos;

    let nearest = state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let speed = AUTOPILOT_SPEED * state.upgrades.move_speed_multiplier();
    let mut next = pos;
    if let Some(enemy) = nearest {
        let distance = enemy.pos.distance(pos);
        input.aim_pos = enemy.pos;
        input.fire = true;
        input.burst = distance < AUTOPILOT_BURST_DISTANCE;
        if distance < AUTOPILOT_KITE_DISTANCE {
            next += direction_or(enemy.pos, pos, Vec2::Y) * speed;
        }
    } else {
        input.fire = false;
        // Wander back toward the middle, grabbing orbs on the way
        let goal = state
            .orbs
            .first()
            .map(|o| o.pos)
            .unwrap_or_else(|| state.config.playfield.center());
        if goal.distance(pos) > speed {
            next += direction_or(pos, goal, Vec2::ZERO) * speed;
        }
    }

    if state.waves.state() == WaveState::Rest && state.orbs.is_empty() {
        input.trade_health = state.player.health_fraction() < 0.5;
        input.wave_trigger = true;
    }

    let pf = state.config.playfield;
    input.player_pos = next.clamp(Vec2::ZERO, Vec2::new(pf.width, pf.height));
    input
}

/// Advance the combat state by one fixed timestep
///
/// Events raised during the tick (plus any queued by purchases since the last
/// one) are drained from `state.events` into `hooks` once the tick has fully
/// resolved.
pub fn tick(state: &mut CombatState, input: &TickInput, dt: f32, hooks: &mut dyn CombatHooks) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if state.phase != GamePhase::Playing {
        return;
    }

    let input = if input.autopilot {
        autopilot_input(state, input)
    } else {
        input.clone()
    };

    state.time_ticks += 1;
    state.player.pos = input.player_pos;
    state.player.advance(dt);
    state.health_trade_cooldown = (state.health_trade_cooldown - dt).max(0.0);

    // Player commands
    if input.cycle_weapon {
        let kind = state.arsenal.cycle(&state.upgrades);
        log::debug!("Selected {:?}", kind);
        state.events.push(GameEvent::WeaponSelected(kind));
    }
    state.arsenal.set_firing(input.fire);
    if input.burst && state.burst.trigger(state.player.pos) {
        state.events.push(GameEvent::BurstTriggered(state.player.pos));
    }
    if input.wave_trigger && state.waves.trigger_start() {
        let next = state.waves.wave.number + 1;
        state.events.push(GameEvent::WaveCountdown(next));
    }
    if input.trade_health {
        state.trade_health();
    }

    // Wave progression
    match state.waves.advance(dt, &mut state.rng) {
        Some(WaveSignal::Started(number)) => {
            state.events.push(GameEvent::WaveStarted(number));
        }
        Some(WaveSignal::Spawn(info)) => {
            let pattern = roll_attack_pattern(state.waves.wave.number, &mut state.rng);
            let id = state.spawn_enemy(&info, pattern);
            state
                .events
                .push(GameEvent::EnemySpawned { id, pattern, info });
        }
        None => {}
    }

    // Enemies (and their projectiles and swipes)
    let enemy_ctx = EnemyContext {
        dt,
        player_pos: state.player.pos,
        playfield: state.config.playfield,
        config: &state.config.enemy,
    };
    for enemy in state.enemies.iter_mut() {
        enemy.advance(&enemy_ctx, &mut state.rng);
    }

    // Weapons
    let targets = state.enemy_positions();
    let fire_ctx = FireContext {
        dt,
        player_pos: state.player.pos,
        aim_pos: input.aim_pos,
        targets: &targets,
        bullet_speed_multiplier: state.upgrades.bullet_speed_multiplier(),
        fire_rate_multiplier: state.upgrades.fire_rate_multiplier(),
        playfield: state.config.playfield,
    };
    state.arsenal.advance(&fire_ctx, &mut state.rng);

    state.burst.advance();

    // Single resolver pass
    let outcome = resolve(state);
    if outcome.player_died {
        state.phase = GamePhase::GameOver;
    } else {
        collect_orbs(state);
    }

    for event in std::mem::take(&mut state.events) {
        event.dispatch(hooks);
    }
}

/// Move reward orbs and bank the ones that reached the player
fn collect_orbs(state: &mut CombatState) {
    let player_pos = state.player.pos;
    let magnet_range = state.config.orbs.magnet_range * state.upgrades.magnet_range_multiplier();
    let config = &state.config.orbs;
    let mut gained = 0;
    state.orbs.retain_mut(|orb| {
        if orb.advance(player_pos, magnet_range, config) {
            gained += orb.value;
            false
        } else {
            true
        }
    });
    if gained > 0 {
        state.experience += gained;
        state.events.push(GameEvent::ExperienceCollected(gained));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::SIM_DT;
    use crate::sim::enemy::AttackPattern;
    use crate::sim::events::{DamageSource, DamageTarget, EventLog, NoHooks};
    use crate::sim::wave::EnemySpawnInfo;
    use crate::sim::weapons::WeaponKind;

    fn new_state() -> CombatState {
        CombatState::new(GameConfig::default(), 12345).expect("default config is valid")
    }

    fn idle_input(state: &CombatState) -> TickInput {
        TickInput {
            player_pos: state.player.pos,
            aim_pos: state.player.pos + Vec2::new(0.0, -100.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_is_deterministic() {
        let mut a = new_state();
        let mut b = new_state();
        let input = TickInput {
            autopilot: true,
            ..idle_input(&a)
        };
        for _ in 0..1500 {
            tick(&mut a, &input, SIM_DT, &mut NoHooks);
            tick(&mut b, &input, SIM_DT, &mut NoHooks);
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
            assert_eq!(ea.hp, eb.hp);
        }
        assert_eq!(a.player.health, b.player.health);
    }

    #[test]
    fn test_chase_enemy_dies_to_five_direct_shots() {
        let mut state = new_state();
        // Park the director so nothing else spawns
        state.waves.wave.state = WaveState::Rest;
        let player = state.player.pos;
        let id = state.spawn_enemy(
            &EnemySpawnInfo {
                pos: player + Vec2::new(100.0, 0.0),
                hp: 50.0,
                speed: 7.5,
            },
            AttackPattern::Chase,
        );
        let mut log = EventLog::new();

        for _ in 0..120 {
            let shots = state.arsenal.weapon(WeaponKind::Direct).shots_fired;
            let aim = state
                .enemies
                .first()
                .map(|e| e.pos)
                .unwrap_or(player + Vec2::new(100.0, 0.0));
            let input = TickInput {
                player_pos: player,
                aim_pos: aim,
                fire: shots < 5,
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT, &mut log);
            if state.enemies.is_empty() {
                break;
            }
        }

        assert!(state.enemies.is_empty());
        let direct = state.arsenal.weapon(WeaponKind::Direct);
        assert_eq!(direct.shots_fired, 5);
        let hits = log
            .damage()
            .filter(|d| d.target == DamageTarget::Enemy(id))
            .count();
        assert_eq!(hits, 5);
        let kills: Vec<_> = log.kills().collect();
        assert_eq!(kills.len(), 1);
        assert_eq!(kills[0].enemy_id, id);
        assert_eq!(state.player.health, 100.0);
    }

    #[test]
    fn test_kill_credits_experience() {
        let mut state = new_state();
        state.waves.wave.state = WaveState::Rest;
        let player = state.player.pos;
        state.spawn_enemy(
            &EnemySpawnInfo {
                pos: player + Vec2::new(300.0, 0.0),
                hp: 50.0,
                speed: 7.5,
            },
            AttackPattern::Chase,
        );
        state.enemies[0].take_damage(50.0);
        let input = idle_input(&state);
        tick(&mut state, &input, SIM_DT, &mut NoHooks);
        assert!(state.enemies.is_empty());
        assert_eq!(state.experience, state.config.waves.points_per_kill);
        // The dropped orb is still on its way
        assert_eq!(state.orbs.len(), 1);
    }

    #[test]
    fn test_chase_swipe_hits_once_per_activation() {
        let mut state = new_state();
        state.waves.wave.state = WaveState::Rest;
        let player = state.player.pos;
        let anchor = player + Vec2::new(40.0, 0.0);
        state.spawn_enemy(
            &EnemySpawnInfo {
                pos: anchor,
                hp: 50.0,
                speed: 7.5,
            },
            AttackPattern::Chase,
        );
        let mut log = EventLog::new();
        let input = idle_input(&state);
        // Pinned just outside body contact, inside swipe range, for the whole window
        for _ in 0..40 {
            state.enemies[0].pos = anchor;
            state.enemies[0].vel = Vec2::ZERO;
            tick(&mut state, &input, SIM_DT, &mut log);
        }

        let player_hits: Vec<_> = log
            .damage()
            .filter(|d| d.target == DamageTarget::Player)
            .collect();
        assert_eq!(player_hits.len(), 1);
        assert_eq!(player_hits[0].source, DamageSource::Swipe);
        assert_eq!(player_hits[0].amount, crate::consts::SWIPE_DAMAGE);
        assert_eq!(state.player.health, 100.0 - crate::consts::SWIPE_DAMAGE);
        assert!(state.enemies[0].swipe().is_some_and(|s| !s.active));
    }

    #[test]
    fn test_wave_stays_active_until_every_enemy_spawned_and_killed() {
        let mut state = new_state();
        let mut log = EventLog::new();
        let mut kills_seen = 0;

        for _ in 0..2000 {
            let input = idle_input(&state);
            tick(&mut state, &input, SIM_DT, &mut log);
            kills_seen = log.kills().count();

            if kills_seen == 1 && state.waves.wave.enemies_spawned == 1 {
                assert_eq!(state.waves.wave.enemies_remaining, 2);
                assert_eq!(state.waves.state(), WaveState::Active);
            }
            if state.waves.state() == WaveState::Rest {
                break;
            }
            assert_eq!(state.waves.state(), WaveState::Active);

            // Kill everything the moment it shows up; the next resolver pass reaps it
            for enemy in state.enemies.iter_mut() {
                enemy.take_damage(enemy.hp);
            }
            state.player.health = state.player.max_health;
        }

        assert_eq!(state.waves.state(), WaveState::Rest);
        assert_eq!(state.waves.wave.enemies_spawned, 3);
        assert_eq!(kills_seen, 3);
        assert!(log.events.contains(&GameEvent::WaveCompleted(1)));
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = new_state();
        let mut input = idle_input(&state);
        tick(&mut state, &input, SIM_DT, &mut NoHooks);
        let ticks = state.time_ticks;

        input.pause = true;
        tick(&mut state, &input, SIM_DT, &mut NoHooks);
        assert_eq!(state.phase, GamePhase::Paused);
        input.pause = false;
        for _ in 0..10 {
            tick(&mut state, &input, SIM_DT, &mut NoHooks);
        }
        assert_eq!(state.time_ticks, ticks);

        input.pause = true;
        tick(&mut state, &input, SIM_DT, &mut NoHooks);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, ticks + 1);
    }

    #[test]
    fn test_player_death_ends_run() {
        let mut state = new_state();
        state.waves.wave.state = WaveState::Rest;
        state.player.health = 5.0;
        let player = state.player.pos;
        state.spawn_enemy(
            &EnemySpawnInfo {
                pos: player,
                hp: 50.0,
                speed: 7.5,
            },
            AttackPattern::Chase,
        );
        let mut log = EventLog::new();
        let input = idle_input(&state);
        tick(&mut state, &input, SIM_DT, &mut log);
        assert!(state.is_game_over());
        assert!(log.events.contains(&GameEvent::PlayerDied));

        let ticks = state.time_ticks;
        tick(&mut state, &input, SIM_DT, &mut log);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_wave_trigger_starts_next_wave_after_countdown() {
        let mut state = new_state();
        state.waves.wave.state = WaveState::Rest;
        let mut log = EventLog::new();
        let mut input = idle_input(&state);
        input.wave_trigger = true;
        tick(&mut state, &input, SIM_DT, &mut log);
        assert!(log.events.contains(&GameEvent::WaveCountdown(2)));

        input.wave_trigger = false;
        for _ in 0..200 {
            tick(&mut state, &input, SIM_DT, &mut log);
        }
        assert!(log.events.contains(&GameEvent::WaveStarted(2)));
        assert_eq!(state.waves.wave.number, 2);
    }

    #[test]
    fn test_cycle_weapon_only_reaches_unlocked() {
        let mut state = new_state();
        let mut input = idle_input(&state);
        input.cycle_weapon = true;
        tick(&mut state, &input, SIM_DT, &mut NoHooks);
        assert_eq!(state.arsenal.active, WeaponKind::TwinBurst);
        tick(&mut state, &input, SIM_DT, &mut NoHooks);
        assert_eq!(state.arsenal.active, WeaponKind::Direct);
    }

    #[test]
    fn test_orbs_bank_experience() {
        let mut state = new_state();
        state.waves.wave.state = WaveState::Rest;
        let player = state.player.pos;
        state
            .orbs
            .push(crate::sim::orbs::ExperienceOrb::new(player + Vec2::new(30.0, 0.0), 5));
        let mut log = EventLog::new();
        for _ in 0..20 {
            let input = idle_input(&state);
            tick(&mut state, &input, SIM_DT, &mut log);
        }
        assert_eq!(state.experience, 5);
        assert!(state.orbs.is_empty());
        assert!(log.events.contains(&GameEvent::ExperienceCollected(5)));
    }

    #[test]
    fn test_purchase_between_ticks_is_reported() {
        let mut state = new_state();
        state.experience = 100;
        state.purchase_upgrade(crate::sim::upgrades::EffectKind::FireRate).unwrap();
        let mut log = EventLog::new();
        let input = idle_input(&state);
        tick(&mut state, &input, SIM_DT, &mut log);
        assert!(log.events.iter().any(|e| matches!(e, GameEvent::UpgradePurchased { level: 1, .. })));
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_autopilot_scores_kills() {
        let mut state = new_state();
        let input = TickInput {
            autopilot: true,
            ..idle_input(&state)
        };
        let mut log = EventLog::new();
        for _ in 0..(30 * 60) {
            tick(&mut state, &input, SIM_DT, &mut log);
            if state.is_game_over() {
                break;
            }
        }
        assert!(log.kills().count() >= 1);
        assert!(state.score > 0);
    }
}
