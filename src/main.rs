//! Wave Combat headless runner
//!
//! Plays the simulation in demo mode and logs what happens. Useful for
//! soak-testing tuning files without an embedding front end.
//!
//! Usage: `wave-combat [config.json] [--seed N] [--seconds N] [--dump-config]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use wave_combat::GameConfig;
use wave_combat::error::ConfigError;
use wave_combat::sim::{
    AttackPattern, CombatHooks, CombatState, Damage, DamageTarget, EffectKind, EnemySpawnInfo,
    Kill, TickInput, WaveState, tick,
};

/// Headless demo run of the combat simulation
#[derive(Parser, Debug)]
#[command(name = "wave-combat")]
#[command(about = "Run the wave combat simulation headless under the autopilot")]
struct Options {
    /// JSON tuning file; defaults are used when omitted
    config_path: Option<PathBuf>,
    /// Run seed
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,
    /// Simulated seconds to run
    #[arg(long, default_value_t = 300)]
    seconds: u32,
    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

/// Logs notable events as they come out of the tick
#[derive(Default)]
struct LogHooks {
    damage_taken: f32,
}

impl CombatHooks for LogHooks {
    fn wave_started(&mut self, number: u32) {
        log::info!("== Wave {} ==", number);
    }

    fn wave_completed(&mut self, number: u32) {
        log::info!("Wave {} cleared", number);
    }

    fn enemy_spawned(&mut self, info: &EnemySpawnInfo, pattern: AttackPattern) {
        log::debug!(
            "{:?} spawned at ({:.0}, {:.0}) with {:.0} hp",
            pattern,
            info.pos.x,
            info.pos.y,
            info.hp
        );
    }

    fn enemy_killed(&mut self, kill: &Kill) {
        log::debug!("Enemy {} ({:?}) destroyed", kill.enemy_id, kill.pattern);
    }

    fn damage_applied(&mut self, damage: &Damage) {
        if damage.target == DamageTarget::Player {
            self.damage_taken += damage.amount;
            log::debug!("Player hit for {:.0} by {:?}", damage.amount, damage.source);
        }
    }

    fn player_died(&mut self) {
        log::warn!("Player died");
    }
}

/// Spend banked experience on whatever the shop offers
fn shop(state: &mut CombatState) {
    for kind in state.upgrade_offers(3) {
        if state.purchase_upgrade(kind).is_ok() && kind.unlocks().is_some() {
            state.arsenal.cycle(&state.upgrades);
        }
    }
}

fn run(options: &Options) -> Result<(), ConfigError> {
    let config = match &options.config_path {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    if options.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let dt = config.dt();
    let total_ticks = (options.seconds as f32 * config.fps) as u64;
    let mut state = CombatState::new(config, options.seed)?;
    log::info!(
        "Running seed {:#x} for {} ticks ({} s)",
        options.seed,
        total_ticks,
        options.seconds
    );

    let mut hooks = LogHooks::default();
    let mut input = TickInput {
        player_pos: state.player.pos,
        autopilot: true,
        ..Default::default()
    };

    let mut shopped_wave = 0;
    for _ in 0..total_ticks {
        input.player_pos = state.player.pos;
        tick(&mut state, &input, dt, &mut hooks);

        if state.is_game_over() {
            break;
        }
        if state.waves.state() == WaveState::Rest && shopped_wave != state.waves.wave.number {
            shopped_wave = state.waves.wave.number;
            shop(&mut state);
        }
    }

    let bought: u32 = EffectKind::ALL.iter().map(|k| state.upgrades.count(*k)).sum();
    log::info!(
        "Finished at wave {} after {} ticks: score {}, {} kills, {} upgrades, {:.0} damage taken",
        state.waves.wave.number,
        state.time_ticks,
        state.score,
        state.kills,
        bought,
        hooks.damage_taken
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::parse();

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
