//! Deterministic combat simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (owned by [`CombatState`])
//! - Stable iteration order (enemies by spawn id)
//! - No rendering, audio or platform dependencies

pub mod burst;
pub mod collision;
pub mod enemy;
pub mod events;
pub mod geometry;
pub mod orbs;
pub mod player;
pub mod state;
pub mod swipe;
pub mod tick;
pub mod upgrades;
pub mod wave;
pub mod weapons;

pub use burst::{BurstAbility, BurstPhase};
pub use collision::{ResolveOutcome, resolve};
pub use enemy::{AttackPattern, Enemy, EnemyProjectile, PatternState};
pub use events::{CombatHooks, Damage, DamageSource, DamageTarget, EventLog, GameEvent, Kill, NoHooks};
pub use orbs::ExperienceOrb;
pub use player::Player;
pub use state::{CombatState, GamePhase};
pub use swipe::MeleeSwipeAttack;
pub use tick::{TickInput, tick};
pub use upgrades::{EffectKind, UpgradeLedger};
pub use wave::{EnemySpawnInfo, Wave, WaveDirector, WaveState};
pub use weapons::{Arsenal, Weapon, WeaponKind, WeaponProjectile};
