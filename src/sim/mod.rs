//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Randomness only through a `RandomSource`
//! - Stable iteration order (storage order, entity IDs never reused)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod exit;
pub mod layout;
pub mod level;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{Rect, SafeZone};
pub use exit::ExitStatus;
pub use layout::TileLayout;
pub use level::LevelError;
pub use rng::{RandomSource, ScriptedRng, SimRng};
pub use state::{
    Direction, Effect, EffectKind, EntityId, Facing, GameEvent, GameState, Item, ItemKind,
    LossCause, Monster, MonsterKind, MonsterShot, Player, PlayerAnim, PlayerShot, RunState,
};
pub use tick::{TickInput, tick};
