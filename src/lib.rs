//! Tile Quest - a top-down action game simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, combat, exit, map layout)
//! - `config`: Data-driven game balance and level definitions
//! - `progress`: Level unlocks and completions
//! - `persistence`: Key-value progress storage (file, LocalStorage, memory)
//! - `platform`: Input edge detection, debouncing, web logging
//! - `renderer`: Draw ordering and camera (no GPU code)
//! - `audio`: Sound cue selection
//! - `game`: Session driver tying the above together

pub mod audio;
pub mod config;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod renderer;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use game::{Game, GameError};
pub use progress::Progress;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Side of one layout cell in world units
    pub const GRID_UNIT: f32 = 100.0;

    /// Trackers pursue the player inside this distance
    pub const DEFAULT_CHASE_RADIUS: f32 = 500.0;
    /// Per-tick chance a wandering monster picks a new heading
    pub const DEFAULT_WANDER_CHANCE: f32 = 0.02;

    /// Every Nth turret attack is a full burst
    pub const TURRET_BURST_PERIOD: u32 = 10;

    /// Lifetime of hit/death bursts (seconds)
    pub const EFFECT_LIFETIME: f32 = 0.4;

    /// Random placement tries before giving up on the safe-zone rule
    pub const SPAWN_ATTEMPTS: usize = 64;

    /// Resize requests closer together than this collapse into one
    pub const RESIZE_DEBOUNCE_SECS: f64 = 0.25;
}

/// Unit vector from `from` towards `to` (zero if they coincide)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Unit vector at angle `theta` (radians, +x axis, +y down)
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to() {
        let d = direction_to(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert_eq!(direction_to(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_unit_from_angle() {
        let v = unit_from_angle(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }
}
