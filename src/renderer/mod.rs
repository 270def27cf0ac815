//! Render-side collaborator
//!
//! No pixels are produced here. Each frame the session builds a `Frame`
//! (sorted draw list, camera, HUD numbers, overlay) and passes it to a
//! `RenderSink` that owns the actual drawing backend.

pub mod camera;
pub mod compositor;

pub use camera::Camera;
pub use compositor::{DrawKind, Drawable, compose};

use glam::Vec2;

use crate::config::GameConfig;
use crate::sim::exit::missing_items;
use crate::sim::{GameState, ItemKind, LossCause, RunState, TileLayout};

/// Drawn over the level when the simulation is not running
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    None,
    Paused,
    LevelCleared { level: u32, time: f32 },
    GameOver(LossCause),
    Victory,
}

impl Overlay {
    pub fn for_state(state: &GameState) -> Self {
        match state.run {
            RunState::Lobby | RunState::Playing => Overlay::None,
            RunState::Paused => Overlay::Paused,
            RunState::LevelCleared => Overlay::LevelCleared {
                level: state.level_number(),
                time: state.elapsed,
            },
            RunState::GameOver(cause) => Overlay::GameOver(cause),
            RunState::Victory => Overlay::Victory,
        }
    }
}

/// Numbers shown around the play area
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub time_remaining: f32,
    pub kills: u32,
    /// Items still needed to open the exit
    pub missing: Vec<(ItemKind, u32)>,
}

impl Hud {
    pub fn for_state(state: &GameState) -> Self {
        Self {
            level: state.level_number(),
            health: state.player.health,
            max_health: state.player.max_health,
            time_remaining: state.time_remaining,
            kills: state.kills,
            missing: missing_items(&state.level.exit_condition, &state.item_counts),
        }
    }
}

/// Everything a backend needs for one frame
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub camera: Camera,
    /// Sorted back to front, culled to the camera
    pub drawables: Vec<Drawable>,
    pub layout: &'a TileLayout,
    pub hud: Hud,
    pub overlay: Overlay,
}

impl<'a> Frame<'a> {
    pub fn build(state: &'a GameState, viewport: Vec2) -> Self {
        let camera = Camera::follow(state.player.center(), viewport, state.map_size);
        let drawables = compose(state)
            .into_iter()
            .filter(|d| camera.sees(d.pos, d.size))
            .collect();
        Self {
            camera,
            drawables,
            layout: &state.layout,
            hud: Hud::for_state(state),
            overlay: Overlay::for_state(state),
        }
    }
}

/// Drawing backend
pub trait RenderSink {
    fn draw(&mut self, frame: &Frame<'_>);
}

/// Counts frames and remembers the last overlay (headless runs, tests)
#[derive(Debug, Clone, Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub last_overlay: Option<Overlay>,
}

impl RenderSink for NullRenderer {
    fn draw(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        self.last_overlay = Some(frame.overlay);
    }
}

/// Parse `#rrggbb` into linear RGBA
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    Some([channel(0)?, channel(2)?, channel(4)?, 1.0])
}

/// Flat colour used when a sprite is unavailable
pub fn fallback_color(kind: &DrawKind, config: &GameConfig) -> [f32; 4] {
    const GREY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
    let configured = match kind {
        DrawKind::Item(item) => config.items.get(item).map(|m| m.color.as_str()),
        DrawKind::Monster { kind, .. } => config.monster_stats(*kind).map(|s| s.color.as_str()),
        _ => None,
    };
    if let Some(color) = configured {
        return parse_hex_color(color).unwrap_or(GREY);
    }
    match kind {
        DrawKind::Exit => [0.3, 0.8, 0.3, 1.0],
        DrawKind::Player { .. } => [0.2, 0.4, 1.0, 1.0],
        DrawKind::PlayerShot => [1.0, 0.9, 0.2, 1.0],
        DrawKind::MonsterShot => [1.0, 0.2, 0.2, 1.0],
        DrawKind::Effect { .. } => [1.0, 1.0, 1.0, 0.6],
        _ => GREY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::{arena, arena_with_exit, place_monster};
    use crate::sim::MonsterKind;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#ff00"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }

    #[test]
    fn test_overlay_follows_run_state() {
        let mut state = arena();
        assert_eq!(Overlay::for_state(&state), Overlay::None);
        state.run = RunState::Paused;
        assert_eq!(Overlay::for_state(&state), Overlay::Paused);
        state.run = RunState::GameOver(LossCause::TimeExpired);
        assert_eq!(Overlay::for_state(&state), Overlay::GameOver(LossCause::TimeExpired));
    }

    #[test]
    fn test_frame_culls_offscreen() {
        let mut state = arena();
        place_monster(&mut state, MonsterKind::NormalA, Vec2::new(0.0, 0.0));
        let frame = Frame::build(&state, Vec2::new(400.0, 300.0));
        assert!(
            !frame
                .drawables
                .iter()
                .any(|d| matches!(d.kind, DrawKind::Monster { .. }))
        );
        assert!(
            frame
                .drawables
                .iter()
                .any(|d| matches!(d.kind, DrawKind::Player { .. }))
        );
    }

    #[test]
    fn test_hud_lists_missing_items() {
        let state = arena_with_exit(&[(ItemKind::MonsterItemA, 2)]);
        let hud = Hud::for_state(&state);
        assert_eq!(hud.missing, vec![(ItemKind::MonsterItemA, 2)]);
        assert_eq!(hud.health, hud.max_health);
    }

    #[test]
    fn test_fallback_colors() {
        let state = arena();
        let config = &state.config;
        let exit = fallback_color(&DrawKind::Exit, config);
        assert_eq!(exit[3], 1.0);
        let item = fallback_color(&DrawKind::Item(ItemKind::MapItemA), config);
        let expected = parse_hex_color(&config.items[&ItemKind::MapItemA].color).unwrap();
        assert_eq!(item, expected);
    }
}
