//! Session driver
//!
//! Owns the simulation, progress and platform glue, and runs the fixed
//! timestep loop once per display frame.

use std::sync::Arc;

use glam::Vec2;

use crate::audio::{AudioSink, SoundEffect};
use crate::config::GameConfig;
use crate::consts::{MAX_SUBSTEPS, RESIZE_DEBOUNCE_SECS, SIM_DT};
use crate::persistence::ProgressStore;
use crate::platform::{Debouncer, InputTracker, KeyState};
use crate::progress::{Advance, Progress};
use crate::renderer::{Frame, RenderSink};
use crate::sim::{GameState, LevelError, RunState, SimRng, tick};

/// Longest frame delta fed to the accumulator (seconds)
const MAX_FRAME_DT: f32 = 0.1;

const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("level {0} is locked")]
    Locked(u32),
    #[error("no level is active")]
    NoActiveLevel,
}

pub struct Game<S: ProgressStore> {
    config: Arc<GameConfig>,
    state: GameState,
    progress: Progress,
    store: S,
    rng: SimRng,
    input: InputTracker,
    accumulator: f32,
    /// Cleared to stop the loop cooperatively
    running: bool,
    viewport: Vec2,
    resize: Debouncer<Vec2>,
    // One-shot inputs survive frames too short to run a tick
    pending_release: bool,
    pending_pause: bool,
}

impl<S: ProgressStore> Game<S> {
    pub fn new(config: Arc<GameConfig>, store: S, seed: u64) -> Self {
        let progress = Progress::load(&store);
        Self {
            state: GameState::new(Arc::clone(&config)),
            config,
            progress,
            store,
            rng: SimRng::new(seed),
            input: InputTracker::new(),
            accumulator: 0.0,
            running: false,
            viewport: DEFAULT_VIEWPORT,
            resize: Debouncer::new(RESIZE_DEBOUNCE_SECS),
            pending_release: false,
            pending_pause: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Start an unlocked level with a freshly rolled layout
    pub fn enter_level(&mut self, level: u32, now: f64) -> Result<(), GameError> {
        if !self.progress.is_unlocked(level) {
            return Err(GameError::Locked(level));
        }
        let epoch = (now.max(0.0) * 1000.0) as u64;
        self.state.start_level(level, epoch, &mut self.rng)?;
        self.reset_loop();
        self.running = true;
        Ok(())
    }

    /// Stop the loop and go back to the lobby
    pub fn leave_level(&mut self) {
        self.running = false;
        self.state.return_to_lobby();
        self.reset_loop();
        log::info!("Returned to lobby");
    }

    /// Replay the current level on the same layout
    pub fn restart(&mut self) -> Result<(), GameError> {
        if !self.state.run.has_level() {
            return Err(GameError::NoActiveLevel);
        }
        self.state.restart(&mut self.rng);
        self.reset_loop();
        self.running = true;
        Ok(())
    }

    /// Queue a viewport change; applied once requests stop arriving
    pub fn request_resize(&mut self, viewport: Vec2, now: f64) {
        self.resize.request(viewport, now);
    }

    /// Run one display frame: simulate, play cues, handle clears, draw
    pub fn frame(
        &mut self,
        dt: f32,
        keys: KeyState,
        now: f64,
        renderer: &mut dyn RenderSink,
        audio: &mut dyn AudioSink,
    ) {
        if let Some(viewport) = self.resize.poll(now) {
            log::debug!("Viewport now {}x{}", viewport.x, viewport.y);
            self.viewport = viewport;
        }
        if !self.running {
            return;
        }

        let mut input = self.input.update(keys);
        self.pending_release |= input.action_released;
        self.pending_pause |= input.pause_pressed;

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            input.action_released = std::mem::take(&mut self.pending_release);
            input.pause_pressed = std::mem::take(&mut self.pending_pause);
            tick(&mut self.state, &input, SIM_DT, &mut self.rng);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        for event in self.state.drain_events() {
            if let Some(effect) = SoundEffect::for_event(&event) {
                audio.play(effect);
            }
        }

        if self.state.run == RunState::LevelCleared {
            self.advance(now);
        }

        if self.state.run.has_level() {
            let frame = Frame::build(&self.state, self.viewport);
            renderer.draw(&frame);
        }
    }

    fn advance(&mut self, now: f64) {
        let level = self.state.level_number();
        let time = self.state.elapsed;
        let advance = self
            .progress
            .complete_level(level, time, self.config.last_level());
        self.progress.save(&mut self.store);

        match advance {
            Advance::Next(next) => {
                if let Err(e) = self.enter_level(next, now) {
                    log::warn!("Cannot continue to level {}: {}", next, e);
                    self.leave_level();
                }
            }
            Advance::Victory => {
                log::info!("Victory after level {}", level);
                self.state.run = RunState::Victory;
            }
        }
    }

    fn reset_loop(&mut self) {
        self.accumulator = 0.0;
        self.input.reset();
        self.pending_release = false;
        self.pending_pause = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullAudio, RecordingAudio};
    use crate::config::{LevelConfig, TileWeight};
    use crate::persistence::MemoryStore;
    use crate::renderer::{NullRenderer, Overlay};
    use crate::sim::LossCause;
    use crate::sim::exit::ExitStatus;
    use crate::sim::state::{Item, ItemKind};

    const FRAME: f32 = 1.0 / 30.0;

    fn open_level(level: u32) -> LevelConfig {
        LevelConfig {
            level,
            map_width: 1000.0,
            map_height: 1000.0,
            time_limit: 30.0,
            tiles: vec![TileWeight::new("floor", 1.0)],
            ..Default::default()
        }
    }

    fn game(levels: u32) -> Game<MemoryStore> {
        let mut config = GameConfig::default();
        config.safe_zone_size = 200.0;
        config.levels = (1..=levels).map(open_level).collect();
        Game::new(Arc::new(config), MemoryStore::new(), 7)
    }

    fn press_and_release_action(game: &mut Game<MemoryStore>, renderer: &mut NullRenderer) {
        let held = KeyState {
            action: true,
            ..Default::default()
        };
        game.frame(FRAME, held, 0.0, renderer, &mut NullAudio);
        game.frame(FRAME, KeyState::default(), 0.0, renderer, &mut NullAudio);
    }

    #[test]
    fn test_locked_level_rejected() {
        let mut game = game(3);
        assert_eq!(game.enter_level(2, 0.0), Err(GameError::Locked(2)));
        assert!(!game.is_running());
    }

    #[test]
    fn test_restart_needs_level() {
        let mut game = game(1);
        assert_eq!(game.restart(), Err(GameError::NoActiveLevel));
    }

    #[test]
    fn test_clear_advances_and_saves() {
        let mut game = game(2);
        let mut renderer = NullRenderer::default();
        game.enter_level(1, 0.0).unwrap();

        press_and_release_action(&mut game, &mut renderer);

        assert_eq!(game.state().level_number(), 2);
        assert_eq!(game.state().run, RunState::Playing);
        assert_eq!(game.progress().unlocked_level, 2);
        assert_eq!(game.store().load_unlocked_level().unwrap(), Some(2));
        assert_eq!(game.store().load_completed_levels().unwrap(), Some(vec![1]));
        assert!(game.progress().best_time(1).is_some());
    }

    #[test]
    fn test_collect_then_exit_unlocks_next_level() {
        let mut config = GameConfig::default();
        config.safe_zone_size = 200.0;
        let mut first = open_level(1);
        first.exit_condition.insert(ItemKind::MapItemA, 1);
        config.levels = vec![first, open_level(2)];
        let mut game = Game::new(Arc::new(config), MemoryStore::new(), 7);
        let mut renderer = NullRenderer::default();
        game.enter_level(1, 0.0).unwrap();

        // Standing on the exit without the item
        press_and_release_action(&mut game, &mut renderer);
        assert_eq!(game.state().level_number(), 1);
        assert_eq!(game.state().exit_status, ExitStatus::ConditionUnmet);
        assert_eq!(game.progress().unlocked_level, 1);

        let id = game.state.next_entity_id();
        let pos = game.state.player.pos;
        game.state.items.push(Item {
            id,
            kind: ItemKind::MapItemA,
            pos,
            size: Vec2::splat(20.0),
            collected: false,
            dropped: false,
        });
        press_and_release_action(&mut game, &mut renderer);

        assert_eq!(game.state().level_number(), 2);
        assert_eq!(game.state().run, RunState::Playing);
        assert_eq!(game.progress().completed_levels, vec![1]);
        assert!(game.progress().is_unlocked(2));
        assert_eq!(game.store().load_unlocked_level().unwrap(), Some(2));
    }

    #[test]
    fn test_last_level_is_victory() {
        let mut game = game(1);
        let mut renderer = NullRenderer::default();
        game.enter_level(1, 0.0).unwrap();

        press_and_release_action(&mut game, &mut renderer);

        assert_eq!(game.state().run, RunState::Victory);
        assert_eq!(renderer.last_overlay, Some(Overlay::Victory));
        assert_eq!(game.progress().completed_levels, vec![1]);
    }

    #[test]
    fn test_short_frames_keep_release() {
        let mut game = game(1);
        let mut renderer = NullRenderer::default();
        game.enter_level(1, 0.0).unwrap();
        let held = KeyState {
            action: true,
            ..Default::default()
        };
        game.frame(SIM_DT, held, 0.0, &mut renderer, &mut NullAudio);
        // Too short for a tick; the release must carry over
        game.frame(SIM_DT * 0.25, KeyState::default(), 0.0, &mut renderer, &mut NullAudio);
        assert_eq!(game.state().run, RunState::Playing);
        game.frame(FRAME, KeyState::default(), 0.0, &mut renderer, &mut NullAudio);
        assert_eq!(game.state().run, RunState::Victory);
    }

    #[test]
    fn test_leave_level_stops_loop() {
        let mut game = game(1);
        let mut renderer = NullRenderer::default();
        game.enter_level(1, 0.0).unwrap();
        game.frame(FRAME, KeyState::default(), 0.0, &mut renderer, &mut NullAudio);
        assert_eq!(renderer.frames, 1);

        game.leave_level();
        game.frame(FRAME, KeyState::default(), 0.0, &mut renderer, &mut NullAudio);
        assert_eq!(renderer.frames, 1);
        assert_eq!(game.state().run, RunState::Lobby);
    }

    #[test]
    fn test_game_over_still_draws() {
        let mut game = game(1);
        let mut renderer = NullRenderer::default();
        let mut audio = RecordingAudio::default();
        game.enter_level(1, 0.0).unwrap();
        game.state.time_remaining = SIM_DT * 0.5;

        game.frame(FRAME, KeyState::default(), 0.0, &mut renderer, &mut audio);
        assert_eq!(game.state().run, RunState::GameOver(LossCause::TimeExpired));
        assert!(audio.played.contains(&SoundEffect::TimeUp));

        game.frame(FRAME, KeyState::default(), 0.0, &mut renderer, &mut audio);
        assert_eq!(renderer.frames, 2);
        assert_eq!(renderer.last_overlay, Some(Overlay::GameOver(LossCause::TimeExpired)));

        game.restart().unwrap();
        assert_eq!(game.state().run, RunState::Playing);
    }

    #[test]
    fn test_pause_toggles_through_frames() {
        let mut game = game(1);
        let mut renderer = NullRenderer::default();
        game.enter_level(1, 0.0).unwrap();
        let pause = KeyState {
            pause: true,
            ..Default::default()
        };
        game.frame(FRAME, pause, 0.0, &mut renderer, &mut NullAudio);
        assert_eq!(game.state().run, RunState::Paused);
        let remaining = game.state().time_remaining;

        // Holding the key does not toggle again
        game.frame(FRAME, pause, 0.0, &mut renderer, &mut NullAudio);
        game.frame(FRAME, KeyState::default(), 0.0, &mut renderer, &mut NullAudio);
        assert_eq!(game.state().run, RunState::Paused);
        assert_eq!(game.state().time_remaining, remaining);
        assert_eq!(renderer.last_overlay, Some(Overlay::Paused));

        game.frame(FRAME, pause, 0.0, &mut renderer, &mut NullAudio);
        assert_eq!(game.state().run, RunState::Playing);
    }

    #[test]
    fn test_resize_is_debounced() {
        let mut game = game(1);
        let mut renderer = NullRenderer::default();
        game.request_resize(Vec2::new(800.0, 600.0), 1.0);
        game.request_resize(Vec2::new(1024.0, 768.0), 1.1);
        game.frame(FRAME, KeyState::default(), 1.2, &mut renderer, &mut NullAudio);
        assert_eq!(game.viewport(), DEFAULT_VIEWPORT);
        game.frame(FRAME, KeyState::default(), 1.5, &mut renderer, &mut NullAudio);
        assert_eq!(game.viewport(), Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn test_progress_loaded_from_store() {
        let mut store = MemoryStore::new();
        store.store_unlocked_level(2).unwrap();
        let mut config = GameConfig::default();
        config.levels = vec![open_level(1), open_level(2)];
        let mut game = Game::new(Arc::new(config), store, 1);
        assert!(game.enter_level(2, 0.0).is_ok());
    }
}
