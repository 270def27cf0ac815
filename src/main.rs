//! Tile Quest entry point
//!
//! Native builds run a headless demo: an autopilot plays through the level
//! set and the run is reported through the log (`RUST_LOG=info`).
//!
//! Usage: `tile-quest [config.json] [save-dir]`

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::sync::Arc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use glam::Vec2;

    use tile_quest::audio::{AudioSink, SoundEffect};
    use tile_quest::config::GameConfig;
    use tile_quest::consts::SIM_DT;
    use tile_quest::persistence::{JsonFileStore, MemoryStore, ProgressStore};
    use tile_quest::platform::KeyState;
    use tile_quest::renderer::NullRenderer;
    use tile_quest::sim::exit::{condition_met, missing_items, player_on_exit};
    use tile_quest::sim::{GameState, RunState};
    use tile_quest::{Game, GameError};

    /// Simulated seconds before the demo gives up
    const MAX_DEMO_SECS: f64 = 1800.0;
    /// Retries per level after a loss
    const MAX_RETRIES: u32 = 3;
    /// Close enough to a waypoint to stop steering
    const ARRIVE_DIST: f32 = 8.0;

    struct LogAudio;

    impl AudioSink for LogAudio {
        fn play(&mut self, effect: SoundEffect) {
            log::debug!("cue {:?}", effect);
        }
    }

    pub fn run() -> Result<(), GameError> {
        let mut args = std::env::args().skip(1);
        let config = match args.next() {
            Some(path) => GameConfig::load_or_default(path),
            None => GameConfig::default(),
        };
        let config = Arc::new(config);
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        log::info!("Tile Quest demo, seed {}, {} levels", seed, config.level_count());

        match args.next() {
            Some(dir) => play(Game::new(config, JsonFileStore::new(dir), seed)),
            None => play(Game::new(config, MemoryStore::new(), seed)),
        }
    }

    fn play<S: ProgressStore>(mut game: Game<S>) -> Result<(), GameError> {
        let start = game.progress().unlocked_level;
        game.enter_level(start, 0.0)?;

        let mut renderer = NullRenderer::default();
        let mut audio = LogAudio;
        let mut now = 0.0_f64;
        let mut frame = 0_u64;
        let mut retries = 0;
        let mut level = start;

        while now < MAX_DEMO_SECS {
            let keys = autopilot(game.state(), frame);
            game.frame(SIM_DT, keys, now, &mut renderer, &mut audio);
            now += SIM_DT as f64;
            frame += 1;

            let run = game.state().run;
            let current = game.state().level_number();
            if current != level && run == RunState::Playing {
                level = current;
                retries = 0;
            }
            match run {
                RunState::Victory => {
                    log::info!("Victory after {:.0}s", now);
                    break;
                }
                RunState::GameOver(cause) if retries < MAX_RETRIES => {
                    retries += 1;
                    log::info!("Level {} lost ({:?}), retry {}", level, cause, retries);
                    game.restart()?;
                }
                RunState::GameOver(cause) => {
                    log::info!("Giving up on level {} ({:?})", level, cause);
                    break;
                }
                _ => {}
            }
        }

        let progress = game.progress();
        log::info!(
            "Demo finished: unlocked {}, completed {:?}, {} frames drawn",
            progress.unlocked_level,
            progress.completed_levels,
            renderer.frames
        );
        for (level, time) in &progress.completion_times {
            log::info!("  level {}: {:.1}s", level, time);
        }
        game.leave_level();
        Ok(())
    }

    /// Head for what the exit still needs, then tap the action key on it
    fn autopilot(state: &GameState, frame: u64) -> KeyState {
        let me = state.player.center();

        if condition_met(&state.level.exit_condition, &state.item_counts) {
            if player_on_exit(state) {
                return KeyState {
                    action: frame % 2 == 0,
                    ..Default::default()
                };
            }
            return steer(me, state.exit.rect.center());
        }

        let needed: Vec<_> = missing_items(&state.level.exit_condition, &state.item_counts)
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        let item = state
            .items
            .iter()
            .filter(|i| !i.collected && needed.contains(&i.kind))
            .map(|i| i.rect().center())
            .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)));
        if let Some(target) = item {
            return steer(me, target);
        }

        // Needed items only drop from monsters: close in, then stand and shoot
        let reach = state.config.attack.base_range * 0.8;
        let monster = state
            .monsters
            .iter()
            .map(|m| m.center())
            .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)));
        match monster {
            Some(target) if target.distance(me) > reach => steer(me, target),
            _ => KeyState::default(),
        }
    }

    fn steer(from: Vec2, to: Vec2) -> KeyState {
        let d = to - from;
        KeyState {
            left: d.x < -ARRIVE_DIST,
            right: d.x > ARRIVE_DIST,
            up: d.y < -ARRIVE_DIST,
            down: d.y > ARRIVE_DIST,
            ..Default::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = demo::run() {
        log::error!("Demo aborted: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    use std::sync::Arc;

    use tile_quest::config::GameConfig;
    use tile_quest::persistence::LocalStorageStore;
    use tile_quest::platform::web;

    // The browser host owns the frame loop; this only prepares a session
    web::init_logging();
    let seed = (web::now_secs() * 1000.0) as u64;
    let game = tile_quest::Game::new(Arc::new(GameConfig::default()), LocalStorageStore::new(), seed);
    log::info!(
        "Tile Quest (wasm) loaded, level {} unlocked",
        game.progress().unlocked_level
    );
}
