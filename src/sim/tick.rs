//! Fixed timestep simulation tick
//!
//! Advances one level attempt by one step. Ordering is fixed:
//! input, player movement, monsters, player shots, monster shots, effects,
//! item pickup, timer, auto-attack, contact damage, exit (on action release).

use glam::Vec2;

use super::collision::clamp_to_map;
use super::combat;
use super::exit;
use super::rng::RandomSource;
use super::state::{Direction, GameState, LossCause, RunState};

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Movement intent per axis in [-1, 1]; +y is down
    pub move_dir: Vec2,
    /// Action key held this tick
    pub action_held: bool,
    /// Action key was released this tick
    pub action_released: bool,
    /// Pause toggle
    pub pause_pressed: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, rng: &mut dyn RandomSource) {
    if input.pause_pressed {
        match state.run {
            RunState::Playing => {
                state.run = RunState::Paused;
                return;
            }
            RunState::Paused => state.run = RunState::Playing,
            _ => {}
        }
    }

    if state.run != RunState::Playing {
        return;
    }

    state.time_ticks += 1;
    state.elapsed += dt;

    let dir = resolve_input(state, input);
    move_player(state, dir, dt);

    combat::update_monsters(state, dt, rng);
    combat::update_player_shots(state, dt, rng);
    combat::update_monster_shots(state, dt);
    if state.run != RunState::Playing {
        return;
    }

    combat::age_effects(state, dt);
    combat::collect_items(state);

    state.time_remaining = (state.time_remaining - dt).max(0.0);
    if state.time_remaining <= 0.0 {
        state.lose(LossCause::TimeExpired);
        return;
    }

    combat::update_attack_pose(state);
    combat::auto_attack(state);

    combat::player_monster_contact(state);
    if state.run != RunState::Playing {
        return;
    }

    if input.action_released {
        exit::try_exit(state);
    }
}

/// Update player mode flags and facing; returns the unit move direction
fn resolve_input(state: &mut GameState, input: &TickInput) -> Vec2 {
    let dir = input.move_dir.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    let player = &mut state.player;
    player.moving = dir != Vec2::ZERO;
    player.performing_action = input.action_held;

    if dir.x != 0.0 && dir.x.abs() >= dir.y.abs() {
        player.direction = if dir.x > 0.0 { Direction::Right } else { Direction::Left };
    } else if dir.y != 0.0 {
        player.direction = if dir.y > 0.0 { Direction::Down } else { Direction::Up };
    }
    dir.normalize_or_zero()
}

fn move_player(state: &mut GameState, dir: Vec2, dt: f32) {
    let map_size = state.map_size;
    let player = &mut state.player;
    if !player.moving {
        return;
    }
    let next = player.pos + dir * player.speed * dt;
    player.pos = clamp_to_map(next, player.size, map_size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::exit::ExitStatus;
    use crate::sim::rng::{ScriptedRng, SimRng};
    use crate::sim::state::{GameEvent, Item, ItemKind, MonsterKind, PlayerAnim};
    use crate::sim::test_support::{arena, arena_with_exit, place_monster};

    fn rng() -> ScriptedRng {
        ScriptedRng::constant(0.5)
    }

    #[test]
    fn test_tick_pause() {
        let mut state = arena();
        let mut rng = rng();
        let pause = TickInput {
            pause_pressed: true,
            ..Default::default()
        };

        tick(&mut state, &pause, SIM_DT, &mut rng);
        assert_eq!(state.run, RunState::Paused);
        let ticks = state.time_ticks;

        // Paused: nothing advances
        tick(&mut state, &TickInput::default(), SIM_DT, &mut rng);
        assert_eq!(state.time_ticks, ticks);

        tick(&mut state, &pause, SIM_DT, &mut rng);
        assert_eq!(state.run, RunState::Playing);
        assert_eq!(state.time_ticks, ticks + 1);
    }

    #[test]
    fn test_player_moves_and_faces() {
        let mut state = arena();
        let mut rng = rng();
        let start = state.player.pos;
        let input = TickInput {
            move_dir: Vec2::new(-1.0, 0.0),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &mut rng);
        assert_eq!(state.player.direction, Direction::Left);
        assert!(state.player.pos.x < start.x);
        assert_eq!(state.player.pos.y, start.y);
        assert_eq!(state.player.animation(), PlayerAnim::Moving);

        let input = TickInput {
            move_dir: Vec2::new(0.0, 1.0),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &mut rng);
        assert_eq!(state.player.direction, Direction::Down);
    }

    #[test]
    fn test_player_clamped_to_map() {
        let mut state = arena();
        let mut rng = rng();
        state.player.pos = Vec2::new(1.0, 1.0);
        let input = TickInput {
            move_dir: Vec2::new(-1.0, -1.0),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &mut rng);
        assert_eq!(state.player.pos, Vec2::ZERO);
    }

    #[test]
    fn test_timer_expiry_ends_run() {
        let mut state = arena();
        let mut rng = rng();
        state.time_remaining = SIM_DT * 1.5;
        tick(&mut state, &TickInput::default(), SIM_DT, &mut rng);
        assert_eq!(state.run, RunState::Playing);
        tick(&mut state, &TickInput::default(), SIM_DT, &mut rng);
        assert_eq!(state.run, RunState::GameOver(LossCause::TimeExpired));
        assert!(state.events.contains(&GameEvent::GameOver(LossCause::TimeExpired)));

        // Terminal: further ticks do nothing
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT, &mut rng);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_exit_needs_items() {
        let mut state = arena_with_exit(&[(ItemKind::MapItemA, 1)]);
        let mut rng = rng();
        let release = TickInput {
            action_released: true,
            ..Default::default()
        };

        tick(&mut state, &release, SIM_DT, &mut rng);
        assert_eq!(state.exit_status, ExitStatus::ConditionUnmet);
        assert_eq!(state.run, RunState::Playing);

        // Drop the required item onto the player
        let id = state.next_entity_id();
        state.items.push(Item {
            id,
            kind: ItemKind::MapItemA,
            pos: state.player.pos,
            size: Vec2::splat(20.0),
            collected: false,
            dropped: false,
        });
        tick(&mut state, &release, SIM_DT, &mut rng);
        assert_eq!(state.item_count(ItemKind::MapItemA), 1);
        assert_eq!(state.exit_status, ExitStatus::Cleared);
        assert_eq!(state.run, RunState::LevelCleared);
    }

    #[test]
    fn test_exit_only_on_release() {
        let mut state = arena_with_exit(&[]);
        let mut rng = rng();
        let held = TickInput {
            action_held: true,
            ..Default::default()
        };
        tick(&mut state, &held, SIM_DT, &mut rng);
        assert_eq!(state.exit_status, ExitStatus::InProgress);
        assert_eq!(state.player.animation(), PlayerAnim::PerformingAction);
    }

    #[test]
    fn test_exit_requires_standing_on_it() {
        let mut state = arena_with_exit(&[]);
        let mut rng = rng();
        state.player.pos = Vec2::new(10.0, 10.0);
        let release = TickInput {
            action_released: true,
            ..Default::default()
        };
        tick(&mut state, &release, SIM_DT, &mut rng);
        assert_eq!(state.exit_status, ExitStatus::InProgress);
    }

    #[test]
    fn test_moving_player_does_not_attack() {
        let mut state = arena();
        let mut rng = rng();
        state.player.pos = Vec2::new(100.0, 100.0);
        place_monster(&mut state, MonsterKind::NormalA, Vec2::new(250.0, 100.0));
        let walk = TickInput {
            move_dir: Vec2::new(0.0, 1.0),
            ..Default::default()
        };
        tick(&mut state, &walk, SIM_DT, &mut rng);
        assert!(state.player_shots.is_empty());

        tick(&mut state, &TickInput::default(), SIM_DT, &mut rng);
        assert_eq!(state.player_shots.len(), 1);
        assert_eq!(state.player.animation(), PlayerAnim::Attacking);
    }

    #[test]
    fn test_determinism() {
        let mut a = crate::sim::test_support::populated(3);
        let mut b = crate::sim::test_support::populated(3);
        let mut rng_a = SimRng::new(77);
        let mut rng_b = SimRng::new(77);

        let inputs = [
            TickInput {
                move_dir: Vec2::new(1.0, 0.0),
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                move_dir: Vec2::new(0.0, -1.0),
                ..Default::default()
            },
        ];
        for _ in 0..200 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT, &mut rng_a);
                tick(&mut b, input, SIM_DT, &mut rng_b);
            }
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.monsters.len(), b.monsters.len());
        for (ma, mb) in a.monsters.iter().zip(&b.monsters) {
            assert_eq!(ma.pos, mb.pos);
        }
    }
}
