//! Level entry, restart and population
//!
//! Monsters and map items are scattered at random outside the safe zone;
//! the player starts at the map centre on top of the exit.

use std::sync::Arc;

use glam::Vec2;

use super::collision::{Rect, SafeZone};
use super::exit::ExitStatus;
use super::layout::TileLayout;
use super::rng::RandomSource;
use super::state::{Archetype, GameState, Item, ItemKind, Monster, Player, RunState};
use crate::consts::SPAWN_ATTEMPTS;
use crate::unit_from_angle;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level {0} is not configured")]
    UnknownLevel(u32),
}

impl GameState {
    /// Load a level, roll a fresh tile layout and populate it
    pub fn start_level(
        &mut self,
        level: u32,
        epoch: u64,
        rng: &mut dyn RandomSource,
    ) -> Result<(), LevelError> {
        let level_config = self
            .config
            .level(level)
            .cloned()
            .ok_or(LevelError::UnknownLevel(level))?;
        self.level = level_config;
        self.reset_level(Some(epoch), rng);
        log::info!(
            "Level {} started: {}x{} map, {} monsters, {} items, {:.0}s",
            level,
            self.map_size.x,
            self.map_size.y,
            self.monsters.len(),
            self.items.len(),
            self.time_remaining
        );
        Ok(())
    }

    /// Restart the current level, keeping its tile layout
    pub fn restart(&mut self, rng: &mut dyn RandomSource) {
        if self.run == RunState::Lobby {
            return;
        }
        self.reset_level(None, rng);
        log::info!("Level {} restarted", self.level_number());
    }

    /// Drop all level state and go back to the hub
    pub fn return_to_lobby(&mut self) {
        let config = Arc::clone(&self.config);
        *self = GameState::new(config);
    }

    fn reset_level(&mut self, relayout_epoch: Option<u64>, rng: &mut dyn RandomSource) {
        let config = Arc::clone(&self.config);
        let map_size = Vec2::new(self.level.map_width, self.level.map_height);
        let center = map_size * 0.5;

        self.map_size = map_size;
        self.safe_zone = SafeZone::centered(map_size, config.safe_zone_size);
        self.exit.rect = Rect::from_center(center, Vec2::new(config.exit.width, config.exit.height));
        if let Some(epoch) = relayout_epoch {
            self.layout = TileLayout::generate(map_size, &self.level.tiles, self.level.level, epoch);
        }

        self.player = Player::new(&config.player, center, config.invulnerability_for(&self.level));
        self.monsters.clear();
        self.player_shots.clear();
        self.monster_shots.clear();
        self.items.clear();
        self.effects.clear();
        self.item_counts.clear();
        self.kills = 0;
        self.kills_by_kind.clear();
        self.time_remaining = self.level.time_limit;
        self.elapsed = 0.0;
        self.time_ticks = 0;
        self.exit_status = ExitStatus::InProgress;
        self.events.clear();

        self.spawn_monsters(rng);
        self.spawn_map_items(rng);
        self.run = RunState::Playing;
    }

    fn spawn_monsters(&mut self, rng: &mut dyn RandomSource) {
        let config = Arc::clone(&self.config);
        let roster: Vec<_> = self.level.monsters.iter().map(|(k, n)| (*k, *n)).collect();

        for (kind, count) in roster {
            let Some(stats) = config.monster_stats(kind) else {
                log::warn!("No stats for {:?}, skipping {} spawns", kind, count);
                continue;
            };
            for _ in 0..count {
                let size = Vec2::new(stats.width, stats.height);
                let pos = self.spawn_point(size, rng);
                let id = self.next_entity_id();
                let mut monster = Monster::new(id, kind, stats, pos);
                if kind.archetype() != Archetype::Turret {
                    monster.vel = unit_from_angle(rng.range(0.0, std::f32::consts::TAU)) * monster.speed;
                    monster.facing = monster.facing.turned_to(monster.vel.x);
                }
                self.monsters.push(monster);
            }
        }
    }

    fn spawn_map_items(&mut self, rng: &mut dyn RandomSource) {
        let config = Arc::clone(&self.config);
        let wanted: Vec<(ItemKind, u32)> = self.level.map_items.iter().map(|(k, n)| (*k, *n)).collect();

        for (kind, count) in wanted {
            let side = config.items.get(&kind).map(|m| m.size).unwrap_or(30.0);
            for _ in 0..count {
                let size = Vec2::splat(side);
                let pos = self.spawn_point(size, rng);
                let id = self.next_entity_id();
                self.items.push(Item {
                    id,
                    kind,
                    pos,
                    size,
                    collected: false,
                    dropped: false,
                });
            }
        }
    }

    /// Random top-left corner for a box that stays clear of the safe zone
    fn spawn_point(&self, size: Vec2, rng: &mut dyn RandomSource) -> Vec2 {
        let max = (self.map_size - size).max(Vec2::ZERO);
        for _ in 0..SPAWN_ATTEMPTS {
            let pos = Vec2::new(rng.range(0.0, max.x), rng.range(0.0, max.y));
            if !self.safe_zone.overlaps(&Rect { pos, size }) {
                return pos;
            }
        }
        log::warn!("No spawn point found outside the safe zone, using map corner");
        Vec2::ZERO
    }
}
