//! Draw ordering
//!
//! Painter's algorithm: everything is sorted by its bottom edge so objects
//! lower on screen are drawn over objects above them. The sort is stable and
//! the input is built in a fixed collection order, so ties always resolve the
//! same way.

use glam::Vec2;

use crate::sim::{Direction, EffectKind, Facing, GameState, ItemKind, MonsterKind, PlayerAnim};

/// What to draw; the renderer picks the sprite or fallback colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawKind {
    Exit,
    Item(ItemKind),
    Monster {
        kind: MonsterKind,
        facing: Facing,
        /// Remaining health as a fraction of max
        health: f32,
    },
    Player {
        anim: PlayerAnim,
        direction: Direction,
        invulnerable: bool,
    },
    PlayerShot,
    MonsterShot,
    Effect {
        kind: EffectKind,
        /// Remaining life in seconds
        life: f32,
    },
}

/// One entry of the draw list, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub kind: DrawKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Drawable {
    fn rect(kind: DrawKind, pos: Vec2, size: Vec2) -> Self {
        Self { kind, pos, size }
    }

    fn circle(kind: DrawKind, center: Vec2, radius: f32) -> Self {
        Self {
            kind,
            pos: center - Vec2::splat(radius),
            size: Vec2::splat(radius * 2.0),
        }
    }

    /// Sort key
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// Everything visible in the level, sorted for drawing
pub fn compose(state: &GameState) -> Vec<Drawable> {
    let mut list = Vec::with_capacity(
        1 + state.items.len()
            + state.monsters.len()
            + 1
            + state.player_shots.len()
            + state.monster_shots.len()
            + state.effects.len(),
    );

    list.push(Drawable::rect(DrawKind::Exit, state.exit.rect.pos, state.exit.rect.size));

    for item in state.items.iter().filter(|i| !i.collected) {
        list.push(Drawable::rect(DrawKind::Item(item.kind), item.pos, item.size));
    }

    for monster in &state.monsters {
        let health = if monster.max_health == 0 {
            0.0
        } else {
            monster.health as f32 / monster.max_health as f32
        };
        let kind = DrawKind::Monster {
            kind: monster.kind,
            facing: monster.facing,
            health,
        };
        list.push(Drawable::rect(kind, monster.pos, monster.size));
    }

    let player = &state.player;
    let kind = DrawKind::Player {
        anim: player.animation(),
        direction: player.direction,
        invulnerable: player.invulnerability.active,
    };
    list.push(Drawable::rect(kind, player.pos, player.size));

    for shot in &state.player_shots {
        list.push(Drawable::circle(DrawKind::PlayerShot, shot.pos, shot.radius));
    }
    for shot in &state.monster_shots {
        list.push(Drawable::circle(DrawKind::MonsterShot, shot.pos, shot.radius));
    }
    for effect in &state.effects {
        let kind = DrawKind::Effect {
            kind: effect.kind,
            life: effect.life,
        };
        list.push(Drawable::circle(kind, effect.pos, effect.radius));
    }

    // slice::sort_by is stable
    list.sort_by(|a, b| a.bottom().total_cmp(&b.bottom()));
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::{arena, place_monster};
    use crate::sim::{EntityId, Item, MonsterShot};

    #[test]
    fn test_sorted_by_bottom_edge() {
        let mut state = arena();
        place_monster(&mut state, MonsterKind::NormalA, Vec2::new(100.0, 800.0));
        place_monster(&mut state, MonsterKind::NormalB, Vec2::new(100.0, 50.0));

        let list = compose(&state);
        assert!(list.windows(2).all(|w| w[0].bottom() <= w[1].bottom()));
        assert!(matches!(
            list.first().map(|d| d.kind),
            Some(DrawKind::Monster {
                kind: MonsterKind::NormalB,
                ..
            })
        ));
        assert!(matches!(
            list.last().map(|d| d.kind),
            Some(DrawKind::Monster {
                kind: MonsterKind::NormalA,
                ..
            })
        ));
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let mut state = arena();
        // Exit and player share a centre; give the exit the player's size so
        // their bottoms tie exactly
        state.exit.rect.size = state.player.size;
        state.exit.rect.pos = state.player.pos;

        let list = compose(&state);
        let exit = list.iter().position(|d| d.kind == DrawKind::Exit).unwrap();
        let player = list
            .iter()
            .position(|d| matches!(d.kind, DrawKind::Player { .. }))
            .unwrap();
        assert!(exit < player);
    }

    #[test]
    fn test_collected_items_hidden() {
        let mut state = arena();
        for collected in [false, true] {
            let id = state.next_entity_id();
            state.items.push(Item {
                id,
                kind: ItemKind::MapItemB,
                pos: Vec2::new(10.0, 10.0),
                size: Vec2::splat(30.0),
                collected,
                dropped: false,
            });
        }
        let items = compose(&state)
            .iter()
            .filter(|d| matches!(d.kind, DrawKind::Item(_)))
            .count();
        assert_eq!(items, 1);
    }

    #[test]
    fn test_projectile_bottom_uses_radius() {
        let mut state = arena();
        state.monster_shots.push(MonsterShot {
            id: EntityId(900),
            pos: Vec2::new(300.0, 300.0),
            vel: Vec2::ZERO,
            radius: 10.0,
            targets_player: true,
        });
        let shot = compose(&state)
            .into_iter()
            .find(|d| d.kind == DrawKind::MonsterShot)
            .unwrap();
        assert_eq!(shot.bottom(), 310.0);
    }
}
