//! Combat, targeting and monster behaviour
//!
//! Each function is one step of the frame tick and mutates the context in
//! place. Order matters and is fixed by `tick::tick`.

use std::f32::consts::TAU;

use glam::Vec2;

use super::collision::{Rect, circle_hit, clamp_to_map, outside_map};
use super::rng::RandomSource;
use super::state::{
    Archetype, Effect, EffectKind, EntityId, GameEvent, GameState, Item, ItemKind, LossCause,
    MonsterShot, PlayerShot,
};
use crate::config::MonsterStats;
use crate::consts::{EFFECT_LIFETIME, TURRET_BURST_PERIOD};
use crate::{direction_to, unit_from_angle};

/// One turret attack opportunity, chosen from its attack counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurretVolley {
    /// Full ring of projectiles at half speed
    Burst,
    /// Cool-down after a burst
    Skip,
    /// Single jittered shot at the player
    Aimed,
}

impl TurretVolley {
    /// Skips only follow a burst, so the opening opportunities fire aimed
    pub fn for_counter(counter: u32) -> Self {
        match counter % TURRET_BURST_PERIOD {
            0 => TurretVolley::Burst,
            1 | 2 if counter > TURRET_BURST_PERIOD => TurretVolley::Skip,
            _ => TurretVolley::Aimed,
        }
    }
}

/// Velocities for a full burst: `count` shots at equal angular spacing
pub fn burst_velocities(count: u32, speed: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| unit_from_angle(TAU * i as f32 / count as f32) * speed)
        .collect()
}

/// Advance every monster's AI and movement by one tick
pub fn update_monsters(state: &mut GameState, dt: f32, rng: &mut dyn RandomSource) {
    let player_center = state.player.center();
    let player_safe = state.player_in_safe_zone();
    let chase_radius = state.config.ai.chase_radius;
    let wander_chance = state.config.ai.wander_chance;
    let projectile = state.config.projectile.clone();
    let map_size = state.map_size;
    let safe_zone = state.safe_zone;

    let mut volleys: Vec<(EntityId, Vec2, Vec<Vec2>, bool)> = Vec::new();

    for monster in &mut state.monsters {
        match monster.kind.archetype() {
            Archetype::Turret => {
                let origin = monster.center();
                monster.facing = monster.facing.turned_to(player_center.x - origin.x);
                let Some(turret) = monster.turret.as_mut() else {
                    continue;
                };
                turret.cooldown -= dt;
                if turret.cooldown > 0.0 {
                    continue;
                }
                turret.cooldown = turret.interval;
                turret.attack_counter += 1;

                match TurretVolley::for_counter(turret.attack_counter) {
                    TurretVolley::Burst => {
                        let vels = burst_velocities(projectile.spread_count, projectile.monster_speed * 0.5);
                        volleys.push((monster.id, origin, vels, true));
                    }
                    TurretVolley::Skip => {}
                    TurretVolley::Aimed => {
                        let jitter = projectile.aim_jitter;
                        let aim = player_center
                            + Vec2::new(rng.range(-jitter, jitter), rng.range(-jitter, jitter));
                        let mut dir = direction_to(origin, aim);
                        if dir == Vec2::ZERO {
                            dir = Vec2::X;
                        }
                        volleys.push((monster.id, origin, vec![dir * projectile.monster_speed], false));
                    }
                }
                continue;
            }
            Archetype::Tracker => {
                let center = monster.center();
                if !player_safe && center.distance(player_center) <= chase_radius {
                    monster.vel = direction_to(center, player_center) * monster.speed;
                } else if rng.chance(wander_chance) {
                    monster.vel = unit_from_angle(rng.range(0.0, TAU)) * monster.speed;
                }
            }
            Archetype::Normal => {
                if rng.chance(wander_chance) {
                    monster.vel = unit_from_angle(rng.range(0.0, TAU)) * monster.speed;
                }
            }
        }

        monster.facing = monster.facing.turned_to(monster.vel.x);
        let next = clamp_to_map(monster.pos + monster.vel * dt, monster.size, map_size);
        if !safe_zone.overlaps(&Rect { pos: next, size: monster.size }) {
            monster.pos = next;
        }
    }

    for (id, origin, vels, burst) in volleys {
        for vel in vels {
            let shot_id = state.next_entity_id();
            state.monster_shots.push(MonsterShot {
                id: shot_id,
                pos: origin,
                vel,
                radius: projectile.monster_radius,
                targets_player: true,
            });
        }
        state.emit(GameEvent::TurretFired { id, burst });
    }
}

/// First monster in storage order within reach of the player
pub fn find_target(state: &GameState) -> Option<usize> {
    let player = &state.player;
    let center = player.center();
    let base = state.config.attack.base_range + player.size.x * 0.5;
    state
        .monsters
        .iter()
        .position(|m| center.distance(m.center()) <= base + m.half_width())
}

/// End the attack pose once its time is up
pub fn update_attack_pose(state: &mut GameState) {
    let player = &mut state.player;
    if player.attacking && state.elapsed >= player.attack_pose_until {
        player.attacking = false;
    }
}

/// Fire at the first reachable monster if the player may attack.
/// Returns whether a shot was fired.
pub fn auto_attack(state: &mut GameState) -> bool {
    let attack = state.config.attack.clone();
    let player = &state.player;
    if player.moving || player.performing_action {
        return false;
    }
    if let Some(last) = player.last_attack_at {
        if state.elapsed - last < attack.cooldown {
            return false;
        }
    }
    if state.player_in_safe_zone() {
        return false;
    }
    let Some(index) = find_target(state) else {
        return false;
    };

    let target = &state.monsters[index];
    let target_id = target.id;
    let origin = state.player.center();
    let vel = direction_to(origin, target.center()) * state.config.projectile.speed;
    let radius = state.config.projectile.radius;

    let id = state.next_entity_id();
    state.player_shots.push(PlayerShot {
        id,
        pos: origin,
        vel,
        radius,
        target: target_id,
    });

    let now = state.elapsed;
    let player = &mut state.player;
    player.attacking = true;
    player.attack_pose_until = now + attack.animation_duration;
    player.last_attack_at = Some(now);
    state.emit(GameEvent::PlayerFired { target: target_id });
    true
}

/// Move player projectiles and resolve hits against their bound targets
pub fn update_player_shots(state: &mut GameState, dt: f32, rng: &mut dyn RandomSource) {
    let shots = std::mem::take(&mut state.player_shots);
    let mut kept = Vec::with_capacity(shots.len());

    for mut shot in shots {
        shot.pos += shot.vel * dt;
        if outside_map(shot.pos, state.map_size) {
            continue;
        }
        let Some(index) = state.monsters.iter().position(|m| m.id == shot.target) else {
            log::debug!("Shot {:?} lost its target {:?}", shot.id, shot.target);
            continue;
        };
        let target = &state.monsters[index];
        if circle_hit(shot.pos, target.center(), target.half_width()) {
            damage_monster(state, index, rng);
            continue;
        }
        kept.push(shot);
    }

    // Anything fired while resolving stays after the survivors
    kept.append(&mut state.player_shots);
    state.player_shots = kept;
}

/// Move monster projectiles and resolve hits against the player
pub fn update_monster_shots(state: &mut GameState, dt: f32) {
    let shots = std::mem::take(&mut state.monster_shots);
    let mut kept = Vec::with_capacity(shots.len());

    for mut shot in shots {
        shot.pos += shot.vel * dt;
        if outside_map(shot.pos, state.map_size) {
            continue;
        }
        if shot.targets_player && circle_hit(shot.pos, state.player.center(), state.player.size.x * 0.5) {
            state.player.invulnerability.refresh(state.elapsed);
            if !state.player_protected() {
                hurt_player(state);
            }
            continue;
        }
        kept.push(shot);
    }

    kept.append(&mut state.monster_shots);
    state.monster_shots = kept;
}

/// Contact damage from the first overlapping monster
pub fn player_monster_contact(state: &mut GameState) {
    state.player.invulnerability.refresh(state.elapsed);
    if state.player_protected() {
        return;
    }
    let player_rect = state.player.rect();
    if state.monsters.iter().any(|m| m.rect().intersects(&player_rect)) {
        hurt_player(state);
    }
}

/// Collect every uncollected item the player overlaps
pub fn collect_items(state: &mut GameState) {
    let player_rect = state.player.rect();
    let mut collected = Vec::new();
    for item in state.items.iter_mut().filter(|i| !i.collected) {
        if item.rect().intersects(&player_rect) {
            item.collected = true;
            collected.push(item.kind);
        }
    }
    for kind in collected {
        let total = {
            let count = state.item_counts.entry(kind).or_insert(0);
            *count += 1;
            *count
        };
        state.emit(GameEvent::ItemCollected { kind, total });
    }
}

/// Age visual effects and drop expired ones
pub fn age_effects(state: &mut GameState, dt: f32) {
    for effect in &mut state.effects {
        effect.life -= dt;
    }
    state.effects.retain(|e| e.life > 0.0);
}

/// Independent Bernoulli trial per configured item kind
pub fn roll_drops(stats: &MonsterStats, rng: &mut dyn RandomSource) -> Vec<ItemKind> {
    stats
        .drop_rates
        .iter()
        .filter_map(|(&kind, &rate)| rng.chance(rate).then_some(kind))
        .collect()
}

fn hurt_player(state: &mut GameState) {
    if !state.player.take_hit(state.elapsed) {
        return;
    }
    let health = state.player.health;
    log::debug!("Player hit, {} health left", health);
    state.emit(GameEvent::PlayerHurt { health });
    let (center, width) = (state.player.center(), state.player.size.x);
    spawn_effect(state, EffectKind::PlayerHurt, center, width);
    if state.player.is_dead() {
        state.lose(LossCause::HealthDepleted);
    }
}

fn damage_monster(state: &mut GameState, index: usize, rng: &mut dyn RandomSource) {
    let monster = &mut state.monsters[index];
    monster.health = monster.health.saturating_sub(1);
    let id = monster.id;
    state.emit(GameEvent::MonsterHit { id });
    if state.monsters[index].health > 0 {
        return;
    }

    let dead = state.monsters.remove(index);
    state.kills += 1;
    *state.kills_by_kind.entry(dead.kind).or_insert(0) += 1;
    state.emit(GameEvent::MonsterKilled { id: dead.id, kind: dead.kind });
    spawn_effect(state, EffectKind::MonsterDeath, dead.center(), dead.size.x);

    let config = std::sync::Arc::clone(&state.config);
    let Some(stats) = config.monster_stats(dead.kind) else {
        return;
    };
    for kind in roll_drops(stats, rng) {
        let side = config.items.get(&kind).map(|m| m.size).unwrap_or(30.0);
        let size = Vec2::splat(side);
        let id = state.next_entity_id();
        state.items.push(Item {
            id,
            kind,
            pos: dead.center() - size * 0.5,
            size,
            collected: false,
            dropped: true,
        });
        state.emit(GameEvent::ItemDropped { kind });
    }
}

fn spawn_effect(state: &mut GameState, kind: EffectKind, pos: Vec2, radius: f32) {
    state.effects.push(Effect {
        kind,
        pos,
        radius,
        life: EFFECT_LIFETIME,
    });
}
