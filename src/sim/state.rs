//! Entity records and the simulation context
//!
//! `GameState` owns everything one level attempt mutates. It is passed
//! explicitly to every system; nothing lives in globals.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, SafeZone};
use super::exit::ExitStatus;
use super::layout::TileLayout;
use crate::config::{GameConfig, LevelConfig, MonsterStats, PlayerParams};

/// Stable handle to a spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Monster kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonsterKind {
    NormalA,
    NormalB,
    NormalC,
    TrackerA,
    TrackerB,
    Turret,
}

/// Behaviour archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    /// Always wanders
    Normal,
    /// Chases the player when close, wanders otherwise
    Tracker,
    /// Stationary, fires volleys on a cooldown
    Turret,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 6] = [
        MonsterKind::NormalA,
        MonsterKind::NormalB,
        MonsterKind::NormalC,
        MonsterKind::TrackerA,
        MonsterKind::TrackerB,
        MonsterKind::Turret,
    ];

    pub fn archetype(&self) -> Archetype {
        match self {
            MonsterKind::NormalA | MonsterKind::NormalB | MonsterKind::NormalC => Archetype::Normal,
            MonsterKind::TrackerA | MonsterKind::TrackerB => Archetype::Tracker,
            MonsterKind::Turret => Archetype::Turret,
        }
    }
}

/// Item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    MapItemA,
    MapItemB,
    MonsterItemA,
    MonsterItemB,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::MapItemA,
        ItemKind::MapItemB,
        ItemKind::MonsterItemA,
        ItemKind::MonsterItemB,
    ];
}

/// Player facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// Horizontal facing for monsters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing implied by a horizontal component; zero keeps `self`
    pub fn turned_to(self, dx: f32) -> Facing {
        if dx > 0.0 {
            Facing::Right
        } else if dx < 0.0 {
            Facing::Left
        } else {
            self
        }
    }
}

/// Displayed player animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAnim {
    Idle,
    Moving,
    Attacking,
    PerformingAction,
}

/// Post-hit invulnerability window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Invulnerability {
    pub active: bool,
    pub started_at: f32,
    pub duration: f32,
}

impl Invulnerability {
    pub fn new(duration: f32) -> Self {
        Self {
            active: false,
            started_at: 0.0,
            duration,
        }
    }

    pub fn start(&mut self, now: f32) {
        self.active = true;
        self.started_at = now;
    }

    /// Clear the window once `duration` has elapsed
    pub fn refresh(&mut self, now: f32) {
        if self.active && now - self.started_at >= self.duration {
            self.active = false;
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub direction: Direction,
    pub moving: bool,
    /// Attack pose is showing
    pub attacking: bool,
    /// Action key held (interaction pose)
    pub performing_action: bool,
    /// Simulation time of the last shot
    pub last_attack_at: Option<f32>,
    /// Simulation time the attack pose ends
    pub attack_pose_until: f32,
    pub invulnerability: Invulnerability,
}

impl Player {
    /// Player centred on `center`
    pub fn new(params: &PlayerParams, center: Vec2, invulnerability_duration: f32) -> Self {
        let size = Vec2::new(params.width, params.height);
        Self {
            pos: center - size * 0.5,
            size,
            speed: params.speed,
            health: params.max_health,
            max_health: params.max_health,
            direction: Direction::default(),
            moving: false,
            attacking: false,
            performing_action: false,
            last_attack_at: None,
            attack_pose_until: 0.0,
            invulnerability: Invulnerability::new(invulnerability_duration),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// PerformingAction > Attacking > Moving > Idle
    pub fn animation(&self) -> PlayerAnim {
        if self.performing_action {
            PlayerAnim::PerformingAction
        } else if self.attacking {
            PlayerAnim::Attacking
        } else if self.moving {
            PlayerAnim::Moving
        } else {
            PlayerAnim::Idle
        }
    }

    /// Apply one point of damage unless invulnerable. Returns whether it landed.
    pub fn take_hit(&mut self, now: f32) -> bool {
        if self.invulnerability.active {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.invulnerability.start(now);
        true
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// Turret-only fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurretState {
    /// Seconds until the next attack opportunity
    pub cooldown: f32,
    /// Attack opportunities so far
    pub attack_counter: u32,
    /// Seconds between opportunities
    pub interval: f32,
}

/// A live monster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub kind: MonsterKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub speed: f32,
    pub vel: Vec2,
    pub facing: Facing,
    pub turret: Option<TurretState>,
}

impl Monster {
    pub fn new(id: EntityId, kind: MonsterKind, stats: &MonsterStats, pos: Vec2) -> Self {
        let turret = (kind.archetype() == Archetype::Turret).then(|| TurretState {
            cooldown: stats.attack_cooldown,
            attack_counter: 0,
            interval: stats.attack_cooldown,
        });
        Self {
            id,
            kind,
            pos,
            size: Vec2::new(stats.width, stats.height),
            health: stats.health.max(1),
            max_health: stats.health.max(1),
            speed: stats.speed,
            vel: Vec2::ZERO,
            facing: Facing::default(),
            turret,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn half_width(&self) -> f32 {
        self.size.x * 0.5
    }
}

/// Player projectile bound to a target monster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerShot {
    pub id: EntityId,
    /// Centre
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub target: EntityId,
}

/// Monster projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterShot {
    pub id: EntityId,
    /// Centre
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub targets_player: bool,
}

/// Map-spawned or monster-dropped item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub collected: bool,
    pub dropped: bool,
}

impl Item {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

/// Level exit, fixed at the map centre
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    pub rect: Rect,
}

/// Visual-only effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    MonsterDeath,
    PlayerHurt,
}

/// Short-lived visual burst (not gameplay-affecting)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub radius: f32,
    /// Seconds remaining
    pub life: f32,
}

/// Why a run ended in defeat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossCause {
    HealthDepleted,
    TimeExpired,
}

/// Overall run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// No level loaded (hub / level select)
    Lobby,
    Playing,
    Paused,
    /// Exit satisfied; waiting for the session to advance
    LevelCleared,
    GameOver(LossCause),
    /// Final level cleared
    Victory,
}

impl RunState {
    /// A level is loaded and should be drawn
    pub fn has_level(&self) -> bool {
        !matches!(self, RunState::Lobby)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::GameOver(_) | RunState::Victory)
    }
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerFired { target: EntityId },
    MonsterHit { id: EntityId },
    MonsterKilled { id: EntityId, kind: MonsterKind },
    ItemDropped { kind: ItemKind },
    ItemCollected { kind: ItemKind, total: u32 },
    PlayerHurt { health: u32 },
    TurretFired { id: EntityId, burst: bool },
    ExitBlocked,
    LevelCleared { level: u32, time: f32 },
    GameOver(LossCause),
}

/// Complete simulation context for one level attempt
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: Arc<GameConfig>,
    /// Active level parameters (default while in the lobby)
    pub level: LevelConfig,
    pub run: RunState,
    pub map_size: Vec2,
    pub layout: TileLayout,
    pub safe_zone: SafeZone,
    pub exit: Exit,
    pub exit_status: ExitStatus,
    pub player: Player,
    /// Live monsters, in spawn order
    pub monsters: Vec<Monster>,
    pub player_shots: Vec<PlayerShot>,
    pub monster_shots: Vec<MonsterShot>,
    pub items: Vec<Item>,
    pub effects: Vec<Effect>,
    /// Collected items per kind
    pub item_counts: BTreeMap<ItemKind, u32>,
    pub kills: u32,
    pub kills_by_kind: BTreeMap<MonsterKind, u32>,
    /// Seconds left on the level timer
    pub time_remaining: f32,
    /// Seconds simulated since level start
    pub elapsed: f32,
    pub time_ticks: u64,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Empty context sitting in the lobby
    pub fn new(config: Arc<GameConfig>) -> Self {
        let player = Player::new(&config.player, Vec2::ZERO, config.player.invulnerability_duration);
        Self {
            config,
            level: LevelConfig::default(),
            run: RunState::Lobby,
            map_size: Vec2::ZERO,
            layout: TileLayout::empty(),
            safe_zone: SafeZone::centered(Vec2::ZERO, 0.0),
            exit: Exit {
                rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            },
            exit_status: ExitStatus::InProgress,
            player,
            monsters: Vec::new(),
            player_shots: Vec::new(),
            monster_shots: Vec::new(),
            items: Vec::new(),
            effects: Vec::new(),
            item_counts: BTreeMap::new(),
            kills: 0,
            kills_by_kind: BTreeMap::new(),
            time_remaining: 0.0,
            elapsed: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn level_number(&self) -> u32 {
        self.level.level
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn player_in_safe_zone(&self) -> bool {
        self.safe_zone.contains(self.player.center())
    }

    /// Player ignores contact and projectile damage
    pub fn player_protected(&self) -> bool {
        self.player.invulnerability.active || self.player_in_safe_zone()
    }

    pub fn item_count(&self, kind: ItemKind) -> u32 {
        self.item_counts.get(&kind).copied().unwrap_or(0)
    }

    /// End the run in defeat (only from active play)
    pub fn lose(&mut self, cause: LossCause) {
        if !matches!(self.run, RunState::Playing) {
            return;
        }
        if cause == LossCause::HealthDepleted {
            self.player.health = 0;
        }
        log::info!("Level {} lost: {:?}", self.level_number(), cause);
        self.run = RunState::GameOver(cause);
        self.emit(GameEvent::GameOver(cause));
    }

    pub fn monster(&self, id: EntityId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }
}
