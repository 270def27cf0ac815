//! Data-driven level, monster and item tables
//!
//! Loaded once from a JSON document and never mutated while a level runs.
//! Every section is optional: missing keys fall back to the built-in set,
//! and an unreadable document falls back to the full 4-level default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{DEFAULT_CHASE_RADIUS, DEFAULT_WANDER_CHANCE};
use crate::sim::{ItemKind, MonsterKind};

/// Errors raised while reading a config document
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config defines no levels")]
    NoLevels,

    #[error("level {0} is defined more than once")]
    DuplicateLevel(u32),

    #[error("levels must be numbered 1, 2, 3...; expected level {expected}, found {found}")]
    LevelGap { expected: u32, found: u32 },

    #[error("invalid tile entry: {0}")]
    InvalidTile(String),
}

/// Player defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerParams {
    pub width: f32,
    pub height: f32,
    /// Units per second
    pub speed: f32,
    pub max_health: u32,
    /// Seconds of invulnerability after taking a hit
    pub invulnerability_duration: f32,
}

impl Default for PlayerParams {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            speed: 250.0,
            max_health: 5,
            invulnerability_duration: 1.5,
        }
    }
}

/// Auto-attack parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttackParams {
    /// Reach beyond the touching distance of player and target
    pub base_range: f32,
    /// Seconds between shots
    pub cooldown: f32,
    /// Seconds the attack pose is held after a shot
    pub animation_duration: f32,
}

impl Default for AttackParams {
    fn default() -> Self {
        Self {
            base_range: 300.0,
            cooldown: 0.6,
            animation_duration: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectileParams {
    /// Player projectile speed (units per second)
    pub speed: f32,
    pub radius: f32,
    /// Aimed turret shot speed; bursts travel at half of this
    pub monster_speed: f32,
    pub monster_radius: f32,
    /// Maximum offset added to each axis of a turret's aim point
    pub aim_jitter: f32,
    /// Projectiles in a full turret burst
    pub spread_count: u32,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            speed: 600.0,
            radius: 8.0,
            monster_speed: 260.0,
            monster_radius: 10.0,
            aim_jitter: 40.0,
            spread_count: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiParams {
    /// Trackers chase when the player is within this distance
    pub chase_radius: f32,
    /// Per-tick probability of re-rolling a wander velocity
    pub wander_chance: f32,
}

impl Default for AiParams {
    fn default() -> Self {
        Self {
            chase_radius: DEFAULT_CHASE_RADIUS,
            wander_chance: DEFAULT_WANDER_CHANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExitParams {
    pub width: f32,
    pub height: f32,
}

impl Default for ExitParams {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// Per-kind monster stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonsterStats {
    pub health: u32,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    /// Seconds between turret volleys (ignored by walkers)
    pub attack_cooldown: f32,
    /// Independent drop probability per item kind
    pub drop_rates: BTreeMap<ItemKind, f32>,
}

impl Default for MonsterStats {
    fn default() -> Self {
        Self {
            health: 2,
            speed: 60.0,
            width: 40.0,
            height: 40.0,
            color: "#6ab04c".to_string(),
            attack_cooldown: 1.2,
            drop_rates: BTreeMap::new(),
        }
    }
}

impl MonsterStats {
    fn new(health: u32, speed: f32, size: f32, color: &str, drops: &[(ItemKind, f32)]) -> Self {
        Self {
            health,
            speed,
            width: size,
            height: size,
            color: color.to_string(),
            attack_cooldown: 1.2,
            drop_rates: drops.iter().copied().collect(),
        }
    }
}

/// Per-kind item presentation data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemMeta {
    pub name: String,
    pub color: String,
    pub size: f32,
}

impl Default for ItemMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: "#ffffff".to_string(),
            size: 30.0,
        }
    }
}

impl ItemMeta {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            ..Self::default()
        }
    }
}

/// A weighted tile variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileWeight {
    pub image: String,
    pub weight: f32,
}

impl TileWeight {
    pub fn new(image: &str, weight: f32) -> Self {
        Self {
            image: image.to_string(),
            weight,
        }
    }

    /// Parse and validate a single raw tile entry
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let tile: TileWeight = serde_json::from_value(value.clone())
            .map_err(|e| ConfigError::InvalidTile(e.to_string()))?;
        if tile.image.trim().is_empty() {
            return Err(ConfigError::InvalidTile("empty image id".to_string()));
        }
        if !tile.weight.is_finite() || tile.weight <= 0.0 {
            return Err(ConfigError::InvalidTile(format!(
                "weight {} for {} must be positive",
                tile.weight, tile.image
            )));
        }
        Ok(tile)
    }
}

/// Skip malformed tile entries one by one instead of rejecting the document
fn lenient_tiles<'de, D>(deserializer: D) -> Result<Vec<TileWeight>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .iter()
        .enumerate()
        .filter_map(|(i, value)| match TileWeight::from_value(value) {
            Ok(tile) => Some(tile),
            Err(e) => {
                log::warn!("Skipping tile entry #{}: {}", i, e);
                None
            }
        })
        .collect())
}

/// One level's parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelConfig {
    /// 1-based level number
    pub level: u32,
    pub map_width: f32,
    pub map_height: f32,
    pub monsters: BTreeMap<MonsterKind, u32>,
    pub map_items: BTreeMap<ItemKind, u32>,
    /// Seconds
    pub time_limit: f32,
    /// Required item counts, all AND'ed; empty means always clearable
    pub exit_condition: BTreeMap<ItemKind, u32>,
    #[serde(deserialize_with = "lenient_tiles")]
    pub tiles: Vec<TileWeight>,
    /// Overrides the player's default invulnerability window
    pub invulnerability_duration: Option<f32>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            level: 1,
            map_width: 2000.0,
            map_height: 2000.0,
            monsters: BTreeMap::new(),
            map_items: BTreeMap::new(),
            time_limit: 180.0,
            exit_condition: BTreeMap::new(),
            tiles: Vec::new(),
            invulnerability_duration: None,
        }
    }
}

/// The complete configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub player: PlayerParams,
    pub attack: AttackParams,
    pub projectile: ProjectileParams,
    pub ai: AiParams,
    /// Side length of the square safe zone at the map centre
    pub safe_zone_size: f32,
    pub exit: ExitParams,
    pub monsters: BTreeMap<MonsterKind, MonsterStats>,
    pub items: BTreeMap<ItemKind, ItemMeta>,
    pub levels: Vec<LevelConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        use ItemKind::*;
        use MonsterKind::*;

        let monsters = BTreeMap::from([
            (NormalA, MonsterStats::new(2, 60.0, 40.0, "#6ab04c", &[(MonsterItemA, 0.3)])),
            (
                NormalB,
                MonsterStats::new(3, 80.0, 45.0, "#e1b12c", &[(MonsterItemA, 0.2), (MonsterItemB, 0.1)]),
            ),
            (NormalC, MonsterStats::new(4, 50.0, 55.0, "#c23616", &[(MonsterItemB, 0.3)])),
            (TrackerA, MonsterStats::new(2, 110.0, 40.0, "#8c7ae6", &[(MonsterItemA, 0.4)])),
            (TrackerB, MonsterStats::new(3, 140.0, 45.0, "#0097e6", &[(MonsterItemB, 0.4)])),
            (
                Turret,
                MonsterStats::new(6, 0.0, 60.0, "#353b48", &[(MonsterItemA, 0.5), (MonsterItemB, 0.5)]),
            ),
        ]);

        let items = BTreeMap::from([
            (MapItemA, ItemMeta::new("Rune Shard", "#f5d142")),
            (MapItemB, ItemMeta::new("Moon Herb", "#44bd32")),
            (MonsterItemA, ItemMeta::new("Fang", "#dcdde1")),
            (MonsterItemB, ItemMeta::new("Ember Core", "#e84118")),
        ]);

        let meadow = vec![
            TileWeight::new("grass", 6.0),
            TileWeight::new("flowers", 2.0),
            TileWeight::new("stones", 1.0),
        ];
        let cavern = vec![
            TileWeight::new("cave_floor", 5.0),
            TileWeight::new("cave_moss", 2.0),
            TileWeight::new("cave_crack", 1.0),
        ];

        let levels = vec![
            LevelConfig {
                level: 1,
                map_width: 2000.0,
                map_height: 2000.0,
                monsters: BTreeMap::from([(NormalA, 8), (NormalB, 4)]),
                map_items: BTreeMap::from([(MapItemA, 3)]),
                time_limit: 180.0,
                exit_condition: BTreeMap::from([(MapItemA, 1)]),
                tiles: meadow.clone(),
                invulnerability_duration: None,
            },
            LevelConfig {
                level: 2,
                map_width: 2400.0,
                map_height: 2400.0,
                monsters: BTreeMap::from([(NormalA, 6), (NormalB, 4), (TrackerA, 4)]),
                map_items: BTreeMap::from([(MapItemA, 3), (MapItemB, 2)]),
                time_limit: 200.0,
                exit_condition: BTreeMap::from([(MapItemA, 2), (MonsterItemA, 2)]),
                tiles: meadow,
                invulnerability_duration: None,
            },
            LevelConfig {
                level: 3,
                map_width: 2800.0,
                map_height: 2800.0,
                monsters: BTreeMap::from([(NormalC, 6), (TrackerA, 4), (TrackerB, 3), (Turret, 2)]),
                map_items: BTreeMap::from([(MapItemB, 3)]),
                time_limit: 240.0,
                exit_condition: BTreeMap::from([(MapItemB, 2), (MonsterItemB, 2)]),
                tiles: cavern.clone(),
                invulnerability_duration: Some(1.2),
            },
            LevelConfig {
                level: 4,
                map_width: 3200.0,
                map_height: 3200.0,
                monsters: BTreeMap::from([
                    (NormalA, 4),
                    (NormalB, 4),
                    (NormalC, 4),
                    (TrackerA, 4),
                    (TrackerB, 4),
                    (Turret, 4),
                ]),
                map_items: BTreeMap::from([(MapItemA, 3), (MapItemB, 3)]),
                time_limit: 300.0,
                exit_condition: BTreeMap::from([
                    (MapItemA, 2),
                    (MapItemB, 2),
                    (MonsterItemA, 3),
                    (MonsterItemB, 3),
                ]),
                tiles: cavern,
                invulnerability_duration: Some(1.0),
            },
        ];

        Self {
            player: PlayerParams::default(),
            attack: AttackParams::default(),
            projectile: ProjectileParams::default(),
            ai: AiParams::default(),
            safe_zone_size: 400.0,
            exit: ExitParams::default(),
            monsters,
            items,
            levels,
        }
    }
}

impl GameConfig {
    /// Parse a config document and validate its level table
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {} ({} levels)", path.display(), config.level_count());
        Ok(config)
    }

    /// Load a config document, substituting the built-in set on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using built-in defaults", e);
                Self::default()
            }
        }
    }

    /// Sort levels, reject duplicates and gaps, fill monster kinds the document omitted
    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        self.levels.sort_by_key(|l| l.level);
        if let Some(pair) = self.levels.windows(2).find(|w| w[0].level == w[1].level) {
            return Err(ConfigError::DuplicateLevel(pair[0].level));
        }
        // Unlocking walks level numbers one at a time
        for (expected, level) in (1..).zip(&self.levels) {
            if level.level != expected {
                return Err(ConfigError::LevelGap {
                    expected,
                    found: level.level,
                });
            }
        }

        let defaults = Self::default();
        for (kind, stats) in defaults.monsters {
            self.monsters.entry(kind).or_insert(stats);
        }
        for (kind, meta) in defaults.items {
            self.items.entry(kind).or_insert(meta);
        }
        Ok(())
    }

    pub fn level(&self, level: u32) -> Option<&LevelConfig> {
        self.levels.iter().find(|l| l.level == level)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Highest configured level number
    pub fn last_level(&self) -> u32 {
        self.levels.iter().map(|l| l.level).max().unwrap_or(1)
    }

    pub fn monster_stats(&self, kind: MonsterKind) -> Option<&MonsterStats> {
        self.monsters.get(&kind)
    }

    /// Invulnerability window for a level (per-level override or player default)
    pub fn invulnerability_for(&self, level: &LevelConfig) -> f32 {
        level
            .invulnerability_duration
            .unwrap_or(self.player.invulnerability_duration)
    }
}
