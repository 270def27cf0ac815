//! Level unlocks and completions
//!
//! Persisted through a `ProgressStore`; completion times are kept for the
//! session only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::ProgressStore;

/// What happens after a level is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Continue to this level
    Next(u32),
    /// The last level was cleared
    Victory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Highest level the player may enter
    pub unlocked_level: u32,
    /// Cleared levels in completion order, no duplicates
    pub completed_levels: Vec<u32>,
    /// Best clear time per level (seconds)
    #[serde(skip)]
    pub completion_times: BTreeMap<u32, f32>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            unlocked_level: 1,
            completed_levels: Vec::new(),
            completion_times: BTreeMap::new(),
        }
    }
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.unlocked_level
    }

    pub fn is_completed(&self, level: u32) -> bool {
        self.completed_levels.contains(&level)
    }

    pub fn best_time(&self, level: u32) -> Option<f32> {
        self.completion_times.get(&level).copied()
    }

    /// Record a clear. Idempotent for the completed list; keeps the best time.
    pub fn complete_level(&mut self, level: u32, time: f32, last_level: u32) -> Advance {
        if !self.is_completed(level) {
            self.completed_levels.push(level);
        }
        self.completion_times
            .entry(level)
            .and_modify(|best| *best = best.min(time))
            .or_insert(time);

        if level >= last_level {
            log::info!("Final level {} cleared", level);
            return Advance::Victory;
        }
        if level == self.unlocked_level {
            self.unlocked_level = level + 1;
            log::info!("Level {} unlocked", self.unlocked_level);
        }
        Advance::Next(level + 1)
    }

    /// Read progress, falling back to "level 1 only, nothing completed"
    pub fn load(store: &dyn ProgressStore) -> Self {
        let unlocked_level = match store.load_unlocked_level() {
            Ok(level) => level.unwrap_or(1).max(1),
            Err(e) => {
                log::warn!("Failed to read unlocked level, starting fresh: {}", e);
                return Self::default();
            }
        };
        let completed_levels = match store.load_completed_levels() {
            Ok(levels) => dedup_in_order(levels.unwrap_or_default()),
            Err(e) => {
                log::warn!("Failed to read completed levels, starting fresh: {}", e);
                return Self::default();
            }
        };
        log::info!(
            "Loaded progress: unlocked {}, {} completed",
            unlocked_level,
            completed_levels.len()
        );
        Self {
            unlocked_level,
            completed_levels,
            completion_times: BTreeMap::new(),
        }
    }

    /// Best-effort write; failures are logged, never retried
    pub fn save(&self, store: &mut dyn ProgressStore) {
        if let Err(e) = store.store_unlocked_level(self.unlocked_level) {
            log::warn!("Failed to save unlocked level: {}", e);
        }
        if let Err(e) = store.store_completed_levels(&self.completed_levels) {
            log::warn!("Failed to save completed levels: {}", e);
        }
    }
}

fn dedup_in_order(levels: Vec<u32>) -> Vec<u32> {
    let mut out = Vec::with_capacity(levels.len());
    for level in levels {
        if !out.contains(&level) {
            out.push(level);
        }
    }
    out
}
