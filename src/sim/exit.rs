//! Exit condition evaluation
//!
//! Evaluated only when the player releases the action key while standing on
//! the exit. Unlocking and completion bookkeeping live in `crate::progress`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, ItemKind, RunState};

/// Per-attempt exit state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExitStatus {
    #[default]
    InProgress,
    /// Player tried the exit without the required items
    ConditionUnmet,
    Cleared,
}

/// Every threshold in `condition` is met by `counts`
pub fn condition_met(condition: &BTreeMap<ItemKind, u32>, counts: &BTreeMap<ItemKind, u32>) -> bool {
    condition
        .iter()
        .all(|(kind, &required)| counts.get(kind).copied().unwrap_or(0) >= required)
}

/// Items still needed, as (kind, shortfall)
pub fn missing_items(
    condition: &BTreeMap<ItemKind, u32>,
    counts: &BTreeMap<ItemKind, u32>,
) -> Vec<(ItemKind, u32)> {
    condition
        .iter()
        .filter_map(|(kind, &required)| {
            let have = counts.get(kind).copied().unwrap_or(0);
            (have < required).then_some((*kind, required - have))
        })
        .collect()
}

pub fn player_on_exit(state: &GameState) -> bool {
    state.exit.rect.intersects(&state.player.rect())
}

/// Try to leave through the exit
pub fn try_exit(state: &mut GameState) -> ExitStatus {
    if state.exit_status == ExitStatus::Cleared || !player_on_exit(state) {
        return state.exit_status;
    }

    if condition_met(&state.level.exit_condition, &state.item_counts) {
        state.exit_status = ExitStatus::Cleared;
        state.run = RunState::LevelCleared;
        let level = state.level_number();
        let time = state.elapsed;
        log::info!("Level {} cleared in {:.1}s", level, time);
        state.emit(GameEvent::LevelCleared { level, time });
    } else {
        state.exit_status = ExitStatus::ConditionUnmet;
        log::debug!(
            "Exit blocked, missing {:?}",
            missing_items(&state.level.exit_condition, &state.item_counts)
        );
        state.emit(GameEvent::ExitBlocked);
    }
    state.exit_status
}
