//! Weighted tile layout for a level's ground grid
//!
//! Each grid cell gets a tile variant from a roll seeded by its row, column,
//! the level number and an epoch. The roll is pushed through five rounds of
//! multiplicative mixing, normalized to [0, 1) and mapped onto cumulative
//! weight buckets. The grid is built once per level entry.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::TileWeight;
use crate::consts::GRID_UNIT;

const MIX_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_OFFSET: u64 = 0x2545_F491_4F6C_DD1D;
const MIX_ROUNDS: usize = 5;
/// Grids above this many cells are not laid out
const MAX_CELLS: usize = 1 << 22;

/// Per-cell tile assignment for one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileLayout {
    pub cols: u32,
    pub rows: u32,
    /// Image ids of the variants that survived validation
    pub variants: Vec<String>,
    /// Row-major variant indices
    cells: Vec<u16>,
}

impl TileLayout {
    /// Layout with no cells (renderer falls back to a solid colour)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Build the grid for a map. Invalid weights are skipped with a warning;
    /// with no usable variants the layout is empty.
    pub fn generate(map_size: Vec2, tiles: &[TileWeight], level: u32, epoch: u64) -> Self {
        let usable: Vec<&TileWeight> = tiles
            .iter()
            .filter(|t| {
                let ok = t.weight.is_finite() && t.weight > 0.0 && !t.image.is_empty();
                if !ok {
                    log::warn!("Ignoring tile variant {:?} with weight {}", t.image, t.weight);
                }
                ok
            })
            .collect();

        if usable.is_empty() || map_size.x <= 0.0 || map_size.y <= 0.0 {
            return Self::empty();
        }

        let weights: Vec<f32> = usable.iter().map(|t| t.weight).collect();
        let cols = (map_size.x / GRID_UNIT).ceil() as u32;
        let rows = (map_size.y / GRID_UNIT).ceil() as u32;

        let count = match (cols as usize).checked_mul(rows as usize) {
            Some(count) if count <= MAX_CELLS => count,
            _ => {
                log::warn!("Level {} map {}x{} is too large to lay out", level, map_size.x, map_size.y);
                return Self::empty();
            }
        };

        let mut cells = Vec::with_capacity(count);
        for row in 0..rows {
            for col in 0..cols {
                let roll = cell_roll(row, col, level, epoch);
                // Weights are all positive here, so a bucket always exists
                let index = pick_weighted(&weights, roll).unwrap_or(0);
                cells.push(index as u16);
            }
        }

        log::debug!("Level {} layout: {}x{} cells, {} variants", level, cols, rows, usable.len());

        Self {
            cols,
            rows,
            variants: usable.into_iter().map(|t| t.image.clone()).collect(),
            cells,
        }
    }

    /// Variant index of a cell
    pub fn get(&self, row: u32, col: u32) -> Option<u16> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let index = row as usize * self.cols as usize + col as usize;
        self.cells.get(index).copied()
    }

    /// Image id of the tile under a world position
    pub fn tile_at(&self, pos: Vec2) -> Option<&str> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let col = (pos.x / GRID_UNIT) as u32;
        let row = (pos.y / GRID_UNIT) as u32;
        let index = self.get(row, col)?;
        self.variants.get(index as usize).map(String::as_str)
    }

    /// Row-major iteration of (row, col, variant index)
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, u16)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i as u32 / cols, i as u32 % cols, v))
    }
}

/// Normalized [0, 1) roll for one cell
pub fn cell_roll(row: u32, col: u32, level: u32, epoch: u64) -> f64 {
    let mut x = ((row as u64) << 40) ^ ((col as u64) << 20) ^ ((level as u64) << 8) ^ epoch ^ MIX_OFFSET;
    for _ in 0..MIX_ROUNDS {
        x = x.wrapping_mul(MIX_MULTIPLIER);
        x ^= x >> 31;
    }
    (x >> 11) as f64 / (1u64 << 53) as f64
}

/// First bucket whose cumulative share reaches `roll`.
///
/// Non-positive weights never win. Float rounding that leaves `roll` above
/// the final cumulative share falls back to the last usable bucket.
pub fn pick_weighted(weights: &[f32], roll: f64) -> Option<usize> {
    let total: f64 = weights
        .iter()
        .filter(|w| w.is_finite() && **w > 0.0)
        .map(|&w| w as f64)
        .sum();
    if total <= 0.0 {
        return None;
    }

    let mut cumulative = 0.0;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if !w.is_finite() || w <= 0.0 {
            continue;
        }
        cumulative += w as f64;
        last = Some(i);
        if cumulative / total >= roll {
            return Some(i);
        }
    }
    last
}
