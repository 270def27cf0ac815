//! Axis-aligned geometry shared by every rule
//!
//! World space is top-left origin, y growing downward. Entities are boxes
//! anchored at their top-left corner; projectiles are points with a radius.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size * 0.5,
            size,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Bottom edge, used as the depth key when compositing
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Inclusive point test
    pub fn contains_point(&self, p: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    /// Strict overlap (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

/// Square region at the map centre where the player is protected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub area: Rect,
}

impl SafeZone {
    pub fn centered(map_size: Vec2, side: f32) -> Self {
        Self {
            area: Rect::from_center(map_size * 0.5, Vec2::splat(side.max(0.0))),
        }
    }

    /// A point (usually an entity centre) lies inside the zone
    pub fn contains(&self, point: Vec2) -> bool {
        self.area.contains_point(point)
    }

    /// A box would occupy part of the zone
    pub fn overlaps(&self, rect: &Rect) -> bool {
        self.area.intersects(rect)
    }
}

/// Circular proximity test used for projectile hits
#[inline]
pub fn circle_hit(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) < radius * radius
}

/// Clamp a box's top-left corner so the box stays inside the map
pub fn clamp_to_map(pos: Vec2, size: Vec2, map_size: Vec2) -> Vec2 {
    pos.clamp(Vec2::ZERO, (map_size - size).max(Vec2::ZERO))
}

/// A point has left the map
pub fn outside_map(point: Vec2, map_size: Vec2) -> bool {
    point.x < 0.0 || point.y < 0.0 || point.x > map_size.x || point.y > map_size.y
}
