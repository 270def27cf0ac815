//! Player-centred camera clamped to the map

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position of the viewport's top-left corner
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    /// Centre on `focus` without showing space beyond the map edges.
    /// A map smaller than the viewport is centred instead.
    pub fn follow(focus: Vec2, viewport: Vec2, map_size: Vec2) -> Self {
        let wanted = focus - viewport * 0.5;
        let max = map_size - viewport;
        let axis = |want: f32, max: f32| {
            if max <= 0.0 {
                max * 0.5
            } else {
                want.clamp(0.0, max)
            }
        };
        Self {
            offset: Vec2::new(axis(wanted.x, max.x), axis(wanted.y, max.y)),
            viewport,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.offset
    }

    /// Box overlaps the viewport
    pub fn sees(&self, pos: Vec2, size: Vec2) -> bool {
        let min = self.offset;
        let max = self.offset + self.viewport;
        pos.x < max.x && pos.x + size.x > min.x && pos.y < max.y && pos.y + size.y > min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Vec2 = Vec2::new(800.0, 600.0);
    const MAP: Vec2 = Vec2::new(2000.0, 2000.0);

    #[test]
    fn test_follow_centres_player() {
        let cam = Camera::follow(Vec2::new(1000.0, 1000.0), VIEW, MAP);
        assert_eq!(cam.offset, Vec2::new(600.0, 700.0));
        assert_eq!(cam.world_to_screen(Vec2::new(1000.0, 1000.0)), VIEW * 0.5);
    }

    #[test]
    fn test_follow_clamps_at_edges() {
        let cam = Camera::follow(Vec2::new(10.0, 1990.0), VIEW, MAP);
        assert_eq!(cam.offset, Vec2::new(0.0, 1400.0));
    }

    #[test]
    fn test_small_map_is_centred() {
        let cam = Camera::follow(Vec2::new(100.0, 100.0), VIEW, Vec2::new(400.0, 400.0));
        assert_eq!(cam.offset, Vec2::new(-200.0, -100.0));
    }

    #[test]
    fn test_sees() {
        let cam = Camera::follow(Vec2::new(1000.0, 1000.0), VIEW, MAP);
        assert!(cam.sees(Vec2::new(590.0, 690.0), Vec2::splat(20.0)));
        assert!(!cam.sees(Vec2::new(0.0, 0.0), Vec2::splat(50.0)));
    }
}
