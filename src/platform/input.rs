//! Raw key state to simulation input

use glam::Vec2;

use crate::sim::TickInput;

/// Keys held this frame, as reported by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub action: bool,
    pub pause: bool,
}

impl KeyState {
    /// Movement intent; opposite keys cancel
    pub fn move_dir(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Tracks the previous frame so releases and presses fire once
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    prev: KeyState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this frame's tick input and remember the key state
    pub fn update(&mut self, keys: KeyState) -> TickInput {
        let input = TickInput {
            move_dir: keys.move_dir(),
            action_held: keys.action,
            action_released: self.prev.action && !keys.action,
            pause_pressed: keys.pause && !self.prev.pause,
        };
        self.prev = keys;
        input
    }

    /// Forget held keys (focus loss, level change)
    pub fn reset(&mut self) {
        self.prev = KeyState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_dir() {
        let keys = KeyState {
            up: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(keys.move_dir(), Vec2::new(1.0, -1.0));

        let cancel = KeyState {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(cancel.move_dir(), Vec2::ZERO);
    }

    #[test]
    fn test_action_release_is_edge() {
        let mut tracker = InputTracker::new();
        let held = KeyState {
            action: true,
            ..Default::default()
        };

        let first = tracker.update(held);
        assert!(first.action_held);
        assert!(!first.action_released);

        assert!(!tracker.update(held).action_released);

        let released = tracker.update(KeyState::default());
        assert!(released.action_released);
        assert!(!released.action_held);

        assert!(!tracker.update(KeyState::default()).action_released);
    }

    #[test]
    fn test_pause_fires_once_per_press() {
        let mut tracker = InputTracker::new();
        let pause = KeyState {
            pause: true,
            ..Default::default()
        };
        assert!(tracker.update(pause).pause_pressed);
        assert!(!tracker.update(pause).pause_pressed);
        tracker.update(KeyState::default());
        assert!(tracker.update(pause).pause_pressed);
    }

    #[test]
    fn test_reset_drops_pending_release() {
        let mut tracker = InputTracker::new();
        tracker.update(KeyState {
            action: true,
            ..Default::default()
        });
        tracker.reset();
        assert!(!tracker.update(KeyState::default()).action_released);
    }
}
