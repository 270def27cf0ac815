//! Sound cue selection
//!
//! The simulation never plays audio. The session maps drained `GameEvent`s
//! to `SoundEffect`s and hands them to whatever `AudioSink` the platform
//! provides.

use crate::sim::{GameEvent, LossCause};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Player projectile launched
    Shoot,
    /// Projectile struck a monster
    MonsterHit,
    /// Monster destroyed
    MonsterDeath,
    /// Item picked up
    Pickup,
    /// Player took damage
    PlayerHurt,
    /// Turret single shot
    TurretShot,
    /// Turret ring burst
    TurretBurst,
    /// Tried the exit without the required items
    ExitDenied,
    LevelClear,
    GameOver,
    /// Ran out of time
    TimeUp,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        let effect = match event {
            GameEvent::PlayerFired { .. } => SoundEffect::Shoot,
            GameEvent::MonsterHit { .. } => SoundEffect::MonsterHit,
            GameEvent::MonsterKilled { .. } => SoundEffect::MonsterDeath,
            // The death cue already covers drops
            GameEvent::ItemDropped { .. } => return None,
            GameEvent::ItemCollected { .. } => SoundEffect::Pickup,
            GameEvent::PlayerHurt { .. } => SoundEffect::PlayerHurt,
            GameEvent::TurretFired { burst: true, .. } => SoundEffect::TurretBurst,
            GameEvent::TurretFired { burst: false, .. } => SoundEffect::TurretShot,
            GameEvent::ExitBlocked => SoundEffect::ExitDenied,
            GameEvent::LevelCleared { .. } => SoundEffect::LevelClear,
            GameEvent::GameOver(LossCause::HealthDepleted) => SoundEffect::GameOver,
            GameEvent::GameOver(LossCause::TimeExpired) => SoundEffect::TimeUp,
        };
        Some(effect)
    }
}

/// Whatever actually makes noise
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Discards every cue (headless runs, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Keeps every cue it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub played: Vec<SoundEffect>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::EntityId;

    #[test]
    fn test_turret_cues() {
        let burst = GameEvent::TurretFired {
            id: EntityId(1),
            burst: true,
        };
        let single = GameEvent::TurretFired {
            id: EntityId(1),
            burst: false,
        };
        assert_eq!(SoundEffect::for_event(&burst), Some(SoundEffect::TurretBurst));
        assert_eq!(SoundEffect::for_event(&single), Some(SoundEffect::TurretShot));
    }

    #[test]
    fn test_loss_cues_differ() {
        assert_ne!(
            SoundEffect::for_event(&GameEvent::GameOver(LossCause::HealthDepleted)),
            SoundEffect::for_event(&GameEvent::GameOver(LossCause::TimeExpired))
        );
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingAudio::default();
        sink.play(SoundEffect::Pickup);
        sink.play(SoundEffect::Shoot);
        assert_eq!(sink.played, vec![SoundEffect::Pickup, SoundEffect::Shoot]);
    }
}
