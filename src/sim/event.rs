//! Events emitted by the simulation during a tick
//!
//! The frame driver drains these after every step: sounds go to the audio
//! port, lifecycle changes trigger persistence.

use glam::Vec2;
use serde::Serialize;

use super::plow::PlowPhase;
use super::state::GamePhase;
use super::upgrade::UpgradeKind;
use super::weather::WeatherKind;

/// Discrete audio triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundCue {
    Shovel,
    PlowRush,
    ComboMilestone,
    Crash,
}

impl SoundCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCue::Shovel => "shovel",
            SoundCue::PlowRush => "plow-rush",
            SoundCue::ComboMilestone => "combo-milestone",
            SoundCue::Crash => "crash",
        }
    }
}

/// What hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Hazard {
    Plow,
    Snowman,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },
    PlowPhaseChanged {
        from: PlowPhase,
        to: PlowPhase,
    },
    /// Plow blade threw snow onto the driveway
    PlowSpray {
        at: Vec2,
    },
    SnowCleared {
        removed: f32,
        points: u64,
        combo: u32,
        near_plow: bool,
        frenzy: bool,
        at: Vec2,
    },
    ComboMilestone {
        combo: u32,
        rank: &'static str,
    },
    PlayerHit {
        by: Hazard,
        lives_left: u8,
        at: Vec2,
    },
    UpgradeDropped {
        kind: UpgradeKind,
        at: Vec2,
    },
    UpgradeCollected {
        kind: UpgradeKind,
        at: Vec2,
    },
    UpgradeExpired {
        kind: UpgradeKind,
        at: Vec2,
    },
    HelperDismissed {
        at: Vec2,
    },
    WeatherChanged {
        kind: WeatherKind,
    },
    SnowmanSpawned {
        at: Vec2,
    },
    SnowmanHit {
        at: Vec2,
    },
    SnowmanSmashed {
        bonus: u64,
        at: Vec2,
    },
}

impl GameEvent {
    /// Audio trigger for this event, if any
    pub fn sound(&self) -> Option<SoundCue> {
        match self {
            GameEvent::SnowCleared { .. } => Some(SoundCue::Shovel),
            GameEvent::PlowPhaseChanged {
                to: PlowPhase::Warning,
                ..
            } => Some(SoundCue::PlowRush),
            GameEvent::ComboMilestone { .. } => Some(SoundCue::ComboMilestone),
            GameEvent::PlayerHit { .. } => Some(SoundCue::Crash),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_mapping() {
        let warning = GameEvent::PlowPhaseChanged {
            from: PlowPhase::Waiting,
            to: PlowPhase::Warning,
        };
        assert_eq!(warning.sound(), Some(SoundCue::PlowRush));

        let passing = GameEvent::PlowPhaseChanged {
            from: PlowPhase::Warning,
            to: PlowPhase::Passing,
        };
        assert_eq!(passing.sound(), None);

        let hit = GameEvent::PlayerHit {
            by: Hazard::Snowman,
            lives_left: 2,
            at: Vec2::ZERO,
        };
        assert_eq!(hit.sound(), Some(SoundCue::Crash));
        assert_eq!(SoundCue::PlowRush.as_str(), "plow-rush");
    }
}
