//! Game settings and preferences
//!
//! Persisted separately from the leaderboard under [`SETTINGS_KEY`].

use serde::{Deserialize, Serialize};

use crate::persistence::{self, SETTINGS_KEY, ScoreStore};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 64,
            QualityPreset::Medium => 256,
            QualityPreset::High => 512,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on hits and plow passes
    pub screen_shake: bool,
    /// Red flash when the player gets hit
    pub flashes: bool,
    /// Snow and spark particles
    pub particles: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            flashes: true,
            particles: true,
            volume: 0.85,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops the flash for cheaper frames
        if preset == QualityPreset::Low {
            self.flashes = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective hit flash (respects reduced_motion)
    pub fn effective_flash(&self) -> bool {
        self.flashes && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Volume actually sent to the audio sink
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }

    /// Parse stored JSON; anything unreadable gives the defaults
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str::<Settings>(raw) {
            Ok(mut settings) => {
                settings.volume = if settings.volume.is_finite() {
                    settings.volume.clamp(0.0, 1.0)
                } else {
                    Self::default().volume
                };
                settings
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn load(store: &dyn ScoreStore) -> Self {
        let settings = Self::parse(persistence::read_or_warn(store, SETTINGS_KEY).as_deref());
        log::info!("Settings loaded ({} quality)", settings.quality.as_str());
        settings
    }

    pub fn save(&self, store: &mut dyn ScoreStore) {
        match persistence::write_json(store, SETTINGS_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }
}
