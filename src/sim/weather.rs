//! Weather cycle
//!
//! Clear -> Flurry -> Wind -> Blizzard -> Clear, on a randomized timer.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// Wind strength above which gusts shove the player
pub const GUST_THRESHOLD: f32 = 0.85;
/// Horizontal push per unit of wind (px/s)
const GUST_FORCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeatherKind {
    #[default]
    Clear,
    Flurry,
    Wind,
    Blizzard,
}

impl WeatherKind {
    pub const SEQUENCE: [WeatherKind; 4] = [
        WeatherKind::Clear,
        WeatherKind::Flurry,
        WeatherKind::Wind,
        WeatherKind::Blizzard,
    ];

    /// Following mode in the cycle (wraps)
    pub fn next(self) -> Self {
        match self {
            WeatherKind::Clear => WeatherKind::Flurry,
            WeatherKind::Flurry => WeatherKind::Wind,
            WeatherKind::Wind => WeatherKind::Blizzard,
            WeatherKind::Blizzard => WeatherKind::Clear,
        }
    }

    /// Snowfall multiplier
    pub fn snow_mult(self) -> f32 {
        match self {
            WeatherKind::Clear => 0.7,
            WeatherKind::Flurry => 1.45,
            WeatherKind::Wind => 1.9,
            WeatherKind::Blizzard => 2.8,
        }
    }

    pub fn wind(self) -> f32 {
        match self {
            WeatherKind::Clear => 0.12,
            WeatherKind::Flurry => 0.7,
            WeatherKind::Wind => 1.8,
            WeatherKind::Blizzard => 2.8,
        }
    }

    /// Screen tint alpha for the renderer
    pub fn tint(self) -> f32 {
        match self {
            WeatherKind::Clear => 0.0,
            WeatherKind::Flurry => 0.04,
            WeatherKind::Wind => 0.08,
            WeatherKind::Blizzard => 0.14,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherKind::Clear => "CLEAR SKIES",
            WeatherKind::Flurry => "HEAVY FLURRIES",
            WeatherKind::Wind => "GALE FORCE WIND",
            WeatherKind::Blizzard => "WHITEOUT BLIZZARD",
        }
    }

    /// Seconds between column drifts
    pub fn drift_interval(self) -> f32 {
        match self {
            WeatherKind::Blizzard => 0.95,
            WeatherKind::Wind => 1.25,
            _ => 1.8,
        }
    }

    pub fn extra_drift_columns(self) -> usize {
        usize::from(self == WeatherKind::Blizzard)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weather {
    pub kind: WeatherKind,
    /// Seconds until the next mode
    pub timer: f32,
    /// Wind direction, +1 blows right
    pub direction: f32,
}

impl Weather {
    pub fn new(rng: &mut impl RandomSource) -> Self {
        Self {
            kind: WeatherKind::Clear,
            timer: rng.range(9.0, 15.0),
            direction: rng.sign(),
        }
    }

    pub fn intensity(&self) -> f32 {
        self.kind.snow_mult()
    }

    pub fn wind(&self) -> f32 {
        self.kind.wind()
    }

    /// Advance the timer; returns the new mode when it changes
    pub fn tick(&mut self, dt: f32, rng: &mut impl RandomSource) -> Option<WeatherKind> {
        self.timer -= dt;
        if self.timer > 0.0 {
            return None;
        }
        self.kind = self.kind.next();
        self.direction = rng.sign();
        self.timer = rng.range(9.0, 16.0);
        log::debug!("Weather -> {:?} (dir {})", self.kind, self.direction);
        Some(self.kind)
    }

    /// Horizontal shove applied to the player this step
    pub fn gust(&self, dt: f32) -> f32 {
        if self.wind() > GUST_THRESHOLD {
            self.direction * self.wind() * GUST_FORCE * dt
        } else {
            0.0
        }
    }
}
