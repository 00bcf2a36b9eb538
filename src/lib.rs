//! Snow Shovel Arcade - clear the driveway before the plow buries it again
//!
//! Core modules:
//! - `sim`: Deterministic simulation (snow grid, plow, weather, upgrades, snowmen)
//! - `scoring`: Pure scoring and difficulty curves
//! - `game`: Fixed-timestep frame driver and run lifecycle
//! - `snapshot`: Per-frame state handed to the renderer
//! - `platform`: Input, audio and renderer ports
//! - `persistence`: Key-value storage backends

pub mod game;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod scoring;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use game::Game;
pub use leaderboard::Leaderboard;
pub use settings::{QualityPreset, Settings};
pub use snapshot::Snapshot;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Longest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.05;

    /// Playfield dimensions
    pub const WIDTH: f32 = 480.0;
    pub const HEIGHT: f32 = 640.0;

    /// Driveway grid resolution
    pub const GRID_COLS: usize = 8;
    pub const GRID_ROWS: usize = 9;
    pub const MAX_SNOW_DEPTH: f32 = 10.0;
    pub const INITIAL_SNOW_DEPTH: f32 = 2.0;

    /// Street band below the driveway
    pub const STREET_GAP: f32 = 6.0;
    pub const STREET_HEIGHT: f32 = 72.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 150.0;
    pub const STARTING_LIVES: u8 = 3;
    /// Invulnerability after a snowman hit (seconds)
    pub const HURT_COOLDOWN: f32 = 1.2;

    /// Seconds a combo survives without another successful clear
    pub const COMBO_WINDOW: f32 = 2.5;
    /// Every Nth combo announces a rank
    pub const COMBO_MILESTONE: u32 = 20;
    /// Top-rows average depth that triggers frenzy scoring
    pub const FRENZY_THRESHOLD: f32 = 4.2;

    /// Difficulty "wave" label length (ms)
    pub const WAVE_LENGTH_MS: f64 = 18_000.0;
}

/// Axis-aligned rectangle in playfield coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges are inclusive
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.y >= self.y && p.x <= self.right() && p.y <= self.bottom()
    }

    /// Shrink each edge by its own margin
    pub fn inset(&self, left: f32, top: f32, right: f32, bottom: f32) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            self.width - left - right,
            self.height - top - bottom,
        )
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.x, self.right()),
            p.y.clamp(self.y, self.bottom()),
        )
    }
}

/// The shovelable driveway
pub const DRIVEWAY: Rect = Rect::new(67.0, 228.0, 346.0, 302.0);

/// Top of the street band the plow drives along
#[inline]
pub fn street_y() -> f32 {
    DRIVEWAY.bottom() + consts::STREET_GAP
}

/// Convert a playfield position to [0, 1] screen fractions
#[inline]
pub fn normalize_point(pos: Vec2) -> Vec2 {
    Vec2::new(pos.x / consts::WIDTH, pos.y / consts::HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_inset_and_contains() {
        let inner = DRIVEWAY.inset(16.0, 16.0, 16.0, 18.0);
        assert_eq!(inner.x, 83.0);
        assert_eq!(inner.bottom(), DRIVEWAY.bottom() - 18.0);
        assert!(DRIVEWAY.contains(Vec2::new(DRIVEWAY.x, DRIVEWAY.y)));
        assert!(!DRIVEWAY.contains(Vec2::new(DRIVEWAY.x - 0.5, 300.0)));
    }

    #[test]
    fn test_street_below_driveway() {
        assert_eq!(street_y(), 536.0);
        assert!(street_y() + consts::STREET_HEIGHT < consts::HEIGHT);
    }
}
