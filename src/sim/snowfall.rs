//! Snow accretion: steady flakes plus periodic column drifts

use serde::{Deserialize, Serialize};

use super::grid::{Cell, SnowGrid};
use super::rng::RandomSource;
use super::weather::Weather;
use crate::scoring::snowfall_rate;

/// Depth added by one falling flake
const FLAKE_DEPTH: f32 = 0.5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snowfall {
    /// Fractional flakes owed to the grid
    ticker: f32,
    /// Seconds since the last column drift
    drift_clock: f32,
}

impl Snowfall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(
        &mut self,
        grid: &mut SnowGrid,
        weather: &Weather,
        elapsed_ms: f64,
        dt: f32,
        rng: &mut impl RandomSource,
    ) {
        self.ticker += dt * snowfall_rate(elapsed_ms) * weather.intensity();
        while self.ticker >= 1.0 {
            self.ticker -= 1.0;
            let i = rng.index(grid.cols() * grid.rows());
            grid.deposit(Cell::new(i % grid.cols(), i / grid.cols()), FLAKE_DEPTH);
        }

        self.drift_clock += dt;
        if self.drift_clock > weather.kind.drift_interval() {
            self.drift_clock = 0.0;
            let columns = 1 + rng.index(2) + weather.kind.extra_drift_columns();
            for _ in 0..columns {
                let col = rng.index(grid.cols());
                for row in 0..grid.rows() {
                    let base = (0.25 - row as f32 * 0.015).max(0.1);
                    let amount = base * (0.65 + weather.intensity() * 0.45);
                    grid.add_snow(Cell::new(col, row), amount, rng);
                }
            }
        }
    }
}
