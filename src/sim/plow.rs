//! Street plow patrol
//!
//! A timer-driven four-phase cycle. Every transition goes through
//! [`PlowPhase::next`], so the plow can never skip or reverse a phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::grid::{Cell, SnowGrid};
use super::rng::RandomSource;
use crate::consts::{STREET_HEIGHT, WIDTH};
use crate::scoring::{plow_interval_ms, plow_snow_burst};
use crate::{DRIVEWAY, street_y};

/// Warning phase length (ms)
pub const WARNING_MS: f32 = 1200.0;
/// Cooldown after running the player over (ms)
pub const HIT_COOLDOWN_MS: f32 = 600.0;
/// Cooldown after leaving the screen (ms)
pub const EXIT_COOLDOWN_MS: f32 = 620.0;
/// Off-screen spawn distance
pub const SPAWN_OFFSET: f32 = 200.0;
/// Distance past the screen edge that ends a pass
pub const EXIT_MARGIN: f32 = 220.0;
/// Blade sits this far ahead of the plow center
pub const BLADE_OFFSET: f32 = 68.0;
/// Horizontal reach of the plow against the player
pub const HIT_RANGE: f32 = 80.0;
/// Depth of the band above the street where the plow can hit the player
pub const DANGER_BAND: f32 = 50.0;
/// Depth of the band that earns the near-plow bonus
pub const RISK_BAND: f32 = 80.0;

const BASE_SPEED: f32 = 260.0;
const MAX_SPEED_BONUS: f32 = 230.0;
/// Chance per step of a visible spray is `1 - SPRAY_DRAW`
const SPRAY_DRAW: f32 = 0.78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlowPhase {
    #[default]
    Waiting,
    Warning,
    Passing,
    Cooldown,
}

impl PlowPhase {
    /// The only phase reachable from `self`
    pub fn next(self) -> Self {
        match self {
            PlowPhase::Waiting => PlowPhase::Warning,
            PlowPhase::Warning => PlowPhase::Passing,
            PlowPhase::Passing => PlowPhase::Cooldown,
            PlowPhase::Cooldown => PlowPhase::Waiting,
        }
    }

    /// Plow is announced or on the street
    pub fn is_threatening(self) -> bool {
        matches!(self, PlowPhase::Warning | PlowPhase::Passing)
    }
}

/// Player stands where a passing plow can reach
pub fn in_danger_band(player: Vec2) -> bool {
    player.y > DRIVEWAY.bottom() - DANGER_BAND
}

/// Player stands close enough to the street for the risk bonus
pub fn in_risk_band(player: Vec2) -> bool {
    player.y > DRIVEWAY.bottom() - RISK_BAND
}

/// Speed at a given point in the run
pub fn plow_speed(elapsed_ms: f64) -> f32 {
    BASE_SPEED + (elapsed_ms / 280.0).min(f64::from(MAX_SPEED_BONUS)) as f32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plow {
    pub phase: PlowPhase,
    /// Countdown for the current phase (ms)
    pub timer_ms: f32,
    pub pos: Vec2,
    /// +1 drives right, -1 drives left
    pub direction: f32,
    pub speed: f32,
}

impl Default for Plow {
    fn default() -> Self {
        Self::new()
    }
}

impl Plow {
    pub fn new() -> Self {
        Self {
            phase: PlowPhase::Waiting,
            timer_ms: plow_interval_ms(0.0) as f32,
            pos: Vec2::new(-EXIT_MARGIN, street_y() + STREET_HEIGHT * 0.54),
            direction: 1.0,
            speed: 280.0,
        }
    }

    /// Effective snow deposition point
    pub fn blade_x(&self) -> f32 {
        self.pos.x + self.direction * BLADE_OFFSET
    }

    fn advance(&mut self, timer_ms: f32, events: &mut Vec<GameEvent>) {
        let from = self.phase;
        let to = from.next();
        self.phase = to;
        self.timer_ms = timer_ms;
        log::debug!("Plow {:?} -> {:?} ({} ms)", from, to, timer_ms);
        events.push(GameEvent::PlowPhaseChanged { from, to });
    }

    /// Advance one step. Returns true when the plow ran the player over.
    pub fn tick(
        &mut self,
        dt: f32,
        elapsed_ms: f64,
        player: Vec2,
        grid: &mut SnowGrid,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        self.speed = plow_speed(elapsed_ms);
        let dt_ms = dt * 1000.0;

        match self.phase {
            PlowPhase::Waiting => {
                self.timer_ms -= dt_ms;
                if self.timer_ms <= 0.0 {
                    self.advance(WARNING_MS, events);
                }
                false
            }
            PlowPhase::Warning => {
                self.timer_ms -= dt_ms;
                if self.timer_ms <= 0.0 {
                    self.direction = rng.sign();
                    self.pos.x = if self.direction > 0.0 {
                        -SPAWN_OFFSET
                    } else {
                        WIDTH + SPAWN_OFFSET
                    };
                    self.advance(0.0, events);
                }
                false
            }
            PlowPhase::Passing => self.pass(dt, elapsed_ms, player, grid, rng, events),
            PlowPhase::Cooldown => {
                self.timer_ms -= dt_ms;
                if self.timer_ms <= 0.0 {
                    self.advance(plow_interval_ms(elapsed_ms) as f32, events);
                }
                false
            }
        }
    }

    fn pass(
        &mut self,
        dt: f32,
        elapsed_ms: f64,
        player: Vec2,
        grid: &mut SnowGrid,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        self.pos.x += self.direction * self.speed * dt;

        let blade_x = self.blade_x();
        let bounds = grid.bounds();
        if blade_x >= bounds.x && blade_x <= bounds.right() {
            let row = grid.street_row();
            let col = grid.column_at(blade_x);
            let trail = grid.clamp_cell(col as isize - self.direction as isize, row as isize);
            let burst = plow_snow_burst(elapsed_ms) as f32 * dt * 6.0;

            grid.add_snow(Cell::new(col, row), burst, rng);
            grid.add_snow(Cell::new(col, row.saturating_sub(1)), burst * 0.76, rng);
            grid.add_snow(trail, burst * 0.65, rng);

            if rng.next_unit() > SPRAY_DRAW {
                events.push(GameEvent::PlowSpray {
                    at: grid.cell_center(Cell::new(col, row)),
                });
            }
        }

        if in_danger_band(player) && (player.x - self.pos.x).abs() < HIT_RANGE {
            self.advance(HIT_COOLDOWN_MS, events);
            return true;
        }

        let exited = if self.direction > 0.0 {
            self.pos.x > WIDTH + EXIT_MARGIN
        } else {
            self.pos.x < -EXIT_MARGIN
        };
        if exited {
            self.advance(EXIT_COOLDOWN_MS, events);
        }
        false
    }
}
