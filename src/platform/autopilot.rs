//! Idle/demo mode - AI plays the game
//!
//! Goes for the pickup when one is waiting, otherwise digs out the deepest
//! cell it can safely reach. Backs off the street while the plow is coming
//! and sidesteps snowmen.

use glam::Vec2;

use super::{InputContext, InputSource};
use crate::DRIVEWAY;
use crate::sim::plow::RISK_BAND;
use crate::sim::{Cell, GamePhase, Player, Snowman, TickInput};

/// Stand this far below a cell's center so the shovel bites into it
const DIG_OFFSET: f32 = 16.0;
/// Close enough to the target to stop walking
const ARRIVED: f32 = 4.0;
/// Extra room kept from a snowman beyond its contact radius
const SNOWMAN_MARGIN: f32 = 18.0;

#[derive(Debug, Default, Clone)]
pub struct Autopilot {
    /// Last target, for logging changes
    target: Option<Vec2>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line the plow can't reach even when it threatens
    fn safe_line() -> f32 {
        DRIVEWAY.bottom() - RISK_BAND - 20.0
    }

    fn threatened(snowmen: &[Snowman], p: Vec2) -> bool {
        snowmen
            .iter()
            .any(|s| s.pos.distance(p) < s.size * 0.52 + SNOWMAN_MARGIN)
    }

    fn choose_target(&self, ctx: &InputContext<'_>) -> Vec2 {
        let plow_coming = ctx.plow.phase.is_threatening();
        let player = ctx.player.pos;

        if plow_coming && player.y > Self::safe_line() {
            return Vec2::new(player.x, Self::safe_line() - 10.0);
        }

        if let Some(pickup) = ctx
            .pickup
            .filter(|p| !Self::threatened(ctx.snowmen, p.pos))
        {
            return pickup.pos;
        }

        // Deepest cell we can stand under without getting hurt
        let grid = ctx.grid;
        let mut best: Option<(Vec2, f32)> = None;
        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let cell = Cell::new(col, row);
                let depth = grid.depth(cell);
                if depth <= 0.1 {
                    continue;
                }
                let stand =
                    Player::bounds().clamp(grid.cell_center(cell) + Vec2::new(0.0, DIG_OFFSET));
                if plow_coming && stand.y > Self::safe_line() {
                    continue;
                }
                if Self::threatened(ctx.snowmen, stand) {
                    continue;
                }
                // Prefer deep snow, then short walks
                let value = depth - stand.distance(player) * 0.01;
                if best.is_none_or(|(_, v)| value > v) {
                    best = Some((stand, value));
                }
            }
        }

        // Small wander so idle runs don't loop on the same path
        let t = ctx.time_ticks as f32 * 0.01;
        let wobble = Vec2::new(t.sin() * 3.0, (t * 0.7).sin() * 2.0);
        best.map_or(DRIVEWAY.center(), |(stand, _)| stand + wobble)
    }
}

impl InputSource for Autopilot {
    fn poll(&mut self, ctx: &InputContext<'_>) -> TickInput {
        if ctx.phase != GamePhase::Running {
            return TickInput::default();
        }

        let target = self.choose_target(ctx);
        if self.target.is_none_or(|t| t.distance(target) > 40.0) {
            log::trace!("Autopilot heading for {:?}", target);
        }
        self.target = Some(target);

        let to_target = target - ctx.player.pos;
        let movement = if to_target.length() > ARRIVED {
            to_target.normalize_or_zero()
        } else {
            Vec2::ZERO
        };
        TickInput::new(movement, true, false)
    }
}
