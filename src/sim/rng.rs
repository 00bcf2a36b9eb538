//! Injectable randomness
//!
//! Every roll in the simulation (spawn points, drift spill, wander targets)
//! goes through [`RandomSource`], so a run is reproducible from its seed and
//! tests can script exact draws.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::Rect;

/// Source of uniform draws for the simulation
pub trait RandomSource {
    /// Uniform draw in [0, 1)
    fn next_unit(&mut self) -> f32;

    /// Uniform draw in [min, max)
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_unit() * (max - min)
    }

    /// Index in [0, len)
    fn index(&mut self, len: usize) -> usize {
        let i = (self.next_unit() * len as f32) as usize;
        i.min(len.saturating_sub(1))
    }

    /// +1 or -1 with equal odds
    fn sign(&mut self) -> f32 {
        if self.next_unit() > 0.5 { 1.0 } else { -1.0 }
    }

    /// Random point inside `rect`
    fn point_in(&mut self, rect: Rect) -> Vec2 {
        let x = self.range(rect.x, rect.right());
        let y = self.range(rect.y, rect.bottom());
        Vec2::new(x, y)
    }
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Seeded default generator
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Replays a fixed cycle of draws
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(draws: Vec<f32>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Always returns the same draw
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let value = self.draws[self.cursor % self.draws.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}
