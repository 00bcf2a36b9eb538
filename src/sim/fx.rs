//! Transient visual effects
//!
//! Not gameplay-affecting. The renderer reads these from the snapshot; the
//! simulation only spawns and ages them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// Default particle cap
pub const MAX_PARTICLES: usize = 256;

const SHAKE_DECAY: f32 = 18.0;
const FLASH_DECAY: f32 = 2.8;
const FLOAT_RISE: f32 = 35.0;
const CALLOUT_RISE: f32 = 18.0;
const GRAVITY: f32 = 180.0;

/// Callout lettering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalloutStyle {
    #[default]
    Plain,
    Brick,
}

/// Big announcement text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    pub text: String,
    pub life: f32,
    pub max_life: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
    /// World anchor; `None` centers over the street
    pub pos: Option<Vec2>,
    pub style: CalloutStyle,
    /// Scales up while fading
    pub grow: bool,
}

impl Callout {
    pub fn new(text: impl Into<String>, life: f32, color: u32, size: f32) -> Self {
        Self {
            text: text.into(),
            life,
            max_life: life,
            color,
            size,
            pos: None,
            style: CalloutStyle::Plain,
            grow: false,
        }
    }

    pub fn at(mut self, pos: Vec2) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn brick(mut self) -> Self {
        self.style = CalloutStyle::Brick;
        self
    }

    pub fn growing(mut self) -> Self {
        self.grow = true;
        self
    }
}

/// Rising score label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    pub life: f32,
    pub max_life: f32,
    pub color: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Snow,
    Spark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub kind: ParticleKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effects {
    pub shake: f32,
    pub flash: f32,
    pub floating_text: Vec<FloatingText>,
    pub callouts: Vec<Callout>,
    pub particles: Vec<Particle>,
    pub max_particles: usize,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            shake: 0.0,
            flash: 0.0,
            floating_text: Vec::new(),
            callouts: Vec::new(),
            particles: Vec::new(),
            max_particles: MAX_PARTICLES,
        }
    }
}

impl Effects {
    /// Raise screen shake to at least `amount`
    pub fn shake(&mut self, amount: f32) {
        self.shake = self.shake.max(amount);
    }

    pub fn callout(&mut self, callout: Callout) {
        self.callouts.push(callout);
    }

    pub fn float_text(&mut self, pos: Vec2, text: String, life: f32, color: u32) {
        self.floating_text.push(FloatingText {
            pos,
            text,
            life,
            max_life: life,
            color,
        });
    }

    /// Spray `count` particles from `origin`. Velocity components are drawn
    /// from the given ranges; life from `life.0..life.1`.
    #[allow(clippy::too_many_arguments)]
    pub fn burst(
        &mut self,
        rng: &mut impl RandomSource,
        origin: Vec2,
        count: usize,
        kind: ParticleKind,
        vx: (f32, f32),
        vy: (f32, f32),
        life: (f32, f32),
    ) {
        for _ in 0..count {
            if self.particles.len() >= self.max_particles {
                break;
            }
            self.particles.push(Particle {
                pos: origin,
                vel: Vec2::new(rng.range(vx.0, vx.1), rng.range(vy.0, vy.1)),
                life: rng.range(life.0, life.1),
                max_life: life.1,
                kind,
            });
        }
    }

    /// Age everything by `dt`
    pub fn tick(&mut self, dt: f32) {
        self.shake = (self.shake - dt * SHAKE_DECAY).max(0.0);
        self.flash = (self.flash - dt * FLASH_DECAY).max(0.0);

        self.floating_text.retain_mut(|item| {
            item.life -= dt;
            item.pos.y -= dt * FLOAT_RISE;
            item.life > 0.0
        });

        self.callouts.retain_mut(|item| {
            item.life -= dt;
            if let Some(pos) = item.pos.as_mut() {
                pos.y -= dt * CALLOUT_RISE;
            }
            item.life > 0.0
        });

        self.particles.retain_mut(|p| {
            p.life -= dt;
            p.pos += p.vel * dt;
            p.vel.y += GRAVITY * dt;
            p.life > 0.0
        });
    }
}
