//! Rogue snowmen
//!
//! They walk in from the side, stomp around the driveway piling snow, and
//! leave once their time is up. Shovel and blower hits knock them down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::grid::SnowGrid;
use super::rng::RandomSource;
use crate::DRIVEWAY;
use crate::consts::WIDTH;

/// Seconds before the first snowman of a run
pub const FIRST_SPAWN_DELAY: f32 = 14.0;
pub const MAX_SNOWMEN: usize = 2;
pub const SNOWMAN_HP: f32 = 10.0;

/// Spawn this far outside the screen edge
const SPAWN_OFFSET: f32 = 52.0;
/// Removed once this far outside the screen edge
const DESPAWN_MARGIN: f32 = 120.0;
/// Seconds between snow stomps
const TRAIL_INTERVAL: f32 = 0.22;
/// Seconds of immunity after taking a hit
const HIT_COOLDOWN: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnowmanPhase {
    /// Walking in to the driveway edge
    Enter,
    /// Heading for a spot on the driveway
    Invade,
    /// Standing its ground until the next attack
    Menace,
    /// Walking off-screen
    Leave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snowman {
    pub phase: SnowmanPhase,
    pub pos: Vec2,
    pub target: Vec2,
    /// -1 entered from the left, +1 from the right
    pub side: f32,
    pub size: f32,
    pub hp: f32,
    pub speed: f32,
    pub attack_cooldown: f32,
    pub hit_cooldown: f32,
    /// Seconds left before it gets bored and leaves
    pub life: f32,
    /// Animation phase
    pub pulse: f32,
    pub trail_timer: f32,
}

impl Snowman {
    fn spawn(rng: &mut impl RandomSource) -> Self {
        let side = rng.sign();
        let y = rng.range(DRIVEWAY.y + 38.0, DRIVEWAY.bottom() - 50.0);
        let (x, target_x) = if side < 0.0 {
            (-SPAWN_OFFSET, DRIVEWAY.x + 12.0)
        } else {
            (WIDTH + SPAWN_OFFSET, DRIVEWAY.right() - 12.0)
        };
        Self {
            phase: SnowmanPhase::Enter,
            pos: Vec2::new(x, y),
            target: Vec2::new(target_x, y),
            side,
            size: rng.range(68.0, 84.0),
            hp: SNOWMAN_HP,
            speed: rng.range(45.0, 64.0),
            attack_cooldown: 1.2,
            hit_cooldown: 0.0,
            life: rng.range(14.0, 18.0),
            pulse: rng.range(0.0, std::f32::consts::TAU),
            trail_timer: 0.08,
        }
    }

    /// Step toward the target; true once there
    fn walk(&mut self, dt: f32) -> bool {
        let to_target = self.target - self.pos;
        let dist = to_target.length();
        if dist > 1.0 {
            self.pos += to_target / dist * dist.min(self.speed * dt);
            false
        } else {
            true
        }
    }

    fn tick(&mut self, dt: f32, grid: &mut SnowGrid, rng: &mut impl RandomSource) {
        self.hit_cooldown = (self.hit_cooldown - dt).max(0.0);
        self.attack_cooldown -= dt;
        self.life -= dt;
        self.pulse += dt * 4.0;
        self.trail_timer -= dt;

        match self.phase {
            SnowmanPhase::Enter => {
                if self.walk(dt) {
                    self.phase = SnowmanPhase::Invade;
                    self.target = rng.point_in(DRIVEWAY.inset(30.0, 45.0, 30.0, 40.0));
                }
            }
            SnowmanPhase::Invade => {
                if self.walk(dt) {
                    self.phase = SnowmanPhase::Menace;
                    self.attack_cooldown = 1.1;
                }
            }
            SnowmanPhase::Menace => {
                if self.attack_cooldown <= 0.0 {
                    self.attack_cooldown = rng.range(1.1, 1.8);
                    self.target = rng.point_in(DRIVEWAY.inset(26.0, 40.0, 26.0, 36.0));
                    self.phase = SnowmanPhase::Invade;
                }
                if self.life <= 0.0 {
                    self.phase = SnowmanPhase::Leave;
                }
            }
            SnowmanPhase::Leave => {
                self.pos.x += self.side * self.speed * dt;
            }
        }

        if self.trail_timer <= 0.0 && self.phase != SnowmanPhase::Leave {
            self.trail_timer = TRAIL_INTERVAL;
            if let Some(center) = grid.world_to_cell(self.pos) {
                let cells: Vec<_> = grid.neighborhood(center).collect();
                for cell in cells {
                    let amount = rng.range(0.18, 0.38);
                    grid.add_snow(cell, amount, rng);
                }
            }
        }
    }

    pub fn touches(&self, p: Vec2) -> bool {
        self.pos.distance(p) < self.size * 0.52
    }

    fn in_reach(&self, p: Vec2) -> bool {
        self.pos.distance(p) <= self.size * 0.72
    }

    fn is_gone(&self) -> bool {
        self.hp <= 0.0 || self.pos.x < -DESPAWN_MARGIN || self.pos.x > WIDTH + DESPAWN_MARGIN
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snowmen {
    pub list: Vec<Snowman>,
    pub spawn_timer: f32,
}

impl Default for Snowmen {
    fn default() -> Self {
        Self::new()
    }
}

impl Snowmen {
    pub fn new() -> Self {
        Self {
            list: Vec::new(),
            spawn_timer: FIRST_SPAWN_DELAY,
        }
    }

    /// Advance every snowman. Returns true when one of them reached the
    /// player while `player_vulnerable` was set.
    pub fn tick(
        &mut self,
        dt: f32,
        player: Vec2,
        player_vulnerable: bool,
        grid: &mut SnowGrid,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 && self.list.len() < MAX_SNOWMEN {
            let snowman = Snowman::spawn(rng);
            log::debug!("Snowman spawned at {:?}", snowman.pos);
            events.push(GameEvent::SnowmanSpawned { at: snowman.pos });
            self.list.push(snowman);
            self.spawn_timer = rng.range(18.0, 30.0);
        }

        let mut hit = false;
        for snowman in &mut self.list {
            snowman.tick(dt, grid, rng);
            if player_vulnerable && !hit && snowman.touches(player) {
                hit = true;
            }
        }

        self.list.retain(|s| !s.is_gone());
        hit
    }

    /// Land a clearing hit on the first snowman in reach.
    ///
    /// Returns the smash bonus when the hit finishes it off.
    pub fn damage_at(
        &mut self,
        at: Vec2,
        power: f32,
        combo: u32,
        events: &mut Vec<GameEvent>,
    ) -> Option<u64> {
        let snowman = self
            .list
            .iter_mut()
            .find(|s| s.hit_cooldown <= 0.0 && s.in_reach(at))?;

        snowman.hit_cooldown = HIT_COOLDOWN;
        snowman.hp -= power;
        events.push(GameEvent::SnowmanHit { at: snowman.pos });

        if snowman.hp <= 0.0 {
            let bonus = 7500 + u64::from(combo) * 90;
            events.push(GameEvent::SnowmanSmashed {
                bonus,
                at: snowman.pos,
            });
            return Some(bonus);
        }
        None
    }
}
