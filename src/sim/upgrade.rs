//! Timed upgrades and the helper crew
//!
//! At most one upgrade is active. A pickup only drops while nothing is active
//! and nothing is waiting to be collected.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::grid::SnowGrid;
use super::rng::RandomSource;
use crate::DRIVEWAY;

/// Seconds before the first drop of a run
pub const FIRST_DROP_DELAY: f32 = 10.0;
/// Collection radius around the pickup center
pub const PICKUP_RADIUS: f32 = 26.0;

const HELPER_SPEED: f32 = 95.0;
/// Seconds between helper area cleans
const HELPER_CLEAN_INTERVAL: f32 = 0.11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Bigger shovel bites
    Scoop,
    /// Continuous snow blower
    Blower,
    /// Autonomous helper that wanders and clears
    Helper,
}

impl UpgradeKind {
    /// Weighted pick from a uniform draw: 38% scoop, 38% blower, 24% helper
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.38 {
            UpgradeKind::Scoop
        } else if roll < 0.76 {
            UpgradeKind::Blower
        } else {
            UpgradeKind::Helper
        }
    }

    /// Effect length in seconds
    pub fn duration(self) -> f32 {
        match self {
            UpgradeKind::Blower => 10.0,
            _ => 12.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UpgradeKind::Scoop => "THE SCOOP",
            UpgradeKind::Blower => "THE BLOWER",
            UpgradeKind::Helper => "THE HELPER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveUpgrade {
    pub kind: UpgradeKind,
    /// Seconds left
    pub remaining: f32,
}

/// Collectible waiting on the driveway
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: UpgradeKind,
    pub pos: Vec2,
    /// Bobbing animation phase
    pub bob: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Helper {
    pub pos: Vec2,
    pub target: Vec2,
    pub speed: f32,
    pub retarget_timer: f32,
    pub clean_timer: f32,
}

impl Helper {
    fn tick(&mut self, dt: f32, grid: &mut SnowGrid, rng: &mut impl RandomSource) {
        self.retarget_timer -= dt;
        self.clean_timer -= dt;

        if self.retarget_timer <= 0.0 {
            self.retarget_timer = rng.range(0.5, 1.4);
            self.target = rng.point_in(DRIVEWAY.inset(20.0, 28.0, 20.0, 20.0));
        }

        let to_target = self.target - self.pos;
        let dist = to_target.length();
        if dist > 1.0 {
            let step = dist.min(self.speed * dt);
            self.pos += to_target / dist * step;
        }

        if self.clean_timer <= 0.0 {
            self.clean_timer = HELPER_CLEAN_INTERVAL;
            if let Some(center) = grid.world_to_cell(self.pos) {
                let cells: Vec<_> = grid.neighborhood(center).collect();
                for cell in cells {
                    let amount = rng.range(0.25, 0.5);
                    grid.remove_at(cell, amount);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upgrades {
    pub active: Option<ActiveUpgrade>,
    pub pickup: Option<Pickup>,
    /// Seconds until the next drop (only runs while idle)
    pub spawn_timer: f32,
    pub helpers: Vec<Helper>,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self::new()
    }
}

impl Upgrades {
    pub fn new() -> Self {
        Self {
            active: None,
            pickup: None,
            spawn_timer: FIRST_DROP_DELAY,
            helpers: Vec::new(),
        }
    }

    pub fn active_kind(&self) -> Option<UpgradeKind> {
        self.active.map(|a| a.kind)
    }

    pub fn is_active(&self, kind: UpgradeKind) -> bool {
        self.active_kind() == Some(kind)
    }

    /// Expire the active upgrade and drop new pickups
    pub fn tick(
        &mut self,
        dt: f32,
        player: Vec2,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) {
        if let Some(active) = self.active.as_mut() {
            active.remaining = (active.remaining - dt).max(0.0);
            if active.remaining == 0.0 {
                let kind = active.kind;
                self.active = None;
                log::debug!("Upgrade {:?} expired", kind);
                events.push(GameEvent::UpgradeExpired { kind, at: player });
            }
        }

        if self.pickup.is_none() && self.active.is_none() {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 {
                self.spawn(rng, events);
            }
        }
    }

    fn spawn(&mut self, rng: &mut impl RandomSource, events: &mut Vec<GameEvent>) {
        let kind = UpgradeKind::from_roll(rng.next_unit());
        let pos = rng.point_in(DRIVEWAY.inset(24.0, 48.0, 24.0, 56.0));
        self.pickup = Some(Pickup {
            kind,
            pos,
            bob: rng.range(0.0, std::f32::consts::TAU),
        });
        self.spawn_timer = rng.range(16.0, 24.0);
        log::debug!("Upgrade {:?} dropped at {:?}", kind, pos);
        events.push(GameEvent::UpgradeDropped { kind, at: pos });
    }

    /// Bob the waiting pickup; runs in every phase
    pub fn animate(&mut self, dt: f32) {
        if let Some(pickup) = self.pickup.as_mut() {
            pickup.bob += dt * 3.8;
        }
    }

    /// Pick up the waiting upgrade when the player is on it
    pub fn try_collect(
        &mut self,
        player: Vec2,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) -> Option<UpgradeKind> {
        let pickup = self.pickup?;
        if player.distance(pickup.pos) >= PICKUP_RADIUS {
            return None;
        }
        self.pickup = None;
        self.activate(pickup.kind, player, rng, events);
        Some(pickup.kind)
    }

    /// Start an upgrade, replacing whatever was active
    pub fn activate(
        &mut self,
        kind: UpgradeKind,
        player: Vec2,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) {
        self.active = Some(ActiveUpgrade {
            kind,
            remaining: kind.duration(),
        });
        if kind == UpgradeKind::Helper {
            let pos = Vec2::new(player.x + rng.range(-20.0, 20.0), player.y + 10.0);
            self.helpers.push(Helper {
                pos: DRIVEWAY.inset(18.0, 20.0, 18.0, 20.0).clamp(pos),
                target: player,
                speed: HELPER_SPEED,
                retarget_timer: 0.0,
                clean_timer: 0.0,
            });
        }
        log::debug!("Upgrade {:?} collected", kind);
        events.push(GameEvent::UpgradeCollected { kind, at: player });
    }

    /// Move and clean with every helper; all leave at once when the helper
    /// upgrade is gone
    pub fn tick_helpers(
        &mut self,
        dt: f32,
        grid: &mut SnowGrid,
        rng: &mut impl RandomSource,
        events: &mut Vec<GameEvent>,
    ) {
        for helper in &mut self.helpers {
            helper.tick(dt, grid, rng);
        }

        if !self.is_active(UpgradeKind::Helper) && !self.helpers.is_empty() {
            let at = self.helpers[0].pos;
            self.helpers.clear();
            events.push(GameEvent::HelperDismissed { at });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::{ScriptedRandom, seeded};

    #[test]
    fn test_weighted_roll() {
        assert_eq!(UpgradeKind::from_roll(0.0), UpgradeKind::Scoop);
        assert_eq!(UpgradeKind::from_roll(0.379), UpgradeKind::Scoop);
        assert_eq!(UpgradeKind::from_roll(0.38), UpgradeKind::Blower);
        assert_eq!(UpgradeKind::from_roll(0.75), UpgradeKind::Blower);
        assert_eq!(UpgradeKind::from_roll(0.76), UpgradeKind::Helper);
    }

    #[test]
    fn test_first_drop_after_ten_seconds() {
        let mut upgrades = Upgrades::new();
        let mut rng = ScriptedRandom::constant(0.5);
        let mut events = Vec::new();
        let player = DRIVEWAY.center();

        upgrades.tick(9.5, player, &mut rng, &mut events);
        assert!(upgrades.pickup.is_none());
        upgrades.tick(0.5, player, &mut rng, &mut events);
        let pickup = upgrades.pickup.expect("pickup dropped");
        assert_eq!(pickup.kind, UpgradeKind::Blower);
        assert!(DRIVEWAY.contains(pickup.pos));
        assert_eq!(upgrades.spawn_timer, 20.0);
        assert!(matches!(events[0], GameEvent::UpgradeDropped { .. }));
    }

    #[test]
    fn test_spawn_timer_paused_while_pickup_waits() {
        let mut upgrades = Upgrades::new();
        let mut rng = seeded(5);
        let mut events = Vec::new();
        upgrades.tick(10.0, Vec2::ZERO, &mut rng, &mut events);
        let timer = upgrades.spawn_timer;
        upgrades.tick(30.0, Vec2::ZERO, &mut rng, &mut events);
        assert_eq!(upgrades.spawn_timer, timer);
    }

    #[test]
    fn test_collect_requires_proximity() {
        let mut upgrades = Upgrades::new();
        upgrades.pickup = Some(Pickup {
            kind: UpgradeKind::Scoop,
            pos: Vec2::new(200.0, 300.0),
            bob: 0.0,
        });
        let mut rng = seeded(1);
        let mut events = Vec::new();

        assert_eq!(
            upgrades.try_collect(Vec2::new(230.0, 300.0), &mut rng, &mut events),
            None
        );
        assert_eq!(
            upgrades.try_collect(Vec2::new(210.0, 310.0), &mut rng, &mut events),
            Some(UpgradeKind::Scoop)
        );
        assert!(upgrades.pickup.is_none());
        assert_eq!(
            upgrades.active,
            Some(ActiveUpgrade {
                kind: UpgradeKind::Scoop,
                remaining: 12.0
            })
        );
    }

    #[test]
    fn test_expiry_clears_upgrade() {
        let mut upgrades = Upgrades::new();
        let mut rng = seeded(1);
        let mut events = Vec::new();
        upgrades.activate(UpgradeKind::Blower, DRIVEWAY.center(), &mut rng, &mut events);
        assert_eq!(upgrades.active.map(|a| a.remaining), Some(10.0));

        upgrades.tick(9.9, DRIVEWAY.center(), &mut rng, &mut events);
        assert!(upgrades.is_active(UpgradeKind::Blower));
        upgrades.tick(0.2, DRIVEWAY.center(), &mut rng, &mut events);
        assert!(upgrades.active.is_none());
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::UpgradeExpired {
                kind: UpgradeKind::Blower,
                ..
            }
        )));
    }

    #[test]
    fn test_helper_cleans_and_leaves_with_upgrade() {
        let mut upgrades = Upgrades::new();
        let mut grid = SnowGrid::driveway();
        let mut rng = seeded(11);
        let mut events = Vec::new();
        upgrades.activate(UpgradeKind::Helper, DRIVEWAY.center(), &mut rng, &mut events);
        assert_eq!(upgrades.helpers.len(), 1);

        let before = grid.total();
        for _ in 0..120 {
            upgrades.tick_helpers(1.0 / 60.0, &mut grid, &mut rng, &mut events);
        }
        assert!(grid.total() < before);
        assert!(
            upgrades
                .helpers
                .iter()
                .all(|h| DRIVEWAY.contains(h.pos))
        );

        // Swapping to another upgrade sends every helper home in one step
        upgrades.activate(UpgradeKind::Scoop, DRIVEWAY.center(), &mut rng, &mut events);
        upgrades.tick_helpers(1.0 / 60.0, &mut grid, &mut rng, &mut events);
        assert!(upgrades.helpers.is_empty());
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::HelperDismissed { .. }))
                .count(),
            1
        );
    }
}
