//! Game state and core simulation types
//!
//! One `GameState` owns everything a run mutates. Only `tick` and the
//! lifecycle helpers below touch it.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::fx::Effects;
use super::grid::SnowGrid;
use super::plow::{self, Plow};
use super::rng::{RandomSource, seeded};
use super::snowfall::Snowfall;
use super::snowman::Snowmen;
use super::upgrade::Upgrades;
use super::weather::Weather;
use crate::DRIVEWAY;
use crate::consts::*;
use crate::scoring::combo_rank;

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first run
    #[default]
    Title,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// The shoveler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Last non-trivial movement direction
    pub facing: Vec2,
    pub speed: f32,
    /// Seconds until the next clearing action
    pub shovel_cooldown: f32,
    /// Seconds of snowman immunity left
    pub hurt_cooldown: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(DRIVEWAY.center().x, DRIVEWAY.bottom() - 55.0),
            facing: Vec2::new(0.0, -1.0),
            speed: PLAYER_SPEED,
            shovel_cooldown: 0.0,
            hurt_cooldown: 0.0,
        }
    }
}

impl Player {
    /// Area the player can stand in
    pub fn bounds() -> crate::Rect {
        DRIVEWAY.inset(16.0, 16.0, 16.0, 18.0)
    }

    /// Apply one step of input movement plus any wind shove
    pub fn step(&mut self, movement: Vec2, gust: f32, dt: f32) {
        if movement.x.abs() > 0.01 || movement.y.abs() > 0.01 {
            self.facing = movement;
        }
        self.pos += movement * self.speed * dt;
        self.pos.x += gust;
        self.pos = Self::bounds().clamp(self.pos);
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState<R = Pcg32> {
    pub rng: R,
    pub phase: GamePhase,
    pub score: u64,
    pub combo: u32,
    pub best_combo: u32,
    /// Seconds before the combo lapses
    pub combo_clock: f32,
    /// Run clock (ms), frozen while paused
    pub elapsed_ms: f64,
    pub lives: u8,
    /// Simulation steps taken this run
    pub time_ticks: u64,
    pub player: Player,
    pub grid: SnowGrid,
    pub snowfall: Snowfall,
    pub plow: Plow,
    pub weather: Weather,
    pub upgrades: Upgrades,
    pub snowmen: Snowmen,
    pub fx: Effects,
    /// Undrained events, oldest first
    pub events: Vec<GameEvent>,
}

impl GameState<Pcg32> {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_rng(seeded(seed))
    }
}

impl<R: RandomSource> GameState<R> {
    pub fn with_rng(mut rng: R) -> Self {
        let weather = Weather::new(&mut rng);
        Self {
            rng,
            phase: GamePhase::Title,
            score: 0,
            combo: 0,
            best_combo: 0,
            combo_clock: 0.0,
            elapsed_ms: 0.0,
            lives: STARTING_LIVES,
            time_ticks: 0,
            player: Player::default(),
            grid: SnowGrid::driveway(),
            snowfall: Snowfall::new(),
            plow: Plow::new(),
            weather,
            upgrades: Upgrades::new(),
            snowmen: Snowmen::new(),
            fx: Effects::default(),
            events: Vec::new(),
        }
    }

    /// Wipe the session back to a fresh driveway, keeping the RNG stream
    pub fn reset_session(&mut self) {
        let max_particles = self.fx.max_particles;
        self.score = 0;
        self.combo = 0;
        self.best_combo = 0;
        self.combo_clock = 0.0;
        self.elapsed_ms = 0.0;
        self.lives = STARTING_LIVES;
        self.time_ticks = 0;
        self.player = Player::default();
        self.grid = SnowGrid::driveway();
        self.snowfall = Snowfall::new();
        self.plow = Plow::new();
        self.weather = Weather::new(&mut self.rng);
        self.upgrades = Upgrades::new();
        self.snowmen = Snowmen::new();
        self.fx = Effects {
            max_particles,
            ..Default::default()
        };
    }

    /// Fresh session, straight into play
    pub fn start_run(&mut self) {
        self.reset_session();
        self.set_phase(GamePhase::Running);
    }

    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::info!("Phase {:?} -> {:?}", from, to);
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// Pause if running, resume if paused
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => self.set_phase(GamePhase::Paused),
            GamePhase::Paused => self.set_phase(GamePhase::Running),
            _ => {}
        }
    }

    /// Difficulty label shown in the HUD
    pub fn wave(&self) -> u32 {
        (self.elapsed_ms / WAVE_LENGTH_MS).floor() as u32 + 1
    }

    pub fn rank(&self) -> &'static str {
        combo_rank(self.combo)
    }

    /// Clearing here earns the near-plow bonus
    pub fn near_plow(&self) -> bool {
        plow::in_risk_band(self.player.pos) && self.plow.phase.is_threatening()
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }
}
