//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Randomness only through [`RandomSource`]
//! - Stable iteration order (insertion order for snowmen and helpers)
//! - No rendering or platform dependencies

pub mod clearing;
pub mod event;
pub mod fx;
pub mod grid;
pub mod plow;
pub mod rng;
pub mod snowfall;
pub mod snowman;
pub mod state;
pub mod tick;
pub mod upgrade;
pub mod weather;

pub use event::{GameEvent, Hazard, SoundCue};
pub use fx::{Callout, CalloutStyle, Effects, FloatingText, Particle, ParticleKind};
pub use grid::{Cell, SnowGrid};
pub use plow::{Plow, PlowPhase};
pub use rng::{RandomSource, ScriptedRandom, seeded};
pub use snowfall::Snowfall;
pub use snowman::{Snowman, SnowmanPhase, Snowmen};
pub use state::{GamePhase, GameState, Player};
pub use tick::{TickInput, damage_player, format_points, tick};
pub use upgrade::{ActiveUpgrade, Helper, Pickup, UpgradeKind, Upgrades};
pub use weather::{Weather, WeatherKind};
