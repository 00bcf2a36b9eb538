//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::clearing;
use super::event::{GameEvent, Hazard};
use super::fx::{Callout, ParticleKind};
use super::plow::PlowPhase;
use super::rng::RandomSource;
use super::state::{GamePhase, GameState};
use super::upgrade::UpgradeKind;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Desired direction, magnitude at most 1
    pub movement: Vec2,
    /// Shovel (or blower) held down
    pub action_held: bool,
    /// Pause toggle, already debounced
    pub pause: bool,
}

impl TickInput {
    pub fn new(movement: Vec2, action_held: bool, pause: bool) -> Self {
        Self {
            movement: movement.clamp_length_max(1.0),
            action_held,
            pause,
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick<R: RandomSource>(state: &mut GameState<R>, input: &TickInput, dt: f32) {
    let first_event = state.events.len();

    if input.pause {
        state.toggle_pause();
    }

    // Title, pause and game over only animate leftover effects
    if state.phase != GamePhase::Running {
        present(state, first_event);
        animate(state, dt);
        return;
    }

    state.time_ticks += 1;
    state.elapsed_ms += f64::from(dt) * 1000.0;
    state.combo_clock = (state.combo_clock - dt).max(0.0);
    state.player.hurt_cooldown = (state.player.hurt_cooldown - dt).max(0.0);
    if state.combo_clock == 0.0 && state.combo > 0 {
        state.combo = 0;
    }

    update_player(state, input, dt);

    if let Some(kind) = state.weather.tick(dt, &mut state.rng) {
        state.events.push(GameEvent::WeatherChanged { kind });
    }

    state.snowfall.tick(
        &mut state.grid,
        &state.weather,
        state.elapsed_ms,
        dt,
        &mut state.rng,
    );

    let was_passing = state.plow.phase == PlowPhase::Passing;
    let run_over = state.plow.tick(
        dt,
        state.elapsed_ms,
        state.player.pos,
        &mut state.grid,
        &mut state.rng,
        &mut state.events,
    );
    if was_passing || state.plow.phase == PlowPhase::Passing {
        state.fx.shake(2.6);
    }
    if run_over {
        damage_player(state, Hazard::Plow);
    }

    state
        .upgrades
        .tick(dt, state.player.pos, &mut state.rng, &mut state.events);
    state
        .upgrades
        .tick_helpers(dt, &mut state.grid, &mut state.rng, &mut state.events);

    let vulnerable = state.player.hurt_cooldown == 0.0;
    let touched = state.snowmen.tick(
        dt,
        state.player.pos,
        vulnerable,
        &mut state.grid,
        &mut state.rng,
        &mut state.events,
    );
    if touched {
        state.player.hurt_cooldown = HURT_COOLDOWN;
        damage_player(state, Hazard::Snowman);
    }

    if state.lives == 0 {
        state.set_phase(GamePhase::GameOver);
    }

    present(state, first_event);
    animate(state, dt);
}

/// Cosmetic timers that keep going outside of play
fn animate<R: RandomSource>(state: &mut GameState<R>, dt: f32) {
    state.fx.tick(dt);
    state.upgrades.animate(dt);
}

fn update_player<R: RandomSource>(state: &mut GameState<R>, input: &TickInput, dt: f32) {
    let movement = input.movement.clamp_length_max(1.0);
    let gust = state.weather.gust(dt);
    state.player.step(movement, gust, dt);

    state
        .upgrades
        .try_collect(state.player.pos, &mut state.rng, &mut state.events);

    state.player.shovel_cooldown = (state.player.shovel_cooldown - dt).max(0.0);
    if input.action_held && state.player.shovel_cooldown == 0.0 {
        clearing::act(state);
    }
}

/// Lose a life and the combo
pub fn damage_player<R: RandomSource>(state: &mut GameState<R>, by: Hazard) {
    state.lives = state.lives.saturating_sub(1);
    state.combo = 0;
    state.combo_clock = 0.0;
    log::info!("Player hit by {:?}, {} lives left", by, state.lives);
    state.events.push(GameEvent::PlayerHit {
        by,
        lives_left: state.lives,
        at: state.player.pos,
    });
}

/// Group digits the way the HUD shows them: 12,345
pub fn format_points(points: u64) -> String {
    let digits = points.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn upgrade_color(kind: UpgradeKind) -> u32 {
    match kind {
        UpgradeKind::Scoop => 0x7cd3ff,
        UpgradeKind::Blower => 0xffcd68,
        UpgradeKind::Helper => 0xffb6c1,
    }
}

/// Turn this tick's events into callouts, text, shake and particles
fn present<R: RandomSource>(state: &mut GameState<R>, from: usize) {
    let GameState {
        fx, rng, events, ..
    } = state;

    for event in &events[from..] {
        match *event {
            GameEvent::PlowPhaseChanged {
                to: PlowPhase::Warning,
                ..
            } => {
                fx.callout(Callout::new("PLOW INCOMING", 1.2, 0xffd84c, 26.0));
                fx.shake(5.0);
            }
            GameEvent::PlowSpray { at } => {
                fx.burst(
                    &mut *rng,
                    at,
                    4,
                    ParticleKind::Snow,
                    (-60.0, 60.0),
                    (-120.0, -50.0),
                    (0.3, 0.6),
                );
            }
            GameEvent::SnowCleared {
                points,
                near_plow,
                frenzy,
                at,
                ..
            } => {
                let (tag, color) = if near_plow {
                    (" RISK!", 0xff9f62)
                } else if frenzy {
                    (" FRENZY!", 0x8ff8ff)
                } else {
                    ("", 0xfff4ca)
                };
                let pos = Vec2::new(at.x + rng.range(-8.0, 8.0), at.y - 28.0);
                fx.float_text(pos, format!("+{}{}", format_points(points), tag), 0.9, color);
            }
            GameEvent::ComboMilestone { rank, .. } => {
                fx.callout(Callout::new(rank, 1.2, 0xffea73, 18.0));
                fx.shake(5.0);
            }
            GameEvent::PlayerHit { at, .. } => {
                fx.shake = 12.0;
                fx.flash = 0.4;
                fx.callout(Callout::new("SMOKED BY THE PLOW!", 1.0, 0xff5570, 20.0));
                fx.burst(
                    &mut *rng,
                    at,
                    26,
                    ParticleKind::Spark,
                    (-160.0, 160.0),
                    (-200.0, -40.0),
                    (0.4, 0.8),
                );
            }
            GameEvent::UpgradeDropped { .. } => {
                fx.callout(Callout::new("UPGRADE DROP!", 0.9, 0x8ff8ff, 18.0));
            }
            GameEvent::UpgradeCollected { kind, at } => {
                let (life, size) = match kind {
                    UpgradeKind::Helper => (1.5, 24.0),
                    _ => (1.2, 28.0),
                };
                fx.callout(
                    Callout::new(kind.label(), life, upgrade_color(kind), size)
                        .at(at - Vec2::new(0.0, 10.0))
                        .brick()
                        .growing(),
                );
                fx.burst(
                    &mut *rng,
                    at,
                    18,
                    ParticleKind::Spark,
                    (-120.0, 120.0),
                    (-160.0, -30.0),
                    (0.35, 0.7),
                );
            }
            GameEvent::UpgradeExpired { at, .. } => {
                fx.callout(
                    Callout::new("UPGRADE EXPIRED", 0.9, 0xffd9a8, 16.0).at(at - Vec2::new(0.0, 26.0)),
                );
            }
            GameEvent::HelperDismissed { at } => {
                fx.callout(
                    Callout::new("HELPER BOUNCED", 1.0, 0xffd9a8, 18.0).at(at - Vec2::new(0.0, 10.0)),
                );
            }
            GameEvent::WeatherChanged { kind } => {
                fx.callout(Callout::new(kind.label(), 1.1, 0xd8f2ff, 22.0).brick());
            }
            GameEvent::SnowmanSpawned { .. } => {
                fx.callout(Callout::new("ROGUE SNOWMAN ATTACK!!", 1.5, 0xff8f9f, 30.0).brick());
                fx.shake(9.0);
            }
            GameEvent::SnowmanHit { at } => {
                fx.shake(4.2);
                fx.callout(Callout::new("-1", 0.35, 0xffe9af, 16.0).at(at - Vec2::new(0.0, 60.0)));
            }
            GameEvent::SnowmanSmashed { bonus, at } => {
                fx.callout(
                    Callout::new("SNOWMAN SMASHED!", 1.0, 0xffe47f, 22.0)
                        .at(at - Vec2::new(0.0, 76.0))
                        .brick(),
                );
                fx.float_text(
                    at + Vec2::new(-20.0, -18.0),
                    format!("+{}", format_points(bonus)),
                    1.0,
                    0xfff4ca,
                );
            }
            GameEvent::PhaseChanged { .. } | GameEvent::PlowPhaseChanged { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Player;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start_run();
        state.events.clear();
        state
    }

    #[test]
    fn test_tick_input_clamps_movement() {
        let input = TickInput::new(Vec2::new(3.0, 4.0), true, false);
        assert!((input.movement.length() - 1.0).abs() < 1e-5);
        let input = TickInput::new(Vec2::new(0.3, 0.0), false, false);
        assert_eq!(input.movement, Vec2::new(0.3, 0.0));
    }

    #[test]
    fn test_title_does_not_advance() {
        let mut state = GameState::new(7);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.elapsed_ms, 0.0);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_plow_shakes_on_its_last_passing_step() {
        let mut state = running(6);
        state.player.pos = Player::bounds().clamp(Vec2::new(240.0, 0.0));
        state.plow.phase = PlowPhase::Passing;
        state.plow.direction = 1.0;
        state.plow.pos.x = WIDTH + crate::sim::plow::EXIT_MARGIN - 0.5;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.plow.phase, PlowPhase::Cooldown);
        assert!(state.fx.shake > 2.0);
    }

    #[test]
    fn test_pickup_keeps_bobbing_while_paused() {
        let mut state = running(8);
        state.upgrades.pickup = Some(crate::sim::Pickup {
            kind: UpgradeKind::Scoop,
            pos: Vec2::new(200.0, 300.0),
            bob: 0.0,
        });
        state.toggle_pause();

        tick(&mut state, &TickInput::default(), SIM_DT);
        let bob = state.upgrades.pickup.map(|p| p.bob);
        assert!(bob.is_some_and(|b| b > 0.0));
    }

    #[test]
    fn test_tick_pause() {
        let mut state = running(12345);
        tick(&mut state, &TickInput::default(), SIM_DT);
        let elapsed = state.elapsed_ms;

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Frozen while paused
        let grid = state.grid.depths().to_vec();
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.elapsed_ms, elapsed);
        assert_eq!(state.grid.depths(), grid.as_slice());

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.elapsed_ms > elapsed);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = running(42);
        let mut b = running(42);
        for step in 0..1200 {
            let angle = step as f32 * 0.05;
            let input = TickInput::new(Vec2::new(angle.cos(), angle.sin()), step % 3 != 0, false);
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.combo, b.combo);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.grid.depths(), b.grid.depths());
        assert_eq!(a.plow.pos, b.plow.pos);
        assert_eq!(a.player.pos, b.player.pos);
    }

    #[test]
    fn test_combo_lapses() {
        let mut state = running(3);
        state.combo = 5;
        state.combo_clock = 0.01;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.combo, 0);
        assert_eq!(state.combo_clock, 0.0);
    }

    #[test]
    fn test_holding_action_builds_combo() {
        let mut state = running(5);
        let dig = TickInput::new(Vec2::ZERO, true, false);
        tick(&mut state, &dig, SIM_DT);
        assert_eq!(state.combo, 1);
        assert!(state.score > 0);
        assert!(
            state
                .events
                .iter()
                .any(|e| e.sound() == Some(crate::sim::SoundCue::Shovel))
        );
        assert_eq!(state.fx.floating_text.len(), 1);
        assert!(state.fx.floating_text[0].text.starts_with('+'));
    }

    #[test]
    fn test_plow_hit_costs_a_life() {
        let mut state = running(9);
        state.player.pos = Player::bounds().clamp(Vec2::new(240.0, 1000.0));
        state.plow.phase = PlowPhase::Passing;
        state.plow.direction = 1.0;
        state.plow.pos.x = 230.0;
        state.combo = 12;
        state.combo_clock = 2.0;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.combo, 0);
        assert_eq!(state.plow.phase, PlowPhase::Cooldown);
        assert!(state.fx.shake > 11.0);
        assert!(state.fx.flash > 0.3);
        assert!(state.fx.callouts.iter().any(|c| c.text == "SMOKED BY THE PLOW!"));
        assert!(
            state
                .fx
                .particles
                .iter()
                .filter(|p| p.kind == ParticleKind::Spark)
                .count()
                >= 26
        );
    }

    #[test]
    fn test_three_hits_end_the_run() {
        let mut state = running(2024);
        let idle = TickInput::default();
        let mut hits = 0;
        for _ in 0..(60 * 120) {
            // Stand in the street band and wait for the plow
            state.player.pos.y = Player::bounds().bottom();
            tick(&mut state, &idle, SIM_DT);
            hits += state
                .drain_events()
                .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
                .count();
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert_eq!(hits, 3);

        // Nothing moves once the run is over
        let elapsed = state.elapsed_ms;
        tick(&mut state, &idle, SIM_DT);
        assert_eq!(state.elapsed_ms, elapsed);
    }

    #[test]
    fn test_damage_player_never_underflows() {
        let mut state = running(1);
        for _ in 0..5 {
            damage_player(&mut state, Hazard::Snowman);
        }
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(0), "0");
        assert_eq!(format_points(112), "112");
        assert_eq!(format_points(7500), "7,500");
        assert_eq!(format_points(1_234_567), "1,234,567");
    }
}
