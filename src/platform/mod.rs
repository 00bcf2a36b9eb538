//! Platform abstraction layer
//!
//! The game core talks to the outside world through three ports:
//! - [`InputSource`] yields one [`TickInput`] per simulation step
//! - [`AudioSink`] receives discrete [`SoundCue`]s
//! - [`FrameSink`] receives one [`Snapshot`] per rendered frame
//!
//! Browser bindings live in `web` (wasm32 only).

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use glam::Vec2;

use crate::normalize_point;
use crate::sim::{
    GamePhase, GameState, Pickup, Player, Plow, RandomSource, SnowGrid, Snowman, SoundCue,
    TickInput,
};
use crate::snapshot::Snapshot;

pub mod autopilot;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use autopilot::Autopilot;

/// Joystick axes below this magnitude read as zero
pub const DEAD_ZONE: f32 = 0.18;
/// Mouse targets closer than this (normalized units) count as reached
const MOUSE_ARRIVED: f32 = 0.02;

/// Read-only view an input source may use to decide the next move
#[derive(Debug, Clone, Copy)]
pub struct InputContext<'a> {
    pub phase: GamePhase,
    pub player: &'a Player,
    /// Player position scaled to [0, 1] over the playfield
    pub player_normalized: Vec2,
    pub grid: &'a SnowGrid,
    pub plow: &'a Plow,
    pub pickup: Option<Pickup>,
    pub snowmen: &'a [Snowman],
    pub time_ticks: u64,
}

impl<'a> InputContext<'a> {
    pub fn from_state<R: RandomSource>(state: &'a GameState<R>) -> Self {
        Self {
            phase: state.phase,
            player: &state.player,
            player_normalized: normalize_point(state.player.pos),
            grid: &state.grid,
            plow: &state.plow,
            pickup: state.upgrades.pickup,
            snowmen: &state.snowmen.list,
            time_ticks: state.time_ticks,
        }
    }
}

/// Produces the input for each simulation step
pub trait InputSource {
    fn poll(&mut self, ctx: &InputContext<'_>) -> TickInput;
}

/// Plays sound cues
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);

    fn set_volume(&mut self, _volume: f32) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Draws a frame
pub trait FrameSink {
    fn present(&mut self, snapshot: &Snapshot);
}

/// Master volume and mute, applied by every sink that makes noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain {
    volume: f32,
    muted: bool,
}

impl Default for Gain {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
        }
    }
}

impl Gain {
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Playback level, `None` when nothing should be heard
    pub fn level(&self) -> Option<f32> {
        (!self.muted && self.volume > 0.0).then_some(self.volume)
    }
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Logs cues at debug level, for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio {
    gain: Gain,
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        if let Some(level) = self.gain.level() {
            log::debug!("Sound: {} at {:.2}", cue.as_str(), level);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.gain.set_volume(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.gain.set_muted(muted);
    }
}

/// Collects audible cues into a shared queue that the owner drains
#[derive(Debug, Default, Clone)]
pub struct CueQueue {
    cues: Rc<RefCell<Vec<SoundCue>>>,
    gain: Rc<Cell<Gain>>,
}

impl CueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every cue played so far
    pub fn take(&self) -> Vec<SoundCue> {
        self.cues.take()
    }

    pub fn gain(&self) -> Gain {
        self.gain.get()
    }
}

impl AudioSink for CueQueue {
    fn play(&mut self, cue: SoundCue) {
        if self.gain.get().level().is_some() {
            self.cues.borrow_mut().push(cue);
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let mut gain = self.gain.get();
        gain.set_volume(volume);
        self.gain.set(gain);
    }

    fn set_muted(&mut self, muted: bool) {
        let mut gain = self.gain.get();
        gain.set_muted(muted);
        self.gain.set(gain);
    }
}

/// Keeps the latest frame, for headless runs and tests
#[derive(Debug, Default)]
pub struct FrameRecorder {
    pub frames: u64,
    pub last: Option<Snapshot>,
}

impl FrameSink for FrameRecorder {
    fn present(&mut self, snapshot: &Snapshot) {
        self.frames += 1;
        self.last = Some(snapshot.clone());
    }
}

/// Logical keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Action,
    Pause,
}

/// Physical keys, one per DOM `KeyboardEvent.code` the game binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    Space,
    KeyP,
    Escape,
}

impl KeyCode {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "KeyW" => KeyCode::KeyW,
            "KeyA" => KeyCode::KeyA,
            "KeyS" => KeyCode::KeyS,
            "KeyD" => KeyCode::KeyD,
            "Space" => KeyCode::Space,
            "KeyP" => KeyCode::KeyP,
            "Escape" => KeyCode::Escape,
            _ => return None,
        })
    }

    pub fn key(self) -> Key {
        match self {
            KeyCode::ArrowUp | KeyCode::KeyW => Key::Up,
            KeyCode::ArrowDown | KeyCode::KeyS => Key::Down,
            KeyCode::ArrowLeft | KeyCode::KeyA => Key::Left,
            KeyCode::ArrowRight | KeyCode::KeyD => Key::Right,
            KeyCode::Space => Key::Action,
            KeyCode::KeyP | KeyCode::Escape => Key::Pause,
        }
    }
}

/// Merges keyboard, virtual joystick and mouse steering into one input
#[derive(Debug, Default, Clone)]
pub struct InputState {
    /// Physical keys currently down
    held: HashSet<KeyCode>,
    joystick: Vec2,
    /// Normalized playfield point the mouse is dragging toward
    mouse_target: Option<Vec2>,
    /// On-screen action button
    action_button: bool,
    pause_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: KeyCode) {
        // Auto-repeat re-sends keydown; pause fires once per press
        if self.held.insert(code) && code.key() == Key::Pause {
            self.pause_pressed = true;
        }
    }

    pub fn key_up(&mut self, code: KeyCode) {
        self.held.remove(&code);
    }

    /// Any bound key for `key` is down
    pub fn is_down(&self, key: Key) -> bool {
        self.held.iter().any(|c| c.key() == key)
    }

    /// On-screen action button
    pub fn set_action(&mut self, held: bool) {
        self.action_button = held;
    }

    pub fn press_pause(&mut self) {
        self.pause_pressed = true;
    }

    /// Knob offset in pad radii; clamped to the pad and dead-zoned per axis
    pub fn set_joystick(&mut self, offset: Vec2) {
        let v = offset.clamp_length_max(1.0);
        let axis = |a: f32| if a.abs() < DEAD_ZONE { 0.0 } else { a };
        self.joystick = Vec2::new(axis(v.x), axis(v.y));
    }

    pub fn release_joystick(&mut self) {
        self.joystick = Vec2::ZERO;
    }

    pub fn set_mouse_target(&mut self, target: Option<Vec2>) {
        self.mouse_target = target;
    }

    pub fn action_held(&self) -> bool {
        self.action_button || self.is_down(Key::Action)
    }

    /// Combined direction, magnitude at most 1
    pub fn movement(&self, player_normalized: Vec2) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.is_down(Key::Left) {
            v.x -= 1.0;
        }
        if self.is_down(Key::Right) {
            v.x += 1.0;
        }
        if self.is_down(Key::Up) {
            v.y -= 1.0;
        }
        if self.is_down(Key::Down) {
            v.y += 1.0;
        }

        v += self.joystick;

        if let Some(target) = self.mouse_target {
            let to_target = target - player_normalized;
            let dist = to_target.length();
            if dist > MOUSE_ARRIVED {
                v += to_target / dist;
            }
        }

        v.clamp_length_max(1.0)
    }

    /// True once per press
    pub fn consume_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_pressed)
    }
}

impl InputSource for InputState {
    fn poll(&mut self, ctx: &InputContext<'_>) -> TickInput {
        TickInput::new(
            self.movement(ctx.player_normalized),
            self.action_held(),
            self.consume_pause(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_map_from_dom_codes() {
        assert_eq!(KeyCode::from_code("KeyW").map(KeyCode::key), Some(Key::Up));
        assert_eq!(
            KeyCode::from_code("ArrowLeft").map(KeyCode::key),
            Some(Key::Left)
        );
        assert_eq!(
            KeyCode::from_code("Escape").map(KeyCode::key),
            Some(Key::Pause)
        );
        assert_eq!(KeyCode::from_code("KeyQ"), None);
    }

    #[test]
    fn test_diagonal_keys_are_normalized() {
        let mut input = InputState::new();
        input.key_down(KeyCode::ArrowUp);
        input.key_down(KeyCode::KeyD);
        let v = input.movement(Vec2::splat(0.5));
        assert!((v.length() - 1.0).abs() < 1e-5);
        assert!(v.x > 0.0 && v.y < 0.0);

        input.key_up(KeyCode::ArrowUp);
        assert_eq!(input.movement(Vec2::splat(0.5)), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_direction_held_by_either_binding() {
        let mut input = InputState::new();
        input.key_down(KeyCode::ArrowLeft);
        input.key_down(KeyCode::KeyA);
        input.key_up(KeyCode::KeyA);
        assert_eq!(input.movement(Vec2::ZERO), Vec2::new(-1.0, 0.0));
        input.key_up(KeyCode::ArrowLeft);
        assert_eq!(input.movement(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_joystick_dead_zone() {
        let mut input = InputState::new();
        input.set_joystick(Vec2::new(0.1, 0.5));
        assert_eq!(input.movement(Vec2::ZERO), Vec2::new(0.0, 0.5));
        input.set_joystick(Vec2::new(3.0, 0.0));
        assert_eq!(input.movement(Vec2::ZERO), Vec2::new(1.0, 0.0));
        input.release_joystick();
        assert_eq!(input.movement(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_mouse_steers_until_close() {
        let mut input = InputState::new();
        input.set_mouse_target(Some(Vec2::new(0.5, 0.2)));
        let v = input.movement(Vec2::new(0.5, 0.6));
        assert!((v - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert_eq!(input.movement(Vec2::new(0.5, 0.21)), Vec2::ZERO);
    }

    #[test]
    fn test_pause_consumed_once() {
        let mut input = InputState::new();
        input.key_down(KeyCode::KeyP);
        assert!(input.consume_pause());
        assert!(!input.consume_pause());
        // Auto-repeat while held does not pause again
        input.key_down(KeyCode::KeyP);
        assert!(!input.consume_pause());
        input.key_up(KeyCode::KeyP);
        input.key_down(KeyCode::Escape);
        assert!(input.consume_pause());
    }

    #[test]
    fn test_action_follows_space_and_button() {
        let mut input = InputState::new();
        input.key_down(KeyCode::Space);
        assert!(input.action_held());
        input.key_up(KeyCode::Space);
        assert!(!input.action_held());
        input.set_action(true);
        assert!(input.action_held());
        input.set_action(false);
        assert!(!input.action_held());
    }

    #[test]
    fn test_gain_levels() {
        let mut gain = Gain::default();
        assert_eq!(gain.level(), Some(1.0));
        gain.set_volume(1.7);
        assert_eq!(gain.level(), Some(1.0));
        gain.set_volume(0.3);
        assert_eq!(gain.level(), Some(0.3));
        gain.set_muted(true);
        assert_eq!(gain.level(), None);
        gain.set_muted(false);
        gain.set_volume(f32::NAN);
        assert_eq!(gain.level(), None);
    }

    #[test]
    fn test_cue_queue_drops_silent_cues() {
        let queue = CueQueue::new();
        let mut sink: Box<dyn AudioSink> = Box::new(queue.clone());
        sink.set_volume(0.0);
        sink.play(SoundCue::Shovel);
        assert!(queue.take().is_empty());
        sink.set_volume(0.6);
        sink.play(SoundCue::Shovel);
        assert_eq!(queue.take(), vec![SoundCue::Shovel]);
        assert_eq!(queue.gain().level(), Some(0.6));
    }

    #[test]
    fn test_cue_queue_shares_between_clones() {
        let queue = CueQueue::new();
        let mut sink: Box<dyn AudioSink> = Box::new(queue.clone());
        sink.play(SoundCue::Crash);
        sink.play(SoundCue::Shovel);
        assert_eq!(queue.take(), vec![SoundCue::Crash, SoundCue::Shovel]);
        assert!(queue.take().is_empty());
    }
}
