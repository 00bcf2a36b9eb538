//! Browser bindings
//!
//! The page owns the canvas, the DOM listeners and the audio graph. It
//! forwards input here, calls `frame` from `requestAnimationFrame` and draws
//! the returned snapshot JSON.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::VisibilityState;

use super::{AudioSink, FrameSink, Gain, InputState, KeyCode};
use crate::game::Game;
use crate::persistence::{LocalStorageStore, MemoryStore, ScoreStore};
use crate::settings::{QualityPreset, Settings};
use crate::sim::SoundCue;
use crate::snapshot::Snapshot;

/// Forwards cues to a JS callback taking the cue name and the master level
#[derive(Clone, Default)]
struct JsAudio {
    callback: Rc<RefCell<Option<js_sys::Function>>>,
    gain: Rc<Cell<Gain>>,
}

impl JsAudio {
    fn update(&self, f: impl FnOnce(&mut Gain)) {
        let mut gain = self.gain.get();
        f(&mut gain);
        self.gain.set(gain);
    }
}

impl AudioSink for JsAudio {
    fn play(&mut self, cue: SoundCue) {
        let Some(level) = self.gain.get().level() else {
            return;
        };
        if let Some(callback) = self.callback.borrow().as_ref() {
            let name = JsValue::from_str(cue.as_str());
            let level = JsValue::from_f64(level.into());
            if let Err(e) = callback.call2(&JsValue::NULL, &name, &level) {
                log::warn!("Audio callback failed: {:?}", e);
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.update(|gain| gain.set_volume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.update(|gain| gain.set_muted(muted));
    }
}

/// Keeps the latest snapshot as JSON
#[derive(Default)]
struct JsonFrame {
    json: String,
}

impl FrameSink for JsonFrame {
    fn present(&mut self, snapshot: &Snapshot) {
        match snapshot.to_json() {
            Ok(json) => self.json = json,
            Err(e) => log::warn!("Snapshot encode failed: {}", e),
        }
    }
}

fn open_store() -> Box<dyn ScoreStore> {
    match LocalStorageStore::open() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("{}; records will not persist", e);
            Box::new(MemoryStore::new())
        }
    }
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    input: InputState,
    frame: JsonFrame,
    audio: JsAudio,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> WebGame {
        let audio = JsAudio::default();
        let game = Game::new(seed as u64, open_store(), Box::new(audio.clone()));
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            game,
            input: InputState::new(),
            frame: JsonFrame::default(),
            audio,
        }
    }

    /// Start or restart a run
    pub fn start(&mut self) {
        self.input = InputState::new();
        self.game.start_run();
    }

    /// Advance to `now_ms` (the rAF timestamp) and return the snapshot JSON
    pub fn frame(&mut self, now_ms: f64) -> String {
        self.game
            .frame(now_ms / 1000.0, &mut self.input, &mut self.frame);
        self.frame.json.clone()
    }

    /// `KeyboardEvent.code`; returns true when the game uses the key
    pub fn key_down(&mut self, code: &str) -> bool {
        match KeyCode::from_code(code) {
            Some(key) => {
                self.input.key_down(key);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        match KeyCode::from_code(code) {
            Some(key) => {
                self.input.key_up(key);
                true
            }
            None => false,
        }
    }

    pub fn set_action(&mut self, held: bool) {
        self.input.set_action(held);
    }

    pub fn press_pause(&mut self) {
        self.input.press_pause();
    }

    pub fn resume(&mut self) {
        self.game.resume();
    }

    /// Virtual joystick knob offset in pad radii
    pub fn set_joystick(&mut self, x: f32, y: f32) {
        self.input.set_joystick(Vec2::new(x, y));
    }

    pub fn release_joystick(&mut self) {
        self.input.release_joystick();
    }

    /// Drag target as a fraction of the playfield
    pub fn set_mouse_target(&mut self, x: f32, y: f32) {
        self.input.set_mouse_target(Some(Vec2::new(x, y)));
    }

    pub fn clear_mouse_target(&mut self) {
        self.input.set_mouse_target(None);
    }

    /// Hook for `visibilitychange` and `blur`
    pub fn on_visibility_change(&mut self) {
        let hidden = web_sys::window()
            .and_then(|w| w.document())
            .is_none_or(|d| d.visibility_state() == VisibilityState::Hidden);
        if hidden {
            self.input = InputState::new();
            self.game.visibility_lost();
        }
    }

    /// Returns the rank reached, 0 when nothing was pending
    pub fn submit_initials(&mut self, initials: &str) -> u32 {
        self.game
            .submit_initials(initials)
            .map_or(0, |rank| rank as u32)
    }

    pub fn leaderboard_json(&self) -> String {
        self.game.leaderboard().to_json().unwrap_or_else(|e| {
            log::warn!("Leaderboard encode failed: {}", e);
            "[]".to_string()
        })
    }

    pub fn settings_json(&self) -> String {
        serde_json::to_string(self.game.settings()).unwrap_or_default()
    }

    /// Replace preferences from JSON; unknown fields keep their defaults
    pub fn apply_settings(&mut self, json: &str) {
        self.game.set_settings(Settings::parse(Some(json)));
    }

    pub fn set_volume(&mut self, volume: f32) {
        let settings = Settings {
            volume: volume.clamp(0.0, 1.0),
            ..self.game.settings().clone()
        };
        self.game.set_settings(settings);
    }

    pub fn set_muted(&mut self, muted: bool) {
        let settings = Settings {
            muted,
            ..self.game.settings().clone()
        };
        self.game.set_settings(settings);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        let settings = Settings {
            reduced_motion: reduced,
            ..self.game.settings().clone()
        };
        self.game.set_settings(settings);
    }

    /// "low", "medium" or "high"; returns false for anything else
    pub fn set_quality(&mut self, name: &str) -> bool {
        match QualityPreset::from_name(name) {
            Some(preset) => {
                self.game.set_quality(preset);
                true
            }
            None => false,
        }
    }

    /// `callback(cueName, level)` is called for every audible sound cue
    pub fn set_audio_callback(&mut self, callback: js_sys::Function) {
        *self.audio.callback.borrow_mut() = Some(callback);
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger init failed: {e}").into());
    }
    log::info!("Snow Shovel Arcade starting...");
}
