//! Frame driver and run lifecycle
//!
//! `Game` owns the simulation plus everything that outlives a run: records,
//! settings and the injected storage and audio backends. The host calls
//! [`Game::frame`] once per display frame.

use rand_pcg::Pcg32;

use crate::consts::{MAX_FRAME_DELTA, SIM_DT};
use crate::leaderboard::{ANONYMOUS, Leaderboard};
use crate::persistence::ScoreStore;
use crate::platform::{AudioSink, FrameSink, InputContext, InputSource};
use crate::settings::{QualityPreset, Settings};
use crate::sim::{GameEvent, GamePhase, GameState, RandomSource, TickInput, seeded, tick};
use crate::snapshot::Snapshot;

pub struct Game<R = Pcg32> {
    state: GameState<R>,
    store: Box<dyn ScoreStore>,
    audio: Box<dyn AudioSink>,
    settings: Settings,
    leaderboard: Leaderboard,
    high_score: u64,
    /// Finished run qualified and is waiting for initials
    pending_entry: bool,
    accumulator: f32,
    /// Timestamp of the previous frame (s)
    last_time: Option<f64>,
}

impl Game<Pcg32> {
    pub fn new(seed: u64, store: Box<dyn ScoreStore>, audio: Box<dyn AudioSink>) -> Self {
        Self::with_rng(seeded(seed), store, audio)
    }
}

impl<R: RandomSource> Game<R> {
    pub fn with_rng(rng: R, store: Box<dyn ScoreStore>, mut audio: Box<dyn AudioSink>) -> Self {
        let (leaderboard, high_score) = Leaderboard::load(store.as_ref());
        let settings = Settings::load(store.as_ref());
        apply_audio(audio.as_mut(), &settings);

        let mut state = GameState::with_rng(rng);
        state.fx.max_particles = settings.max_particles();

        Self {
            state,
            store,
            audio,
            settings,
            leaderboard,
            high_score,
            pending_entry: false,
            accumulator: 0.0,
            last_time: None,
        }
    }

    pub fn state(&self) -> &GameState<R> {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The last run is waiting for initials
    pub fn awaiting_initials(&self) -> bool {
        self.pending_entry
    }

    /// Place the unnamed run will take on the leaderboard
    pub fn pending_rank(&self) -> Option<usize> {
        if self.pending_entry {
            self.leaderboard.potential_rank(self.state.score)
        } else {
            None
        }
    }

    /// Begin a fresh run from any phase.
    ///
    /// A qualifying score nobody named yet is filed as `???` first.
    pub fn start_run(&mut self) {
        if self.pending_entry {
            self.submit_initials(ANONYMOUS);
        }
        self.state.start_run();
        self.accumulator = 0.0;
        self.dispatch_events();
    }

    /// Advance by wall-clock time and draw once.
    ///
    /// Returns the number of simulation steps taken.
    pub fn frame(
        &mut self,
        now_secs: f64,
        input: &mut dyn InputSource,
        sink: &mut dyn FrameSink,
    ) -> u32 {
        let delta = match self.last_time {
            Some(last) => ((now_secs - last) as f32).clamp(0.0, MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last_time = Some(now_secs);

        self.accumulator += delta;
        let mut steps = 0;
        while self.accumulator >= SIM_DT {
            let next = input.poll(&InputContext::from_state(&self.state));
            self.step(&next);
            self.accumulator -= SIM_DT;
            steps += 1;
        }

        sink.present(&self.snapshot());
        steps
    }

    /// Run exactly one simulation step; returns what happened in it
    pub fn step(&mut self, input: &TickInput) -> Vec<GameEvent> {
        tick(&mut self.state, input, SIM_DT);
        self.dispatch_events()
    }

    fn dispatch_events(&mut self) -> Vec<GameEvent> {
        let events: Vec<GameEvent> = self.state.drain_events().collect();
        for event in &events {
            if let Some(cue) = event.sound() {
                self.audio.play(cue);
            }
            if let GameEvent::PhaseChanged {
                to: GamePhase::GameOver,
                ..
            } = event
            {
                self.end_run();
            }
        }
        events
    }

    fn end_run(&mut self) {
        let score = self.state.score;
        self.high_score = self.high_score.max(score);
        self.pending_entry = self.leaderboard.qualifies(score);
        self.leaderboard.save(self.store.as_mut(), self.high_score);
        log::info!(
            "Run over: score {}, best combo {}, wave {}{}",
            score,
            self.state.best_combo,
            self.state.wave(),
            if self.pending_entry {
                " (leaderboard)"
            } else {
                ""
            }
        );
    }

    /// File the finished run under `initials`.
    ///
    /// Returns the rank reached, or None when no entry was pending.
    pub fn submit_initials(&mut self, initials: &str) -> Option<usize> {
        if !self.pending_entry {
            return None;
        }
        self.pending_entry = false;
        let rank = self.leaderboard.submit(initials, self.state.score);
        if let Some(top) = self.leaderboard.top_score() {
            self.high_score = self.high_score.max(top);
        }
        self.leaderboard.save(self.store.as_mut(), self.high_score);
        rank
    }

    /// Tab hidden or window blurred
    pub fn visibility_lost(&mut self) {
        if self.state.phase == GamePhase::Running {
            log::info!("Auto-paused (hidden)");
            self.state.set_phase(GamePhase::Paused);
            self.dispatch_events();
        }
    }

    /// Pause menu resume button
    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.set_phase(GamePhase::Running);
            self.dispatch_events();
        }
    }

    /// Apply and persist new preferences
    pub fn set_settings(&mut self, settings: Settings) {
        apply_audio(self.audio.as_mut(), &settings);
        self.state.fx.max_particles = settings.max_particles();
        self.state.fx.particles.truncate(self.state.fx.max_particles);
        settings.save(self.store.as_mut());
        self.settings = settings;
    }

    /// Switch quality preset, keeping the other preferences
    pub fn set_quality(&mut self, preset: QualityPreset) {
        let mut settings = self.settings.clone();
        settings.apply_preset(preset);
        log::info!("Quality set to {}", preset.as_str());
        self.set_settings(settings);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.high_score, &self.settings)
            .with_initials_prompt(self.pending_rank())
    }
}

fn apply_audio(audio: &mut dyn AudioSink, settings: &Settings) {
    audio.set_volume(settings.effective_volume());
    audio.set_muted(settings.muted);
}
