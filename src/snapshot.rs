//! Per-frame view of the game for renderers
//!
//! Owned and serializable so a JS renderer can take it as JSON and a native
//! one can read it directly.

use serde::Serialize;

use crate::settings::Settings;
use crate::sim::{
    ActiveUpgrade, Callout, FloatingText, GamePhase, GameState, Helper, Particle, Pickup, Player,
    Plow, RandomSource, SnowGrid, Snowman, WeatherKind,
};

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    pub combo: u32,
    pub best_combo: u32,
    pub rank: &'static str,
    pub lives: u8,
    /// 1-based difficulty label
    pub wave: u32,
    pub elapsed_ms: f64,

    pub grid: SnowGrid,
    pub player: Player,
    pub plow: Plow,
    pub upgrade: Option<ActiveUpgrade>,
    pub pickup: Option<Pickup>,
    pub helpers: Vec<Helper>,
    pub snowmen: Vec<Snowman>,

    pub weather: WeatherKind,
    pub weather_label: &'static str,
    /// Sky darkening, 0 is clear
    pub weather_tint: f32,

    pub floating_text: Vec<FloatingText>,
    pub callouts: Vec<Callout>,
    pub particles: Vec<Particle>,
    /// Screen shake amplitude in pixels, 0 when shake is turned off
    pub shake: f32,
    /// Hit flash alpha, 0 when flashes are turned off
    pub flash: f32,
    /// Initials entry is open on the game-over screen
    pub awaiting_initials: bool,
    /// Leaderboard place the finished run will take
    pub entry_rank: Option<usize>,
}

impl Snapshot {
    pub fn capture<R: RandomSource>(
        state: &GameState<R>,
        high_score: u64,
        settings: &Settings,
    ) -> Self {
        Self {
            phase: state.phase,
            score: state.score,
            high_score: high_score.max(state.score),
            combo: state.combo,
            best_combo: state.best_combo,
            rank: state.rank(),
            lives: state.lives,
            wave: state.wave(),
            elapsed_ms: state.elapsed_ms,
            grid: state.grid.clone(),
            player: state.player.clone(),
            plow: state.plow.clone(),
            upgrade: state.upgrades.active,
            pickup: state.upgrades.pickup,
            helpers: state.upgrades.helpers.clone(),
            snowmen: state.snowmen.list.clone(),
            weather: state.weather.kind,
            weather_label: state.weather.kind.label(),
            weather_tint: state.weather.kind.tint(),
            floating_text: state.fx.floating_text.clone(),
            callouts: state.fx.callouts.clone(),
            particles: state.fx.particles.clone(),
            shake: if settings.effective_screen_shake() {
                state.fx.shake
            } else {
                0.0
            },
            flash: if settings.effective_flash() {
                state.fx.flash
            } else {
                0.0
            },
            awaiting_initials: false,
            entry_rank: None,
        }
    }

    /// Open initials entry for a run headed to `rank`
    pub fn with_initials_prompt(mut self, rank: Option<usize>) -> Self {
        self.awaiting_initials = rank.is_some();
        self.entry_rank = rank;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_reads_session() {
        let mut state = GameState::new(8);
        state.start_run();
        state.score = 4200;
        state.combo = 40;
        let snap = Snapshot::capture(&state, 1000, &Settings::default());
        assert_eq!(snap.phase, GamePhase::Running);
        assert_eq!(snap.high_score, 4200);
        assert_eq!(snap.rank, "ICY HOT STREAK");
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.wave, 1);
        assert_eq!(snap.weather_label, "CLEAR SKIES");
    }

    #[test]
    fn test_reduced_motion_hides_shake_and_flash() {
        let mut state = GameState::new(8);
        state.fx.shake = 12.0;
        state.fx.flash = 0.4;

        let snap = Snapshot::capture(&state, 0, &Settings::default());
        assert_eq!((snap.shake, snap.flash), (12.0, 0.4));

        let calm = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let snap = Snapshot::capture(&state, 0, &calm);
        assert_eq!((snap.shake, snap.flash), (0.0, 0.0));
    }

    #[test]
    fn test_serializes_to_json() {
        let state = GameState::new(1);
        let json = Snapshot::capture(&state, 125_000, &Settings::default())
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["high_score"], 125_000);
        assert_eq!(value["phase"], "Title");
        assert_eq!(value["rank"], "WARMING UP");
    }

    #[test]
    fn test_initials_prompt_carries_rank() {
        let state = GameState::new(2);
        let snap = Snapshot::capture(&state, 0, &Settings::default());
        assert!(!snap.awaiting_initials);
        assert_eq!(snap.entry_rank, None);

        let snap = snap.with_initials_prompt(Some(4));
        assert!(snap.awaiting_initials);
        let value: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(value["entry_rank"], 4);
    }
}
