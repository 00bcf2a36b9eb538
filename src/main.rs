//! Snow Shovel Arcade headless runner
//!
//! Lets the autopilot play one run natively and logs how it went. The
//! browser build is driven from `platform::web` instead.
//!
//! Environment:
//! - `SSA_SEED`: RNG seed (default: current time)
//! - `SSA_SAVE_DIR`: directory for records (default: keep in memory)
//! - `SSA_SECONDS`: longest simulated run (default: 600)
//! - `SSA_QUALITY`: low, medium or high (default: stored setting)
//! - `RUST_LOG`: log filter (default: info)

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), snow_shovel_arcade::persistence::StoreError> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use snow_shovel_arcade::{Game, QualityPreset};
    use snow_shovel_arcade::consts::SIM_DT;
    use snow_shovel_arcade::persistence::{FileStore, MemoryStore, ScoreStore, StoreError};
    use snow_shovel_arcade::platform::{Autopilot, FrameRecorder, LogAudio};
    use snow_shovel_arcade::sim::GamePhase;

    const DEFAULT_SECONDS: f64 = 600.0;

    fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
        let raw = std::env::var(name).ok()?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("Ignoring {}={:?}", name, raw);
                None
            }
        }
    }

    fn open_store() -> Result<Box<dyn ScoreStore>, StoreError> {
        match std::env::var("SSA_SAVE_DIR") {
            Ok(dir) => {
                let store = FileStore::open(dir)?;
                log::info!("Records in {}", store.dir().display());
                Ok(Box::new(store))
            }
            Err(_) => Ok(Box::new(MemoryStore::new())),
        }
    }

    pub fn run() -> Result<(), StoreError> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .init();

        let seed = env_number("SSA_SEED").unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_millis() as u64)
        });
        let limit: f64 = env_number("SSA_SECONDS").unwrap_or(DEFAULT_SECONDS);
        log::info!("Snow Shovel Arcade (headless) seed {}", seed);

        let mut game = Game::new(seed, open_store()?, Box::new(LogAudio::default()));
        if let Ok(name) = std::env::var("SSA_QUALITY") {
            match QualityPreset::from_name(&name) {
                Some(preset) => game.set_quality(preset),
                None => log::warn!("Ignoring SSA_QUALITY={:?}", name),
            }
        }

        let mut pilot = Autopilot::new();
        let mut frames = FrameRecorder::default();

        game.start_run();
        let frame_dt = f64::from(SIM_DT);
        let mut now = 0.0;
        while now <= limit && game.phase() != GamePhase::GameOver {
            game.frame(now, &mut pilot, &mut frames);
            now += frame_dt;
        }

        let state = game.state();
        log::info!(
            "Final score {} (best combo {}, {}), wave {}, {:.1}s, {} frames",
            state.score,
            state.best_combo,
            state.rank(),
            state.wave(),
            state.elapsed_ms / 1000.0,
            frames.frames
        );
        if game.awaiting_initials() {
            let rank = game.submit_initials("CPU");
            log::info!("Leaderboard rank {:?}", rank);
        }
        for (i, entry) in game.leaderboard().entries().iter().enumerate() {
            log::info!("{}. {} {}", i + 1, entry.initials, entry.score);
        }
        Ok(())
    }
}
