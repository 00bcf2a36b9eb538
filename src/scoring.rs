//! Scoring and difficulty curves
//!
//! Pure functions of the run clock. There are no discrete levels; pressure
//! ramps continuously with elapsed time.

/// Combo multiplier stops growing here
pub const COMBO_CAP: u32 = 250;

/// Plow waiting interval at the start of a run (ms)
pub const PLOW_INTERVAL_MAX_MS: u32 = 7000;
/// Shortest plow waiting interval (ms)
pub const PLOW_INTERVAL_MIN_MS: u32 = 2600;
/// Time until the plow interval bottoms out (ms)
pub const PLOW_RAMP_MS: f64 = 110_000.0;

/// Inputs for scoring one successful clear
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClearScore {
    /// Total snow removed by the action
    pub snow_depth: f32,
    /// Combo count including this clear
    pub combo: u32,
    /// Player was in the street danger band while the plow threatened
    pub near_plow: bool,
    /// Street-side rows are piled high
    pub frenzy: bool,
}

/// Points awarded for one successful clear
pub fn calculate_shovel_points(clear: ClearScore) -> u64 {
    let depth_score = f64::from(clear.snow_depth.max(1.0)) * 100.0;
    let combo_bonus = 1.0 + f64::from(clear.combo.min(COMBO_CAP)) * 0.12;
    let risk_bonus = if clear.near_plow { 2.2 } else { 1.0 };
    let frenzy_bonus = if clear.frenzy { 1.5 } else { 1.0 };
    (depth_score * combo_bonus * risk_bonus * frenzy_bonus).round() as u64
}

/// Rank label for a combo count
pub fn combo_rank(combo: u32) -> &'static str {
    match combo {
        180.. => "BLIZZARD GOD",
        120.. => "PLATINUM PLOW PANIC",
        70.. => "STORM SURGE",
        35.. => "ICY HOT STREAK",
        15.. => "COMBO COASTING",
        _ => "WARMING UP",
    }
}

/// How long the plow waits before its next warning
pub fn plow_interval_ms(elapsed_ms: f64) -> u32 {
    let eased = (elapsed_ms.max(0.0) / PLOW_RAMP_MS).min(1.0);
    let span = f64::from(PLOW_INTERVAL_MAX_MS - PLOW_INTERVAL_MIN_MS);
    (f64::from(PLOW_INTERVAL_MAX_MS) - span * eased).round() as u32
}

/// Random snow deposits per second before the weather multiplier
pub fn snowfall_rate(elapsed_ms: f64) -> f32 {
    0.35 + (elapsed_ms.max(0.0) / 50_000.0).min(1.6) as f32
}

/// Plow burst strength, stepping up every 30 seconds
pub fn plow_snow_burst(elapsed_ms: f64) -> u32 {
    2 + (elapsed_ms.max(0.0) / 30_000.0).min(5.0).floor() as u32
}
