//! Shovel and blower clearing
//!
//! Both actions scrape snow off the grid, land hits on nearby snowmen and
//! feed whatever they removed into the combo and score.

use glam::Vec2;

use super::event::GameEvent;
use super::fx::ParticleKind;
use super::rng::RandomSource;
use super::state::GameState;
use super::upgrade::UpgradeKind;
use crate::consts::*;
use crate::scoring::{ClearScore, calculate_shovel_points};

/// Cells at or below this depth are not worth a shovel swing
const SHOVEL_MIN_DEPTH: f32 = 0.1;
const SHOVEL_BITE: f32 = 1.25;
const SCOOP_BOOST: f32 = 1.95;
/// Offset from the player's feet to the blade
const SHOVEL_REACH: f32 = 20.0;
const SHOVEL_LIFT: f32 = 16.0;

const BLOWER_MIN_DEPTH: f32 = 0.08;
const BLOWER_BITE: f32 = 1.5;
const BLOWER_POWER: f32 = 1.2;

/// Seconds until the next action, by (success, failure)
fn cooldowns(upgrade: Option<UpgradeKind>) -> (f32, f32) {
    match upgrade {
        Some(UpgradeKind::Blower) => (0.03, 0.07),
        Some(UpgradeKind::Scoop) => (0.045, 0.09),
        _ => (0.09, 0.14),
    }
}

/// Run the player's clearing action and reset its cooldown.
///
/// Returns true when any snow came off the driveway.
pub fn act<R: RandomSource>(state: &mut GameState<R>) -> bool {
    let upgrade = state.upgrades.active_kind();
    let cleared = if upgrade == Some(UpgradeKind::Blower) {
        blow(state)
    } else {
        shovel(state)
    };
    let (hit, miss) = cooldowns(upgrade);
    state.player.shovel_cooldown = if cleared { hit } else { miss };
    cleared
}

/// Scrape the cell under the player and the one in front
pub fn shovel<R: RandomSource>(state: &mut GameState<R>) -> bool {
    let player = state.player.pos;
    let targets = [
        player - Vec2::new(0.0, SHOVEL_LIFT),
        player + state.player.facing * SHOVEL_REACH,
    ];
    let bite = if state.upgrades.is_active(UpgradeKind::Scoop) {
        SHOVEL_BITE * SCOOP_BOOST
    } else {
        SHOVEL_BITE
    };

    let mut removed = 0.0;
    for target in targets {
        let Some(cell) = state.grid.world_to_cell(target) else {
            continue;
        };
        let center = state.grid.cell_center(cell);
        hit_snowmen(state, center, 1.0);

        if state.grid.depth(cell) <= SHOVEL_MIN_DEPTH {
            continue;
        }
        removed += state.grid.remove_at(cell, bite);
        state.fx.burst(
            &mut state.rng,
            center,
            2,
            ParticleKind::Snow,
            (-45.0, 45.0),
            (-110.0, -40.0),
            (0.35, 0.6),
        );
    }

    removed > 0.0 && score_clear(state, removed)
}

/// Sweep a three-wide cone ahead of the player
pub fn blow<R: RandomSource>(state: &mut GameState<R>) -> bool {
    let player = state.player.pos;
    let facing = state.player.facing;

    let mut removed = 0.0;
    for i in 1..=3 {
        let target = player + facing * (18.0 + 15.0 * i as f32);
        hit_snowmen(state, target, BLOWER_POWER);
        let Some(cell) = state.grid.world_to_cell(target) else {
            continue;
        };
        for spread in -1..=1 {
            let cell = state
                .grid
                .clamp_cell(cell.col as isize + spread, cell.row as isize);
            if state.grid.depth(cell) <= BLOWER_MIN_DEPTH {
                continue;
            }
            removed += state.grid.remove_at(cell, BLOWER_BITE);
        }
    }

    if removed <= 0.0 {
        return false;
    }
    state.fx.burst(
        &mut state.rng,
        player + facing * 40.0,
        6,
        ParticleKind::Snow,
        (-80.0, 80.0),
        (-140.0, -20.0),
        (0.3, 0.55),
    );
    score_clear(state, removed)
}

fn hit_snowmen<R: RandomSource>(state: &mut GameState<R>, at: Vec2, power: f32) {
    if let Some(bonus) = state
        .snowmen
        .damage_at(at, power, state.combo, &mut state.events)
    {
        state.score += bonus;
    }
}

/// Credit a successful clear to the combo and score
pub fn score_clear<R: RandomSource>(state: &mut GameState<R>, removed: f32) -> bool {
    state.combo += 1;
    state.best_combo = state.best_combo.max(state.combo);
    state.combo_clock = COMBO_WINDOW;

    let near_plow = state.near_plow();
    let frenzy = state.grid.is_frenzy();
    let points = calculate_shovel_points(ClearScore {
        snow_depth: removed,
        combo: state.combo,
        near_plow,
        frenzy,
    });
    state.score += points;

    state.events.push(GameEvent::SnowCleared {
        removed,
        points,
        combo: state.combo,
        near_plow,
        frenzy,
        at: state.player.pos,
    });
    if state.combo % COMBO_MILESTONE == 0 {
        let rank = state.rank();
        log::debug!("Combo milestone {} ({})", state.combo, rank);
        state.events.push(GameEvent::ComboMilestone {
            combo: state.combo,
            rank,
        });
    }
    true
}
