/// Progression calculators — affection leveling, glamor point-to-level
/// mapping with edge-triggered change detection, and cafe stability.
use crate::schema::state::{FlagStore, PrestigeState};

/// Ascending affection thresholds; crossing the nth maps to level n+1.
pub const AFFECTION_THRESHOLDS: [u32; 5] = [50, 150, 280, 370, 450];

/// Ascending glamor thresholds for levels 1..=6.
pub const GLAMOR_THRESHOLDS: [u32; 6] = [60, 140, 240, 400, 600, 840];

pub const MAX_AFFECTION_LEVEL: u8 = 5;
pub const MAX_GLAMOR_LEVEL: u8 = 6;

/// Affection at or beyond this counts as "max" for endings and route locks.
pub const AFFECTION_MAX: u32 = AFFECTION_THRESHOLDS[4];

/// Below this stability, the cafe counts as unstable.
pub const STABILITY_WARNING: u8 = 50;

pub const STABILITY_WARNING_FLAG: &str = "cafe_unstable";
pub const GLAMOR_LEVEL_DOWN_FLAG: &str = "glamor_level_down";

/// Maps an affection value to its discrete level. Pure, total, monotonic.
pub fn affection_level(affection: u32) -> u8 {
    AFFECTION_THRESHOLDS
        .iter()
        .take_while(|&&t| affection >= t)
        .count() as u8
}

/// Maps accumulated glamor points to a level. Pure, total, monotonic.
pub fn glamor_level(points: u32) -> u8 {
    GLAMOR_THRESHOLDS
        .iter()
        .take_while(|&&t| points >= t)
        .count() as u8
}

/// Outcome of a glamor point change, for one-shot notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelChange {
    None,
    Up(u8),
    Down(u8),
}

/// Applies a glamor point delta (clamped at zero) and reports whether the
/// derived level crossed a threshold since the last observation.
///
/// Points can jump several thresholds in one update, so the comparison is
/// against the stored last-observed level, never a re-derivation from the
/// previous point value. Exactly one signal fires per call.
pub fn apply_glamor_points(prestige: &mut PrestigeState, delta: i32) -> LevelChange {
    prestige.points = prestige.points.saturating_add_signed(delta);
    let level = glamor_level(prestige.points);
    let change = if level > prestige.last_level {
        LevelChange::Up(level)
    } else if level < prestige.last_level {
        LevelChange::Down(level)
    } else {
        LevelChange::None
    };
    prestige.last_level = level;
    change
}

/// Writes the one-shot flags for a glamor level change.
pub fn note_level_change(flags: &mut FlagStore, change: LevelChange) {
    match change {
        LevelChange::None => {}
        LevelChange::Up(level) => flags.set_bool(format!("glamor_level_up_{level}"), true),
        LevelChange::Down(_) => flags.set_bool(GLAMOR_LEVEL_DOWN_FLAG, true),
    }
}

/// The 0..=100 stability score: profit streaks push it up (capped), loss
/// streaks pull it down (capped), reputation contributes a bounded term.
pub fn stability_score(profit_streak: u32, loss_streak: u32, reputation: i32) -> u8 {
    let profit_term = 5 * profit_streak.min(6) as i32;
    let loss_term = 8 * loss_streak.min(5) as i32;
    let reputation_term = (reputation / 10).clamp(-20, 20);
    (50 + profit_term - loss_term + reputation_term).clamp(0, 100) as u8
}

/// Folds one day's profit into the streak counters and recomputes
/// stability. Sets or clears the unstable warning flag.
pub fn record_day_result(
    prestige: &mut PrestigeState,
    flags: &mut FlagStore,
    profit: i64,
    reputation: i32,
) {
    if profit > 0 {
        prestige.profit_streak += 1;
        prestige.loss_streak = 0;
    } else if profit < 0 {
        prestige.loss_streak += 1;
        prestige.profit_streak = 0;
    } else {
        prestige.profit_streak = 0;
        prestige.loss_streak = 0;
    }
    prestige.stability = stability_score(prestige.profit_streak, prestige.loss_streak, reputation);
    flags.set_bool(STABILITY_WARNING_FLAG, prestige.stability < STABILITY_WARNING);
}
