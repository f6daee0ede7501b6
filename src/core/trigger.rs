/// Trigger resolver — matches authored chapter conditions against the live
/// game state. Pure and side-effect-free.
use crate::schema::chapter::{Chapter, ChapterSet, TriggerCondition};
use crate::schema::state::GameState;

/// Returns the first not-yet-completed chapter, in authored priority
/// order, whose trigger condition holds. `None` means no chapter is ready
/// today and the caller falls through to the ad-hoc daily path.
pub fn resolve_active_chapter<'a>(
    chapters: &'a ChapterSet,
    state: &GameState,
) -> Option<&'a Chapter> {
    chapters.chapters.iter().find(|chapter| {
        !state.completed_chapters.contains(&chapter.id) && trigger_holds(&chapter.trigger, state)
    })
}

/// Evaluates a trigger condition: every present clause must hold.
pub fn trigger_holds(trigger: &TriggerCondition, state: &GameState) -> bool {
    if let Some(day) = trigger.day {
        if state.day != day {
            return false;
        }
    }
    if let Some((min, max)) = trigger.day_range {
        if state.day < min || state.day > max {
            return false;
        }
    }
    if let Some(min) = trigger.min_reputation {
        if state.reputation < min {
            return false;
        }
    }
    if let Some(min) = trigger.min_money {
        if state.money < min {
            return false;
        }
    }
    if let Some((key, expected)) = &trigger.flag {
        if !state.flags.matches(key, expected) {
            return false;
        }
    }
    true
}
