/// Scenario graph executor — walks a chapter's event nodes, applies effect
/// bundles, and tracks completion.
use thiserror::Error;

use crate::core::focus;
use crate::core::progression;
use crate::schema::chapter::{Chapter, Effect, NodeKind, Successor};
use crate::schema::state::{ChapterProgress, GameState};

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("event `{0}` is a choice node and requires a choice index")]
    ChoiceRequired(String),
    #[error("event `{event}` has no choice at index {index}")]
    InvalidChoice { event: String, index: usize },
}

/// Result of advancing one step through a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The chapter continues at this event.
    Next(String),
    /// The selected choice was refused for lack of funds; nothing changed.
    Refused,
    /// The chapter reached a terminal node and is now complete.
    Finished,
}

/// Marks the chapter's entry node active and returns its id, or completes
/// the chapter outright if it has no events.
pub fn begin_chapter(state: &mut GameState, chapter: &Chapter) -> Option<String> {
    match chapter.entry() {
        Some(entry) => {
            state.active_chapter = Some(ChapterProgress {
                chapter: chapter.id.clone(),
                current: entry.id.clone(),
            });
            Some(entry.id.clone())
        }
        None => {
            finish(state, chapter);
            None
        }
    }
}

/// Advances past the node `current_id`, applying its effect bundle (or the
/// selected choice's) and resolving the successor.
///
/// Dangling ids — an unknown `current_id` or a `Goto` to nowhere — soft-
/// terminate the chapter rather than erroring, so malformed authored
/// content can never wedge a playthrough. A missing or out-of-range choice
/// index, by contrast, is a caller bug and comes back as an error.
pub fn advance(
    state: &mut GameState,
    chapter: &Chapter,
    current_id: &str,
    choice: Option<usize>,
) -> Result<Advance, ExecutorError> {
    let Some(index) = chapter.event_index(current_id) else {
        return Ok(finish(state, chapter));
    };
    let node = &chapter.events[index];

    let (effects, successor) = match node.kind {
        NodeKind::Choice => {
            let picked = choice.ok_or_else(|| ExecutorError::ChoiceRequired(node.id.clone()))?;
            let option = node.choices.get(picked).ok_or(ExecutorError::InvalidChoice {
                event: node.id.clone(),
                index: picked,
            })?;
            if let Some(cost) = option.cost {
                if state.money < cost {
                    return Ok(Advance::Refused);
                }
                state.money -= cost;
            }
            (&option.effects, &option.next)
        }
        _ => (&node.effects, &node.next),
    };

    apply_effects(state, effects);

    let outcome = match successor {
        Successor::Goto(target) => match chapter.event(target) {
            Some(_) => Advance::Next(target.clone()),
            None => finish(state, chapter),
        },
        Successor::End => finish(state, chapter),
        Successor::Continue => match chapter.events.get(index + 1) {
            Some(next) => Advance::Next(next.id.clone()),
            None => finish(state, chapter),
        },
    };

    if let Advance::Next(next_id) = &outcome {
        state.active_chapter = Some(ChapterProgress {
            chapter: chapter.id.clone(),
            current: next_id.clone(),
        });
    }
    Ok(outcome)
}

/// Applies an effect bundle in fixed kind order: money, reputation, glamor,
/// affection, flags. Flag writes therefore always observe post-update
/// affection and glamor values.
pub fn apply_effects(state: &mut GameState, effects: &[Effect]) {
    for effect in effects {
        if let Effect::Money(amount) = effect {
            state.money += amount;
        }
    }
    for effect in effects {
        if let Effect::Reputation(amount) = effect {
            state.reputation += amount;
        }
    }
    for effect in effects {
        if let Effect::Glamor(amount) = effect {
            let change = progression::apply_glamor_points(&mut state.prestige, *amount);
            progression::note_level_change(&mut state.flags, change);
        }
    }
    for effect in effects {
        if let Effect::Affection { character, amount } = effect {
            state.add_affection(*character, *amount);
            if *amount > 0 {
                focus::record_interaction(&mut state.focus, *character);
            }
        }
    }
    for effect in effects {
        if let Effect::Flag { key, value } = effect {
            state.flags.set(key.clone(), value.clone());
        }
    }
}

/// Completion is idempotent: re-finishing an already completed chapter is
/// a no-op, and ephemeral scenes never enter the completed list.
fn finish(state: &mut GameState, chapter: &Chapter) -> Advance {
    if !chapter.ephemeral {
        state.completed_chapters.insert(chapter.id.clone());
    }
    state.active_chapter = None;
    Advance::Finished
}
