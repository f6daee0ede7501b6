/// The top-level story engine — owns the loaded content, the seeded RNG,
/// and the entry points the surrounding application drives each day.
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use thiserror::Error;

use crate::core::daily::{self, DailyEvent};
use crate::core::ending::{self, EndingResult};
use crate::core::executor::{self, Advance, ExecutorError};
use crate::core::progression;
use crate::core::trigger;
use crate::schema::chapter::{Chapter, ChapterSet, ContentError};
use crate::schema::character::{CastError, CharacterId, CharacterRegistry};
use crate::schema::state::{DayReport, GameState};

/// Opening balance for a fresh playthrough.
pub const STARTING_MONEY: i64 = 3_000;
/// The loan that built the cafe.
pub const STARTING_DEBT: i64 = 200_000;
/// Affection trickle per walk-in visit from an introduced character.
const VISITOR_AFFECTION: i32 = 1;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    #[error("cast error: {0}")]
    Cast(#[from] CastError),
    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),
    #[error("no chapter with id `{0}` is loaded")]
    UnknownChapter(String),
    #[error("no chapter is currently in progress")]
    NothingActive,
}

/// What the engine surfaces for the player next: either the current
/// position in an authored chapter, or an ad-hoc daily payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NextContent<'a> {
    Chapter { chapter: &'a Chapter, current: String },
    Daily(DailyEvent),
}

/// The narrative progression engine. Built via `StoryEngine::builder()`.
///
/// Holds only static content and the RNG; all playthrough state lives in
/// the `GameState` the caller owns and threads through every call.
pub struct StoryEngine {
    chapters: ChapterSet,
    cast: CharacterRegistry,
    rng: StdRng,
}

/// Builder for constructing a `StoryEngine`.
pub struct StoryEngineBuilder {
    chapters_path: Option<String>,
    cast_path: Option<String>,
    seed: u64,
    /// Directly provided chapters (for testing without files).
    chapters: Option<ChapterSet>,
    /// Directly provided cast (for testing without files).
    cast: Option<CharacterRegistry>,
}

impl StoryEngine {
    pub fn builder() -> StoryEngineBuilder {
        StoryEngineBuilder {
            chapters_path: None,
            cast_path: None,
            seed: 0,
            chapters: None,
            cast: None,
        }
    }

    /// A fresh playthrough. Resets everything including the flag store.
    pub fn new_game(&self) -> GameState {
        GameState::new_game(STARTING_MONEY, STARTING_DEBT)
    }

    pub fn cast(&self) -> &CharacterRegistry {
        &self.cast
    }

    pub fn chapters(&self) -> &ChapterSet {
        &self.chapters
    }

    /// Folds one completed business day into the state: the day counter,
    /// money, reputation, streaks/stability, and a small affection trickle
    /// for introduced walk-ins. Must be called exactly once per day report,
    /// after the previous day's narrative consequences are fully processed.
    pub fn apply_day_report(&self, state: &mut GameState, report: &DayReport) {
        state.day += 1;
        state.money += report.profit;
        state.reputation += report.reputation_delta;
        progression::record_day_result(
            &mut state.prestige,
            &mut state.flags,
            report.profit,
            state.reputation,
        );
        for visitor in &report.visitors {
            if state.relationship(*visitor).introduced {
                state.add_affection(*visitor, VISITOR_AFFECTION);
            }
        }
    }

    /// Decides what narrative content surfaces next: the in-progress
    /// chapter if one is active, else the highest-priority triggered
    /// chapter, else the ad-hoc daily path. `None` is a quiet day.
    pub fn next_content(
        &mut self,
        state: &mut GameState,
        forced_visitor: Option<CharacterId>,
    ) -> Option<NextContent<'_>> {
        if let Some(progress) = state.active_chapter.clone() {
            match self.chapters.get(&progress.chapter) {
                Some(chapter) => {
                    return Some(NextContent::Chapter {
                        chapter,
                        current: progress.current,
                    });
                }
                // Content pack changed under a loaded save; drop the
                // orphaned progress and carry on.
                None => state.active_chapter = None,
            }
        }

        if let Some(chapter) = trigger::resolve_active_chapter(&self.chapters, state) {
            // Borrow dance: begin_chapter needs &mut state only.
            let id = chapter.id.clone();
            let chapter = self.chapters.get(&id)?;
            if let Some(entry) = executor::begin_chapter(state, chapter) {
                return Some(NextContent::Chapter {
                    chapter,
                    current: entry,
                });
            }
            return None;
        }

        daily::daily_event(state, &self.cast, &mut self.rng, forced_visitor)
            .map(NextContent::Daily)
    }

    /// Advances the in-progress authored chapter one step.
    pub fn advance_active(
        &self,
        state: &mut GameState,
        choice: Option<usize>,
    ) -> Result<Advance, EngineError> {
        let progress = state.active_chapter.clone().ok_or(EngineError::NothingActive)?;
        let chapter = self
            .chapters
            .get(&progress.chapter)
            .ok_or_else(|| EngineError::UnknownChapter(progress.chapter.clone()))?;
        Ok(executor::advance(state, chapter, &progress.current, choice)?)
    }

    /// Advances an ephemeral scene (visit, introduction, world event).
    pub fn advance_scene(
        &self,
        state: &mut GameState,
        scene: &Chapter,
        current: &str,
        choice: Option<usize>,
    ) -> Result<Advance, EngineError> {
        Ok(executor::advance(state, scene, current, choice)?)
    }

    /// Classifies the playthrough's final state into exactly one ending.
    pub fn resolve_ending(&self, state: &GameState) -> EndingResult {
        ending::resolve_ending(state, &self.cast)
    }
}

impl StoryEngineBuilder {
    pub fn chapters_path(mut self, path: &str) -> Self {
        self.chapters_path = Some(path.to_string());
        self
    }

    pub fn cast_path(mut self, path: &str) -> Self {
        self.cast_path = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide chapters directly (for testing without files).
    pub fn with_chapters(mut self, chapters: ChapterSet) -> Self {
        self.chapters = Some(chapters);
        self
    }

    /// Provide a cast directly (for testing without files).
    pub fn with_cast(mut self, cast: CharacterRegistry) -> Self {
        self.cast = Some(cast);
        self
    }

    pub fn build(self) -> Result<StoryEngine, EngineError> {
        let mut chapters = self.chapters.unwrap_or_default();
        if let Some(ref path) = self.chapters_path {
            let loaded = ChapterSet::load_from_ron(Path::new(path))?;
            chapters.merge(loaded);
        }

        let cast = match (self.cast, self.cast_path) {
            (None, None) => CharacterRegistry::default_cast(),
            (provided, path) => {
                let mut cast = provided.unwrap_or_default();
                if let Some(path) = path {
                    let loaded = CharacterRegistry::load_from_ron(Path::new(&path))?;
                    for profile in loaded.profiles() {
                        cast.register(profile.clone());
                    }
                }
                cast
            }
        };

        Ok(StoryEngine {
            chapters,
            cast,
            rng: StdRng::seed_from_u64(self.seed),
        })
    }
}
