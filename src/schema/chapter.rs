/// Authored chapter schema — trigger conditions, event graphs, effects,
/// and RON loading.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::character::CharacterId;
use super::state::FlagValue;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("duplicate event id `{0}` in chapter `{1}`")]
    DuplicateEvent(String, String),
    #[error("chapter `{0}` has no events")]
    EmptyChapter(String),
}

/// What a single event node presents to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Narration,
    Dialogue,
    Choice,
    Effect,
}

/// Where control flows after a node (or choice) resolves.
///
/// The authoring format historically carried two different "no explicit
/// successor" meanings; this enum keeps both but makes them distinct,
/// exhaustively matched variants. `Continue` is the serde default, so
/// authored nodes may simply omit the field to fall through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Successor {
    /// Jump to the named event.
    Goto(String),
    /// Terminate the chapter.
    End,
    /// Fall through to the next node in authoring order.
    #[default]
    Continue,
}

/// One effect inside a bundle. Bundles apply in a fixed kind order
/// (money, reputation, glamor, affection, flags) regardless of how the
/// author listed them, so flag-based edge detection always observes
/// post-update affection and glamor values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Money(i64),
    Reputation(i32),
    Glamor(i32),
    Affection { character: CharacterId, amount: i32 },
    Flag { key: String, value: FlagValue },
}

/// A selectable option on a `Choice` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    #[serde(default)]
    pub next: Successor,
    /// Upfront money cost. The executor refuses the choice, leaving all
    /// state untouched, when funds fall short.
    #[serde(default)]
    pub cost: Option<i64>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// One step of narrative content inside a chapter or ad-hoc scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventNode {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub speaker: Option<CharacterId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChoiceOption>,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub next: Successor,
}

/// Activation condition for a chapter. All present clauses are ANDed;
/// absent clauses are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    /// Exact day match.
    #[serde(default)]
    pub day: Option<u32>,
    /// Inclusive day bounds.
    #[serde(default)]
    pub day_range: Option<(u32, u32)>,
    /// Minimum reputation.
    #[serde(default)]
    pub min_reputation: Option<i32>,
    /// Minimum money on hand.
    #[serde(default)]
    pub min_money: Option<i64>,
    /// Exact flag key/value match.
    #[serde(default)]
    pub flag: Option<(String, FlagValue)>,
}

/// An immutable authored story chapter. Completion state lives in
/// `GameState`, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger: TriggerCondition,
    pub events: Vec<EventNode>,
    /// Generated throwaway scenes (daily visits, introductions) set this so
    /// finishing them never lands in the completed-chapter list.
    #[serde(default)]
    pub ephemeral: bool,
}

impl Chapter {
    /// The entry node: first event in authoring order.
    pub fn entry(&self) -> Option<&EventNode> {
        self.events.first()
    }

    pub fn event(&self, id: &str) -> Option<&EventNode> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn event_index(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }
}

/// The loaded chapter library. Vec order is the authored priority order:
/// prologue and tutorial chapters first, then per-character romance
/// chapters, then world-event chapters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterSet {
    pub chapters: Vec<Chapter>,
}

impl ChapterSet {
    /// Load a chapter set from a RON file (a sequence of chapters).
    pub fn load_from_ron(path: &Path) -> Result<ChapterSet, ContentError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a chapter set from a RON string.
    pub fn parse_ron(input: &str) -> Result<ChapterSet, ContentError> {
        let chapters: Vec<Chapter> = ron::from_str(input)?;
        for chapter in &chapters {
            validate_chapter(chapter)?;
        }
        Ok(ChapterSet { chapters })
    }

    /// Merge another chapter set into this one. Chapters from `other` with
    /// a known id replace in place (keeping priority position); new ids
    /// append at the end.
    pub fn merge(&mut self, other: ChapterSet) {
        for chapter in other.chapters {
            match self.chapters.iter_mut().find(|c| c.id == chapter.id) {
                Some(existing) => *existing = chapter,
                None => self.chapters.push(chapter),
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

fn validate_chapter(chapter: &Chapter) -> Result<(), ContentError> {
    if chapter.events.is_empty() {
        return Err(ContentError::EmptyChapter(chapter.id.clone()));
    }
    let mut seen = std::collections::HashSet::new();
    for event in &chapter.events {
        if !seen.insert(event.id.as_str()) {
            return Err(ContentError::DuplicateEvent(
                event.id.clone(),
                chapter.id.clone(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"[
        (
            id: "prologue",
            title: "Opening Day",
            trigger: (day: Some(1)),
            events: [
                (id: "p1", kind: Narration, text: Some("The sign flips to OPEN.")),
                (id: "p2", kind: Effect, effects: [Reputation(2)], next: End),
            ],
        ),
    ]"#;

    #[test]
    fn parse_minimal_chapter() {
        let set = ChapterSet::parse_ron(MINIMAL).unwrap();
        assert_eq!(set.len(), 1);
        let prologue = set.get("prologue").unwrap();
        assert_eq!(prologue.trigger.day, Some(1));
        assert_eq!(prologue.entry().unwrap().id, "p1");
        // Omitted successor defaults to fall-through.
        assert_eq!(prologue.events[0].next, Successor::Continue);
        assert_eq!(prologue.events[1].next, Successor::End);
    }

    #[test]
    fn parse_choice_options() {
        let input = r#"[
            (
                id: "c",
                title: "Choices",
                events: [
                    (
                        id: "ask",
                        kind: Choice,
                        text: Some("What do you serve?"),
                        choices: [
                            (label: "Tea", next: Goto("tea"), effects: [
                                Affection(character: (1), amount: 5),
                            ]),
                            (label: "Remodel", cost: Some(2000), next: End),
                        ],
                    ),
                    (id: "tea", kind: Dialogue, speaker: Some((1)), text: Some("Good choice."), next: End),
                ],
            ),
        ]"#;
        let set = ChapterSet::parse_ron(input).unwrap();
        let node = set.get("c").unwrap().event("ask").unwrap();
        assert_eq!(node.choices.len(), 2);
        assert_eq!(node.choices[0].next, Successor::Goto("tea".to_string()));
        assert_eq!(node.choices[1].cost, Some(2000));
        assert!(matches!(
            node.choices[0].effects[0],
            Effect::Affection {
                character: CharacterId(1),
                amount: 5
            }
        ));
    }

    #[test]
    fn duplicate_event_id_rejected() {
        let input = r#"[
            (
                id: "dup",
                title: "Dup",
                events: [
                    (id: "a", kind: Narration),
                    (id: "a", kind: Narration, next: End),
                ],
            ),
        ]"#;
        assert!(matches!(
            ChapterSet::parse_ron(input),
            Err(ContentError::DuplicateEvent(_, _))
        ));
    }

    #[test]
    fn empty_chapter_rejected() {
        let input = r#"[(id: "empty", title: "Empty", events: [])]"#;
        assert!(matches!(
            ChapterSet::parse_ron(input),
            Err(ContentError::EmptyChapter(_))
        ));
    }

    #[test]
    fn merge_replaces_in_place_and_appends() {
        let mut base = ChapterSet::parse_ron(MINIMAL).unwrap();
        let patch = ChapterSet::parse_ron(
            r#"[
            (
                id: "prologue",
                title: "Opening Day, Revised",
                events: [(id: "p1", kind: Narration, next: End)],
            ),
            (
                id: "extra",
                title: "Extra",
                events: [(id: "e1", kind: Narration, next: End)],
            ),
        ]"#,
        )
        .unwrap();

        base.merge(patch);
        assert_eq!(base.len(), 2);
        assert_eq!(base.chapters[0].id, "prologue");
        assert_eq!(base.chapters[0].title, "Opening Day, Revised");
        assert_eq!(base.chapters[1].id, "extra");
    }

    #[test]
    fn chapter_round_trips_through_ron() {
        let set = ChapterSet::parse_ron(MINIMAL).unwrap();
        let serialized = ron::to_string(&set).unwrap();
        let restored: ChapterSet = ron::from_str(&serialized).unwrap();
        assert_eq!(restored, set);
    }
}
