use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::character::CharacterId;

/// A dynamic value that can be stored in the flag store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FlagValue {
    /// Truthiness used by narrative gates: only `Bool(true)` counts.
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }
}

/// Named narrative markers and one-shot signals.
///
/// Append-and-overwrite semantics: most narrative flags, once set, stay set
/// for the life of the playthrough. The store is cleared only on New Game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagStore {
    values: FxHashMap<String, FlagValue>,
}

impl FlagStore {
    pub fn set(&mut self, key: impl Into<String>, value: FlagValue) {
        self.values.insert(key.into(), value);
    }

    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set(key, FlagValue::Bool(value));
    }

    pub fn get(&self, key: &str) -> Option<&FlagValue> {
        self.values.get(key)
    }

    /// Returns true if the flag exists and is `Bool(true)`.
    pub fn is_set(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(FlagValue::is_true)
    }

    /// Exact key/value match, as used by chapter trigger clauses.
    pub fn matches(&self, key: &str, expected: &FlagValue) -> bool {
        self.values.get(key) == Some(expected)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Per-character relationship progress.
///
/// Affection only ever moves through choice effects or daily-event
/// resolution; it never decays on its own. The discrete affection level is
/// always derived from `affection`, never stored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub affection: u32,
    /// Day the character last appeared in a daily scene. 0 = never
    /// (playthrough days count from 1).
    pub last_appeared_day: u32,
    pub introduced: bool,
}

/// The single currently-favored character and how strongly favored they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FocusState {
    pub character: Option<CharacterId>,
    /// Intensity in 0..=100. Reaching 0 clears the focus.
    pub heat: u8,
}

/// Player-wide standing ("glamor") plus the streak inputs to stability.
///
/// `last_level` is not the authoritative level — that is always recomputed
/// from `points`. It exists so level-change detection fires exactly once per
/// crossing even when a single update jumps several thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrestigeState {
    pub points: u32,
    pub last_level: u8,
    /// Smoothed 0..=100 health indicator derived from streaks and reputation.
    pub stability: u8,
    pub profit_streak: u32,
    pub loss_streak: u32,
}

/// The once-per-day delta bundle produced by the out-of-scope walk-in
/// simulation. Exactly one report arrives per completed business day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub profit: i64,
    pub reputation_delta: i32,
    #[serde(default)]
    pub visitors: Vec<CharacterId>,
}

/// Position inside the chapter currently in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterProgress {
    pub chapter: String,
    pub current: String,
}

/// The full mutable state of one playthrough.
///
/// The engine holds no hidden globals: the caller owns this value and
/// threads it through every call. Serializes verbatim for the persistence
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current business day, counting from 1.
    pub day: u32,
    pub money: i64,
    pub debt: i64,
    pub reputation: i32,
    pub relationships: FxHashMap<CharacterId, RelationshipRecord>,
    pub focus: FocusState,
    pub prestige: PrestigeState,
    pub flags: FlagStore,
    pub completed_chapters: FxHashSet<String>,
    /// At most one chapter is in progress at a time.
    pub active_chapter: Option<ChapterProgress>,
}

impl GameState {
    pub fn new_game(starting_money: i64, starting_debt: i64) -> Self {
        Self {
            day: 1,
            money: starting_money,
            debt: starting_debt,
            reputation: 0,
            relationships: FxHashMap::default(),
            focus: FocusState::default(),
            prestige: PrestigeState {
                stability: 50,
                ..PrestigeState::default()
            },
            flags: FlagStore::default(),
            completed_chapters: FxHashSet::default(),
            active_chapter: None,
        }
    }

    /// Snapshot of a character's relationship record (default if untracked).
    pub fn relationship(&self, id: CharacterId) -> RelationshipRecord {
        self.relationships.get(&id).cloned().unwrap_or_default()
    }

    pub fn relationship_mut(&mut self, id: CharacterId) -> &mut RelationshipRecord {
        self.relationships.entry(id).or_default()
    }

    /// Applies an affection delta, clamping at zero on the way down.
    pub fn add_affection(&mut self, id: CharacterId, amount: i32) {
        let rel = self.relationship_mut(id);
        rel.affection = rel.affection.saturating_add_signed(amount);
    }

    /// Introduced characters in ascending id order, for deterministic
    /// iteration under a seeded RNG.
    pub fn introduced_characters(&self) -> Vec<CharacterId> {
        let mut ids: Vec<CharacterId> = self
            .relationships
            .iter()
            .filter(|(_, rel)| rel.introduced)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_store_overwrite() {
        let mut flags = FlagStore::default();
        flags.set_bool("met_shion", true);
        assert!(flags.is_set("met_shion"));

        flags.set("met_shion", FlagValue::Int(3));
        assert!(!flags.is_set("met_shion"));
        assert_eq!(flags.get("met_shion"), Some(&FlagValue::Int(3)));
    }

    #[test]
    fn flag_store_matches_exact_value() {
        let mut flags = FlagStore::default();
        flags.set("route", FlagValue::Text("shion".to_string()));
        assert!(flags.matches("route", &FlagValue::Text("shion".to_string())));
        assert!(!flags.matches("route", &FlagValue::Text("akari".to_string())));
        assert!(!flags.matches("missing", &FlagValue::Bool(true)));
    }

    #[test]
    fn flag_store_clear_on_new_game() {
        let mut flags = FlagStore::default();
        flags.set_bool("prologue_done", true);
        flags.clear();
        assert!(flags.is_empty());
    }

    #[test]
    fn affection_clamps_at_zero() {
        let mut state = GameState::new_game(1000, 0);
        state.add_affection(CharacterId(1), 30);
        state.add_affection(CharacterId(1), -100);
        assert_eq!(state.relationship(CharacterId(1)).affection, 0);
    }

    #[test]
    fn introduced_characters_sorted_and_filtered() {
        let mut state = GameState::new_game(1000, 0);
        state.relationship_mut(CharacterId(3)).introduced = true;
        state.relationship_mut(CharacterId(1)).introduced = true;
        state.relationship_mut(CharacterId(2)).introduced = false;
        assert_eq!(
            state.introduced_characters(),
            vec![CharacterId(1), CharacterId(3)]
        );
    }

    #[test]
    fn state_round_trips_through_ron() {
        let mut state = GameState::new_game(3000, 200_000);
        state.relationship_mut(CharacterId(1)).affection = 120;
        state.flags.set_bool("prologue_done", true);
        state.completed_chapters.insert("prologue".to_string());

        let serialized = ron::to_string(&state).unwrap();
        let restored: GameState = ron::from_str(&serialized).unwrap();
        assert_eq!(restored, state);
    }
}
