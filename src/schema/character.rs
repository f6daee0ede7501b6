/// Cast registry — static per-character tables loaded once at startup.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CastError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("duplicate character id {0:?}")]
    DuplicateId(CharacterId),
}

/// Newtype wrapper for character IDs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CharacterId(pub u32);

/// Read-only authored data for one cast member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub id: CharacterId,
    pub name: String,
    /// Menu categories this character favors, used by authored content.
    #[serde(default)]
    pub favorite_categories: Vec<String>,
    /// Minimum glamor level required for this character's marriage ending.
    pub marriage_glamor: u8,
    /// Closeness rank labels indexed by affection level (0..=5).
    #[serde(default)]
    pub rank_labels: Vec<String>,
    /// Marks the character whose route anchors the true ending.
    #[serde(default)]
    pub true_end_anchor: bool,
}

/// All cast profiles, keyed by id. Treated as immutable after loading;
/// the order characters were registered in is their introduction order.
#[derive(Debug, Clone, Default)]
pub struct CharacterRegistry {
    profiles: FxHashMap<CharacterId, CharacterProfile>,
    order: Vec<CharacterId>,
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in cast of the cafe.
    pub fn default_cast() -> Self {
        let mut registry = Self::new();
        for profile in default_profiles() {
            registry.register(profile);
        }
        registry
    }

    /// Load a cast registry from a RON file (a sequence of profiles).
    pub fn load_from_ron(path: &Path) -> Result<Self, CastError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a cast registry from a RON string.
    pub fn parse_ron(input: &str) -> Result<Self, CastError> {
        let profiles: Vec<CharacterProfile> = ron::from_str(input)?;
        let mut registry = Self::new();
        for profile in profiles {
            if registry.profiles.contains_key(&profile.id) {
                return Err(CastError::DuplicateId(profile.id));
            }
            registry.register(profile);
        }
        Ok(registry)
    }

    pub fn register(&mut self, profile: CharacterProfile) {
        if !self.profiles.contains_key(&profile.id) {
            self.order.push(profile.id);
        }
        self.profiles.insert(profile.id, profile);
    }

    pub fn get(&self, id: CharacterId) -> Option<&CharacterProfile> {
        self.profiles.get(&id)
    }

    /// Character ids in introduction order.
    pub fn ids(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.order.iter().copied()
    }

    /// Profiles in introduction order.
    pub fn profiles(&self) -> impl Iterator<Item = &CharacterProfile> + '_ {
        self.order.iter().map(|id| &self.profiles[id])
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The character anchoring the true ending, if the cast defines one.
    pub fn true_end_anchor(&self) -> Option<CharacterId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.profiles[id].true_end_anchor)
    }

    /// Rank label for a character at an affection level, if authored.
    pub fn rank_label(&self, id: CharacterId, level: u8) -> Option<&str> {
        self.profiles
            .get(&id)
            .and_then(|p| p.rank_labels.get(level as usize))
            .map(String::as_str)
    }
}

fn default_profiles() -> Vec<CharacterProfile> {
    fn labels(labels: [&str; 6]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    vec![
        CharacterProfile {
            id: CharacterId(1),
            name: "Shion".to_string(),
            favorite_categories: vec!["tea".to_string(), "wagashi".to_string()],
            marriage_glamor: 5,
            rank_labels: labels([
                "Stranger",
                "Quiet Regular",
                "Confidant",
                "Kindred Spirit",
                "Inseparable",
                "Soulmate",
            ]),
            true_end_anchor: true,
        },
        CharacterProfile {
            id: CharacterId(2),
            name: "Akari".to_string(),
            favorite_categories: vec!["pastry".to_string(), "cocoa".to_string()],
            marriage_glamor: 2,
            rank_labels: labels([
                "Stranger",
                "Chatty Regular",
                "Friend",
                "Close Friend",
                "Best Friend",
                "Sweetheart",
            ]),
            true_end_anchor: false,
        },
        CharacterProfile {
            id: CharacterId(3),
            name: "Rin".to_string(),
            favorite_categories: vec!["espresso".to_string()],
            marriage_glamor: 3,
            rank_labels: labels([
                "Stranger",
                "Critic",
                "Reluctant Regular",
                "Ally",
                "Partner",
                "Devoted",
            ]),
            true_end_anchor: false,
        },
        CharacterProfile {
            id: CharacterId(4),
            name: "Tsumugi".to_string(),
            favorite_categories: vec!["sandwich".to_string(), "soup".to_string()],
            marriage_glamor: 2,
            rank_labels: labels([
                "Stranger",
                "Lunch Regular",
                "Friend",
                "Confidant",
                "Dear Friend",
                "Beloved",
            ]),
            true_end_anchor: false,
        },
        CharacterProfile {
            id: CharacterId(5),
            name: "Kaede".to_string(),
            favorite_categories: vec!["seasonal".to_string()],
            marriage_glamor: 4,
            rank_labels: labels([
                "Stranger",
                "Mystery Guest",
                "Acquaintance",
                "Trusted",
                "Cherished",
                "Promised",
            ]),
            true_end_anchor: false,
        },
    ]
}
