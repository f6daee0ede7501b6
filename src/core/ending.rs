/// Ending resolution — classifies the final state of a playthrough into
/// exactly one outcome via a strict priority chain.
use serde::{Deserialize, Serialize};

use crate::core::progression::{affection_level, glamor_level, AFFECTION_MAX, MAX_GLAMOR_LEVEL};
use crate::schema::character::{CharacterId, CharacterRegistry};
use crate::schema::state::GameState;

/// Money above this counts as a top-tier business.
pub const BUSINESS_TOP: i64 = 500_000;
/// Money above this still earns the business-success ending.
pub const BUSINESS_SECOND: i64 = 300_000;

pub const INSOLVENT_FLAG: &str = "insolvent";
pub const ROUTE_COMPLETE_FLAG: &str = "route_complete";
pub const SEAL_RESTORED_FLAG: &str = "seal_restored";

const SCORE_PARTNER_AFFECTION_MULT: i64 = 2;
const SCORE_PARTNER_RANK_BONUS: i64 = 250;
const SCORE_GLAMOR_LEVEL: i64 = 500;
const SCORE_REPUTATION: i64 = 10;
const SCORE_CHAPTER: i64 = 300;

/// The fixed set of mutually exclusive playthrough outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndingCategory {
    Bankrupt,
    True,
    Marriage,
    Unrequited,
    BusinessSuccess,
    Normal,
}

/// A computed ending. Never persisted as authoritative state — always
/// recomputable from the rest of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndingResult {
    pub category: EndingCategory,
    pub text: String,
    pub partner: Option<CharacterId>,
    pub score: i64,
}

/// Classifies `state` into exactly one ending. Deterministic, total, and
/// side-effect-free: the first matching rule wins and later rules are
/// never consulted.
pub fn resolve_ending(state: &GameState, cast: &CharacterRegistry) -> EndingResult {
    // 1. Bad end: insolvency.
    if state.flags.is_set(INSOLVENT_FLAG) || (state.money < 0 && state.debt > 0) {
        return result(
            state,
            EndingCategory::Bankrupt,
            None,
            "The shutters come down for the last time. The cafe's debts have outgrown its dreams.".to_string(),
        );
    }

    let level = glamor_level(state.prestige.points);

    // 2. True end: the anchor route, fully realized.
    if let Some(anchor) = cast.true_end_anchor() {
        let anchored = state.relationship(anchor).affection >= AFFECTION_MAX
            && state.flags.is_set(ROUTE_COMPLETE_FLAG)
            && state.flags.is_set(SEAL_RESTORED_FLAG)
            && state.money > BUSINESS_TOP
            && level == MAX_GLAMOR_LEVEL;
        if anchored {
            let name = partner_name(cast, anchor);
            return result(
                state,
                EndingCategory::True,
                Some(anchor),
                format!(
                    "Under the restored seal, the cafe glows brighter than ever. {} takes your hand: this is where the story was always headed.",
                    name
                ),
            );
        }
    }

    // Max-affection characters, highest affection first, id as tiebreak.
    let mut maxed: Vec<(CharacterId, u32)> = state
        .relationships
        .iter()
        .filter(|(_, rel)| rel.affection >= AFFECTION_MAX)
        .map(|(id, rel)| (*id, rel.affection))
        .collect();
    maxed.sort_by_key(|(id, affection)| (std::cmp::Reverse(*affection), *id));

    // 3. Marriage end: prestige requirement met.
    if let Some((partner, _)) = maxed
        .iter()
        .find(|(id, _)| meets_marriage_requirement(cast, *id, level))
    {
        let name = partner_name(cast, *partner);
        let rank = rank_for(state, cast, *partner);
        return result(
            state,
            EndingCategory::Marriage,
            Some(*partner),
            format!(
                "{} says yes over the last slice of the day. The regulars toast their {}.",
                name, rank
            ),
        );
    }

    // 4. Unrequited end: affection without the standing to match.
    if let Some((partner, _)) = maxed.first() {
        let name = partner_name(cast, *partner);
        return result(
            state,
            EndingCategory::Unrequited,
            Some(*partner),
            format!(
                "{} lingers at the door a moment too long before leaving. Some stories end one season early.",
                name
            ),
        );
    }

    // 5. Business-success end, independent of any relationship.
    if state.money > BUSINESS_TOP {
        return result(
            state,
            EndingCategory::BusinessSuccess,
            None,
            "Lines around the block, write-ups in every guide. The cafe is an institution now.".to_string(),
        );
    }
    if state.money > BUSINESS_SECOND {
        return result(
            state,
            EndingCategory::BusinessSuccess,
            None,
            "The books are solidly in the black and the regulars keep coming. A modest success, honestly earned.".to_string(),
        );
    }

    // 6. Default fallback.
    result(
        state,
        EndingCategory::Normal,
        None,
        "Another quiet close. The cafe endures, and tomorrow the sign flips to OPEN again.".to_string(),
    )
}

fn meets_marriage_requirement(cast: &CharacterRegistry, id: CharacterId, level: u8) -> bool {
    cast.get(id).is_some_and(|p| level >= p.marriage_glamor)
}

fn partner_name(cast: &CharacterRegistry, id: CharacterId) -> String {
    cast.get(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("Guest #{}", id.0))
}

fn rank_for(state: &GameState, cast: &CharacterRegistry, id: CharacterId) -> String {
    let level = affection_level(state.relationship(id).affection);
    cast.rank_label(id, level)
        .unwrap_or("companion")
        .to_string()
}

fn result(
    state: &GameState,
    category: EndingCategory,
    partner: Option<CharacterId>,
    text: String,
) -> EndingResult {
    EndingResult {
        category,
        text,
        partner,
        score: score(state, partner),
    }
}

/// Weighted sum over the final state, plus a partner bonus when the ending
/// names one.
fn score(state: &GameState, partner: Option<CharacterId>) -> i64 {
    let level = glamor_level(state.prestige.points) as i64;
    let total_affection: i64 = state
        .relationships
        .values()
        .map(|rel| rel.affection as i64)
        .sum();

    let mut score = state.money / 100
        + state.reputation as i64 * SCORE_REPUTATION
        + state.prestige.points as i64 / 10
        + level * SCORE_GLAMOR_LEVEL
        + total_affection
        + state.completed_chapters.len() as i64 * SCORE_CHAPTER;

    if let Some(id) = partner {
        let affection = state.relationship(id).affection as i64;
        let rank_index = affection_level(state.relationship(id).affection) as i64;
        score += affection * SCORE_PARTNER_AFFECTION_MULT + rank_index * SCORE_PARTNER_RANK_BONUS;
    }
    score
}
