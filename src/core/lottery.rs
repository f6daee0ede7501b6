/// Character selection lottery — weighted draw for the day's ad-hoc scene.
use rand::Rng;

use crate::schema::character::CharacterId;
use crate::schema::state::GameState;

/// Weight every candidate starts from.
pub const BASE_WEIGHT: i32 = 10;
/// Affection points per extra weight point.
pub const AFFINITY_DIVISOR: u32 = 50;
/// Penalty for having appeared on the immediately preceding day.
pub const RECENCY_PENALTY: i32 = 6;
/// How many top-affection characters seed the pool.
const TOP_CANDIDATES: usize = 3;

/// Picks the character for today's ad-hoc daily event, or `None` when no
/// one has been introduced yet.
///
/// Pool: the top-3 introduced characters by affection, the focus character,
/// and one uniformly random introduced character, deduplicated. The focus
/// character is exempt from the recency penalty, so consecutive-day
/// appearances stay possible for them. Production callers pass a real RNG;
/// tests pass a seeded one and get identical draws.
pub fn select_daily_character<R: Rng + ?Sized>(
    state: &GameState,
    rng: &mut R,
) -> Option<CharacterId> {
    let introduced = state.introduced_characters();
    if introduced.is_empty() {
        return None;
    }

    // Rank by affection, ties broken by id for a stable order.
    let mut ranked = introduced.clone();
    ranked.sort_by_key(|id| {
        (
            std::cmp::Reverse(state.relationship(*id).affection),
            *id,
        )
    });

    let mut pool: Vec<CharacterId> = Vec::new();
    let mut push_unique = |pool: &mut Vec<CharacterId>, id: CharacterId| {
        if !pool.contains(&id) {
            pool.push(id);
        }
    };

    for id in ranked.iter().take(TOP_CANDIDATES) {
        push_unique(&mut pool, *id);
    }
    if let Some(focus) = state.focus.character {
        // Only ever introduced characters; a stale focus from authored
        // content must not leak an uncharted face into the pool.
        if introduced.contains(&focus) {
            push_unique(&mut pool, focus);
        }
    }
    let wildcard = introduced[rng.gen_range(0..introduced.len())];
    push_unique(&mut pool, wildcard);

    let weights: Vec<u32> = pool.iter().map(|id| weight_for(state, *id)).collect();
    roulette(&pool, &weights, rng)
}

/// Weight for one candidate: base + focus bonus + affinity bonus −
/// recency penalty, floored at one.
fn weight_for(state: &GameState, id: CharacterId) -> u32 {
    let rel = state.relationship(id);
    let is_focus = state.focus.character == Some(id);

    let mut weight = BASE_WEIGHT;
    if is_focus {
        weight += i32::from(state.focus.heat) / 2;
    }
    weight += (rel.affection / AFFINITY_DIVISOR) as i32;
    let appeared_yesterday = state.day > 1 && rel.last_appeared_day + 1 == state.day;
    if appeared_yesterday && !is_focus {
        weight -= RECENCY_PENALTY;
    }
    weight.max(1) as u32
}

/// Cumulative-weight roulette using a single draw.
fn roulette<R: Rng + ?Sized>(
    pool: &[CharacterId],
    weights: &[u32],
    rng: &mut R,
) -> Option<CharacterId> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for (id, weight) in pool.iter().zip(weights) {
        if roll < *weight {
            return Some(*id);
        }
        roll -= weight;
    }
    None
}
