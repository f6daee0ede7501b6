/// Daily event dispatch — decides what, if anything, happens today when no
/// authored chapter triggers: game-over checks, route-lock offers, periodic
/// world events, introductions, and the lottery-driven visit scene.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::ending::INSOLVENT_FLAG;
use crate::core::lottery;
use crate::core::progression::affection_level;
use crate::schema::chapter::{Chapter, ChoiceOption, Effect, EventNode, NodeKind, Successor};
use crate::schema::character::{CharacterId, CharacterRegistry};
use crate::schema::state::GameState;

/// Heat at or above which a visit from the focus character may carry a
/// bonus reward.
pub const BONUS_HEAT: u8 = 70;
/// One-in-N chance of that bonus.
const BONUS_ODDS: u32 = 3;
/// A world event fires every this many days.
pub const WORLD_EVENT_PERIOD: u32 = 7;
/// Affection level at which a route-lock decision is offered.
pub const ROUTE_LOCK_LEVEL: u8 = 4;

pub const ROUTE_LOCKED_FLAG: &str = "route_locked";

/// Why the playthrough ended mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverKind {
    /// Money ran out with the debt still outstanding.
    Bankrupt,
    /// Stability collapsed to zero.
    Collapsed,
}

/// What the engine hands the presentation layer for one day. Scene-bearing
/// variants carry an ephemeral chapter the caller walks with the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DailyEvent {
    GameOver { kind: GameOverKind },
    RouteLock { character: CharacterId },
    World { scene: Chapter },
    Introduction { character: CharacterId, scene: Chapter },
    Visit { character: CharacterId, scene: Chapter },
}

/// Resolves today's ad-hoc content, first match wins. `None` means a quiet
/// day. Callers resolve any triggered authored chapter first; this is the
/// fall-through path.
pub fn daily_event<R: Rng + ?Sized>(
    state: &mut GameState,
    cast: &CharacterRegistry,
    rng: &mut R,
    forced: Option<CharacterId>,
) -> Option<DailyEvent> {
    // 1. Game over.
    if state.money < 0 && state.debt > 0 {
        state.flags.set_bool(INSOLVENT_FLAG, true);
        return Some(DailyEvent::GameOver {
            kind: GameOverKind::Bankrupt,
        });
    }
    if state.prestige.stability == 0 {
        return Some(DailyEvent::GameOver {
            kind: GameOverKind::Collapsed,
        });
    }

    // 2. Route-lock offer, once per character.
    if !state.flags.is_set(ROUTE_LOCKED_FLAG) {
        for id in state.introduced_characters() {
            let offered_flag = format!("route_lock_offered_{}", id.0);
            if affection_level(state.relationship(id).affection) >= ROUTE_LOCK_LEVEL
                && !state.flags.is_set(&offered_flag)
            {
                state.flags.set_bool(offered_flag, true);
                return Some(DailyEvent::RouteLock { character: id });
            }
        }
    }

    // 3. Periodic world event.
    if state.day % WORLD_EVENT_PERIOD == 0 {
        let seen_flag = format!("world_event_day_{}", state.day);
        if !state.flags.is_set(&seen_flag) {
            state.flags.set_bool(seen_flag, true);
            return Some(DailyEvent::World {
                scene: world_scene(state.day),
            });
        }
    }

    // 4. Introduce the next cast member on even days.
    if state.day % 2 == 0 {
        if let Some(id) = cast
            .ids()
            .find(|id| !state.relationship(*id).introduced)
        {
            state.relationship_mut(id).introduced = true;
            let scene = introduction_scene(cast, id);
            return Some(DailyEvent::Introduction {
                character: id,
                scene,
            });
        }
    }

    // 5. Ad-hoc visit for the lottery pick (or a forced, introduced guest).
    let character = match forced {
        Some(id) if state.relationship(id).introduced => Some(id),
        _ => lottery::select_daily_character(state, rng),
    }?;

    let bonus = state.focus.character == Some(character)
        && state.focus.heat >= BONUS_HEAT
        && rng.gen_range(0..BONUS_ODDS) == 0;
    let scene = visit_scene(cast, character, state.day, bonus);
    state.relationship_mut(character).last_appeared_day = state.day;

    Some(DailyEvent::Visit { character, scene })
}

fn narration(id: &str, text: &str, next: Successor) -> EventNode {
    EventNode {
        id: id.to_string(),
        kind: NodeKind::Narration,
        speaker: None,
        text: Some(text.to_string()),
        choices: Vec::new(),
        effects: Vec::new(),
        next,
    }
}

fn world_scene(day: u32) -> Chapter {
    Chapter {
        id: format!("world_day_{day}"),
        title: "Around the Neighborhood".to_string(),
        description: String::new(),
        trigger: Default::default(),
        events: vec![
            narration(
                "w1",
                "A market fair takes over the street outside. Foot traffic doubles by noon.",
                Successor::Continue,
            ),
            EventNode {
                id: "w2".to_string(),
                kind: NodeKind::Effect,
                speaker: None,
                text: None,
                choices: Vec::new(),
                effects: vec![Effect::Reputation(2), Effect::Money(400)],
                next: Successor::End,
            },
        ],
        ephemeral: true,
    }
}

fn introduction_scene(cast: &CharacterRegistry, id: CharacterId) -> Chapter {
    let name = cast
        .get(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("Guest #{}", id.0));
    Chapter {
        id: format!("intro_{}", id.0),
        title: format!("A New Face: {name}"),
        description: String::new(),
        trigger: Default::default(),
        events: vec![
            narration(
                "i1",
                "The bell over the door rings for someone you haven't seen before.",
                Successor::Continue,
            ),
            EventNode {
                id: "i2".to_string(),
                kind: NodeKind::Dialogue,
                speaker: Some(id),
                text: Some(format!("\"I'm {name}. I hear the coffee here is worth the detour.\"")),
                choices: Vec::new(),
                effects: vec![Effect::Affection {
                    character: id,
                    amount: 5,
                }],
                next: Successor::End,
            },
        ],
        ephemeral: true,
    }
}

/// A 3-node visit: greeting, a choice with inline deltas, a close.
fn visit_scene(cast: &CharacterRegistry, id: CharacterId, day: u32, bonus: bool) -> Chapter {
    let profile = cast.get(id);
    let name = profile
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("Guest #{}", id.0));
    let favorite = profile
        .and_then(|p| p.favorite_categories.first().cloned())
        .unwrap_or_else(|| "house blend".to_string());

    let mut treat_effects = vec![
        Effect::Affection {
            character: id,
            amount: 15,
        },
        Effect::Reputation(1),
    ];
    if bonus {
        // A hot streak with the focus character occasionally pays off.
        treat_effects.push(Effect::Money(500));
    }

    Chapter {
        id: format!("visit_{}_{day}", id.0),
        title: format!("{name} Drops By"),
        description: String::new(),
        trigger: Default::default(),
        events: vec![
            EventNode {
                id: "v1".to_string(),
                kind: NodeKind::Dialogue,
                speaker: Some(id),
                text: Some(format!("\"The usual seat free? It smells like {favorite} today.\"")),
                choices: Vec::new(),
                effects: Vec::new(),
                next: Successor::Continue,
            },
            EventNode {
                id: "v2".to_string(),
                kind: NodeKind::Choice,
                speaker: None,
                text: Some("How do you treat them?".to_string()),
                choices: vec![
                    ChoiceOption {
                        label: format!("Serve their favorite {favorite}"),
                        next: Successor::Goto("v3".to_string()),
                        cost: None,
                        effects: treat_effects,
                    },
                    ChoiceOption {
                        label: "Talk shop while they sip".to_string(),
                        next: Successor::Goto("v3".to_string()),
                        cost: None,
                        effects: vec![Effect::Glamor(6), Effect::Affection {
                            character: id,
                            amount: 4,
                        }],
                    },
                    ChoiceOption {
                        label: "Comp the table something special".to_string(),
                        next: Successor::Goto("v3".to_string()),
                        cost: Some(300),
                        effects: vec![
                            Effect::Affection {
                                character: id,
                                amount: 25,
                            },
                            Effect::Reputation(2),
                        ],
                    },
                ],
                effects: Vec::new(),
                next: Successor::Continue,
            },
            narration(
                "v3",
                "The afternoon light stretches across the counter before they wave goodbye.",
                Successor::End,
            ),
        ],
        ephemeral: true,
    }
}
