/// Focus/heat tracker — at most one currently-favored character, with an
/// intensity value that rises on attention and decays when it wanders.
use crate::schema::character::CharacterId;
use crate::schema::state::FocusState;

pub const HEAT_MAX: u8 = 100;
/// Heat gained per positive interaction with the focus character.
pub const HEAT_STEP: u8 = 10;
/// Heat lost when attention goes to someone else.
pub const HEAT_DECAY: u8 = 8;
/// Below this, a rival interaction steals the focus outright.
pub const REASSIGN_BELOW: u8 = 5;
/// Heat a newly assigned focus character starts at.
pub const STARTING_HEAT: u8 = 40;

/// Records a positive-affection interaction with `character` and updates
/// the focus accordingly.
///
/// Same character: heat rises by a fixed step, capped. Different character:
/// the focus reassigns when current heat is already low, otherwise it
/// merely decays. Heat hitting zero clears the focus entirely.
pub fn record_interaction(focus: &mut FocusState, character: CharacterId) {
    match focus.character {
        Some(current) if current == character => {
            focus.heat = focus.heat.saturating_add(HEAT_STEP).min(HEAT_MAX);
        }
        Some(_) => {
            if focus.heat < REASSIGN_BELOW {
                focus.character = Some(character);
                focus.heat = STARTING_HEAT;
            } else {
                focus.heat = focus.heat.saturating_sub(HEAT_DECAY);
                if focus.heat == 0 {
                    focus.character = None;
                }
            }
        }
        None => {
            focus.character = Some(character);
            focus.heat = STARTING_HEAT;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_interaction_assigns_focus() {
        let mut focus = FocusState::default();
        record_interaction(&mut focus, CharacterId(1));
        assert_eq!(focus.character, Some(CharacterId(1)));
        assert_eq!(focus.heat, STARTING_HEAT);
    }

    #[test]
    fn repeated_attention_heats_up_to_cap() {
        let mut focus = FocusState::default();
        for _ in 0..20 {
            record_interaction(&mut focus, CharacterId(1));
        }
        assert_eq!(focus.character, Some(CharacterId(1)));
        assert_eq!(focus.heat, HEAT_MAX);
    }

    #[test]
    fn rival_steals_focus_when_heat_is_low() {
        let mut focus = FocusState {
            character: Some(CharacterId(1)),
            heat: REASSIGN_BELOW - 1,
        };
        record_interaction(&mut focus, CharacterId(2));
        assert_eq!(focus.character, Some(CharacterId(2)));
        assert_eq!(focus.heat, STARTING_HEAT);
    }

    #[test]
    fn rival_only_decays_a_hot_focus() {
        let mut focus = FocusState {
            character: Some(CharacterId(1)),
            heat: 80,
        };
        record_interaction(&mut focus, CharacterId(2));
        assert_eq!(focus.character, Some(CharacterId(1)));
        assert_eq!(focus.heat, 80 - HEAT_DECAY);
    }

    #[test]
    fn heat_reaching_zero_clears_focus() {
        let mut focus = FocusState {
            character: Some(CharacterId(1)),
            heat: STARTING_HEAT,
        };
        // 40 decays in steps of 8 and bottoms out at exactly zero.
        for _ in 0..5 {
            record_interaction(&mut focus, CharacterId(2));
        }
        assert_eq!(focus.heat, 0);
        assert_eq!(focus.character, None);
    }

    #[test]
    fn at_most_one_focus_at_a_time() {
        let mut focus = FocusState::default();
        record_interaction(&mut focus, CharacterId(1));
        record_interaction(&mut focus, CharacterId(2));
        record_interaction(&mut focus, CharacterId(3));
        // Whatever happened, exactly one (or zero) character holds focus.
        assert_eq!(focus.character, Some(CharacterId(1)));
    }
}
