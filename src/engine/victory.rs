//! End-of-match evaluation.
//!
//! MalOsos wins the moment civic stability bottoms out. Otherwise the
//! match runs to its turn limit and BuenOsos takes it by holding the line:
//! stability above 30 with either a clean infrastructure record or at
//! least two recovered services. The attacker takes the tiebreak.

use crate::core::{GameState, Seat};

/// Stability must end above this for a defender win.
const DEFENDER_STABILITY_BAR: i32 = 30;
/// Recoveries required when services did go down.
const DEFENDER_RECOVERY_BAR: usize = 2;

/// Immediate win check, run whenever stability can have changed.
///
/// Returns the winner if the match is decided mid-turn.
#[must_use]
pub fn immediate_winner(state: &GameState) -> Option<Seat> {
    if state.markers.stability == 0 {
        Some(Seat::Malosos)
    } else {
        None
    }
}

/// Final decision at the turn limit.
#[must_use]
pub fn final_winner(state: &GameState) -> Seat {
    let held_the_line = state.markers.stability > DEFENDER_STABILITY_BAR;
    let clean_record = state.services_went_down.is_empty();
    let recovered = state.services_recovered.len() >= DEFENDER_RECOVERY_BAR;

    if held_the_line && (clean_record || recovered) {
        Seat::Buenosos
    } else {
        Seat::Malosos
    }
}
