//! Per-round inactivity decay.
//!
//! Unlike the wall-clock/calendar decay this is adapted from, decay here is
//! driven entirely by round counters: a player absent from consecutive
//! rounds accrues uncertainty, capped at their starting σ.

use crate::domain::{PlayerId, RatingState};
use std::collections::HashSet;

pub struct DecayParams {
    pub inactivity_threshold_rounds: u32,
    pub inactivity_sigma_inflation_per_round: f64,
    pub inactivity_sigma_cap: f64,
}

/// Applies decay to every tracked player ahead of a round: participants
/// reset their inactivity counter, everyone else's counter increments and,
/// once past the threshold, has σ inflated for this round.
pub fn apply_round_decay<'a>(
    states: impl Iterator<Item = &'a mut RatingState>,
    participants: &HashSet<PlayerId>,
    params: &DecayParams,
) {
    for state in states {
        if participants.contains(&state.player_id) {
            state.inactivity_counter = 0;
            continue;
        }

        state.inactivity_counter += 1;
        if state.inactivity_counter >= params.inactivity_threshold_rounds {
            state.rating.sigma = (state.rating.sigma + params.inactivity_sigma_inflation_per_round)
                .min(params.inactivity_sigma_cap);
        }
    }
}
