//! Per-frame simulation tick
//!
//! Fixed order every tick: opponent decision, rope integration, victory
//! check. The host supplies elapsed milliseconds and the human pull flag.

use super::rope::PullInput;
use super::state::{MatchState, TickInput, Winner};

/// Advance the match by `dt` milliseconds.
///
/// Returns the winner on the tick a round is decided, `None` otherwise.
/// After a round is over the rope keeps simulating (the human may still
/// pull) but the opponent stays idle and no further wins are reported
/// until [`MatchState::reset`].
///
/// A negative or non-finite `dt` (a bad host frame delta) counts as 0.
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) -> Option<Winner> {
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
    state.round_ticks += 1;

    let opponent_pulling = if state.record.game_over {
        state.opponent.release();
        false
    } else {
        state.opponent.update(dt, &state.rope)
    };

    let pulls = PullInput {
        blue: input.human_pulling,
        red: opponent_pulling,
    };
    state.rope.integrate(dt, pulls, input.grips);

    if state.record.game_over {
        return None;
    }

    let winner = check_victory(state.rope.midpoint_offset(), state.settings.victory_threshold)?;
    state.record.award(winner);
    log::info!(
        "{} after {} ticks ({})",
        winner.banner(),
        state.round_ticks,
        state.record
    );
    Some(winner)
}

/// Decide a round from the midpoint's offset from center.
///
/// The rope pulled toward blue (top, negative offset) past the threshold is
/// a blue win; toward red (bottom, positive offset) a red win.
pub fn check_victory(midpoint_offset: f32, threshold: f32) -> Option<Winner> {
    if midpoint_offset < -threshold {
        Some(Winner::Blue)
    } else if midpoint_offset > threshold {
        Some(Winner::Red)
    } else {
        None
    }
}
