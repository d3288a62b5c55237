//! Day/night background cycle driven purely by score

use serde::{Deserialize, Serialize};

use super::spawn::next_decoration_distance;
use super::state::RunState;
use crate::consts::SCORE_PER_CYCLE_PHASE;

/// Background phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundPhase {
    /// Clouds drift by
    Day,
    /// Stars twinkle
    Night,
}

impl BackgroundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundPhase::Day => "day",
            BackgroundPhase::Night => "night",
        }
    }
}

/// Index of the score interval the run is in
pub fn phase_index(score: f64) -> u64 {
    (score / SCORE_PER_CYCLE_PHASE).floor().max(0.0) as u64
}

/// Even intervals are day, odd are night
pub fn phase_for_score(score: f64) -> BackgroundPhase {
    if phase_index(score) % 2 == 0 {
        BackgroundPhase::Day
    } else {
        BackgroundPhase::Night
    }
}

/// Switch phase if the score crossed a boundary.
///
/// On a switch, the outgoing phase's decorations are dropped and the
/// incoming phase's spawn countdown is re-drawn. Returns the new phase.
pub fn update_phase(state: &mut RunState) -> Option<BackgroundPhase> {
    let target = phase_for_score(state.score);
    if target == state.phase {
        return None;
    }

    state.phase = target;
    state.decorations.clear();
    state.next_decoration_dist = next_decoration_distance(state.rng_mut(), target);
    log::info!(
        "Cycling background to: {} at score {}",
        target.as_str(),
        state.final_score()
    );
    Some(target)
}
