use tracing::debug;

use crate::grid::DistanceField;
use crate::scorer::{ScoredCandidate, TargetKind};
use crate::types::{Move, Position};

/// Picks the target to commit to this tick, or None when nothing qualifies.
///
/// The candidate list arrives already ranked by the scorer's total order
/// (score, then path cost, then position), so selection is the first entry
/// whose kind can actually be walked to and collected. The match is
/// exhaustive on purpose: adding a target kind forces a decision here.
pub fn select(candidates: &[ScoredCandidate]) -> Option<&ScoredCandidate> {
    candidates.iter().find(|candidate| match candidate.target.kind {
        TargetKind::Collectible => true,
        // Avoidance entries only; never a destination.
        TargetKind::Hazard => false,
        // Folded into path costs, never a terminal target.
        TargetKind::Teleporter => false,
    })
}

/// Converts a chosen target into the single move for this tick.
///
/// The move is the first step of the shortest path. When that step is not
/// orthogonally adjacent, the path departs through a teleporter under the
/// agent, and the move is the teleporter activation instead of a direction.
pub fn derive_move(field: &DistanceField, target: Position) -> Move {
    let Some(next) = field.first_step(&target) else {
        // Standing on the target: collection happens in place, so the
        // committed move is Idle. Same for a target with no path left.
        return Move::Idle;
    };
    match Move::step_between(field.source(), next) {
        Some(step) => step,
        None => {
            debug!(from = ?field.source(), to = ?next, "Path departs via teleporter");
            Move::UseTeleporter
        }
    }
}

/// The defined default when no candidate qualifies or the tick degraded:
/// stay put. Wandering was rejected so an empty board produces no movement
/// side effects.
pub fn fallback_move() -> Move {
    Move::Idle
}
