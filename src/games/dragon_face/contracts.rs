//! Postcondition contract for applied turns.
//!
//! Checked in debug builds after every move or rescue: {before} turn {after}.

use super::action::TurnError;
use super::game::Game;
use super::invariants::{DragonFaceInvariants, InvariantSet};
use tracing::{instrument, warn};

/// Invariant across a transition: flips and swaps never add or remove pieces.
pub struct PieceConservation;

impl PieceConservation {
    /// True if both states carry the same number of pieces.
    pub fn holds(before: &Game, after: &Game) -> bool {
        before.board().piece_count() == after.board().piece_count()
    }
}

/// Contract for move and rescue transitions.
pub struct TurnContract;

impl TurnContract {
    /// Checks postconditions after applying a turn.
    #[instrument(skip_all)]
    pub fn post(before: &Game, after: &Game) -> Result<(), TurnError> {
        if !PieceConservation::holds(before, after) {
            warn!(
                before = before.board().piece_count(),
                after = after.board().piece_count(),
                "Piece count changed"
            );
            return Err(TurnError::InvariantViolation(
                "Postcondition failed: piece count changed".to_string(),
            ));
        }

        DragonFaceInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Invariant violated");
            TurnError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
