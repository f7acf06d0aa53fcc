//! The immunity marker always points at a piece.

use super::super::Game;
use super::Invariant;

/// Invariant: `last_flipped`, when set, refers to an occupied cell.
///
/// A flipped piece belongs to the player who just moved, so the opponent
/// cannot move it away during the single turn its immunity lasts.
pub struct ImmunityOccupiedInvariant;

impl Invariant<Game> for ImmunityOccupiedInvariant {
    fn holds(game: &Game) -> bool {
        game.last_flipped()
            .is_none_or(|at| !game.board().is_empty(at))
    }

    fn description() -> &'static str {
        "Immunity marker refers to an occupied cell"
    }
}
