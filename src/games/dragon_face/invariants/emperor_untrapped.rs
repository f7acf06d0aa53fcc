//! Emperors never enter the trapped state.

use super::super::{Game, PieceKind};
use super::Invariant;

/// Invariant: no Emperor on the board is trapped.
pub struct EmperorUntrappedInvariant;

impl Invariant<Game> for EmperorUntrappedInvariant {
    fn holds(game: &Game) -> bool {
        game.board()
            .pieces()
            .all(|(_, piece)| piece.kind() != PieceKind::Emperor || !piece.is_trapped())
    }

    fn description() -> &'static str {
        "Emperors are never trapped"
    }
}
