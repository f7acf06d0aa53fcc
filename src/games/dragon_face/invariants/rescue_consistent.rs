//! A pending rescue always has a promoting Governor and something to rescue.

use super::super::{Game, PieceKind};
use super::Invariant;

/// Invariant: while a rescue is pending, the current player's Governor stands
/// on that player's promotion row and the player owns a trapped Ambassador.
pub struct RescueConsistentInvariant;

impl Invariant<Game> for RescueConsistentInvariant {
    fn holds(game: &Game) -> bool {
        let Some(governor) = game.pending_rescue() else {
            return true;
        };
        let player = game.current_player();

        let governor_ok = game.board().get(governor).is_some_and(|piece| {
            piece.kind() == PieceKind::Governor && piece.owner() == player
        }) && governor.row() == player.promotion_row();

        governor_ok && !game.rescue_targets().is_empty()
    }

    fn description() -> &'static str {
        "Pending rescue has a promoting Governor and a trapped Ambassador"
    }
}
