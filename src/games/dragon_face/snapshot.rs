//! Read-only view of a game for presentation adapters.

use super::game::Game;
use super::types::{Board, Coord, Player};
use derive_getters::Getters;
use serde::Serialize;

/// Everything a renderer needs after a state change.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct GameSnapshot {
    /// Board contents.
    board: Board,
    /// Player to move.
    current_player: Player,
    /// Square protected from capture this turn.
    last_flipped: Option<Coord>,
    /// Selected piece, if any.
    selected: Option<Coord>,
    /// Destinations of the selected piece.
    destinations: Vec<Coord>,
    /// Promoting Governor while a rescue choice is pending.
    pending_rescue: Option<Coord>,
    /// Ambassadors that may be chosen for the pending rescue.
    rescue_targets: Vec<Coord>,
    /// Whether an Emperor has been captured.
    is_over: bool,
    /// The winner, once the game is over.
    winner: Option<Player>,
    /// Pieces owned by player 1 and player 2.
    piece_counts: (usize, usize),
}

impl GameSnapshot {
    pub(super) fn capture(game: &Game) -> Self {
        let pending_rescue = game.pending_rescue();
        Self {
            board: game.board().clone(),
            current_player: game.current_player(),
            last_flipped: game.last_flipped(),
            selected: game.selected(),
            destinations: game.selected_moves().iter().map(|m| m.to()).collect(),
            pending_rescue,
            rescue_targets: if pending_rescue.is_some() {
                game.rescue_targets()
            } else {
                Vec::new()
            },
            is_over: game.is_over(),
            winner: game.winner(),
            piece_counts: (
                game.board().count_for(Player::One),
                game.board().count_for(Player::Two),
            ),
        }
    }
}
