//! Dragon Face: board model, move generation and the turn state machine.

mod action;
mod contracts;
mod game;
pub mod invariants;
mod movegen;
mod snapshot;
mod types;

pub use action::{Action, Move, TurnError, TurnOutcome};
pub use contracts::{PieceConservation, TurnContract};
pub use game::{Game, Phase};
pub use movegen::moves_for;
pub use snapshot::GameSnapshot;
pub use types::{Board, COLS, Coord, Piece, PieceKind, Player, ROWS};
