//! First-class action types for Dragon Face.
//!
//! Moves and rescues are domain events: they are produced locally, replayed
//! remotely, and validated against the move generator before application.

use super::types::{Coord, Player};
use serde::{Deserialize, Serialize};

/// A single legal move for a selected piece.
///
/// Produced by [`moves_for`](super::moves_for); the turn engine only accepts
/// values that the generator would produce for the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Plain move onto an empty cell.
    Step {
        /// Destination.
        to: Coord,
    },
    /// Jump over an enemy piece, flipping it.
    Capture {
        /// Landing cell.
        to: Coord,
        /// Cell of the piece jumped over.
        jumped: Coord,
    },
}

impl Move {
    /// Destination of the moving piece.
    pub fn to(&self) -> Coord {
        match self {
            Move::Step { to } | Move::Capture { to, .. } => *to,
        }
    }

    /// The jumped cell, for captures.
    pub fn jumped(&self) -> Option<Coord> {
        match self {
            Move::Step { .. } => None,
            Move::Capture { jumped, .. } => Some(*jumped),
        }
    }

    /// Returns true for captures.
    pub fn is_capture(&self) -> bool {
        matches!(self, Move::Capture { .. })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Step { to } => write!(f, "-> {}", to),
            Move::Capture { to, jumped } => write!(f, "x {} -> {}", jumped, to),
        }
    }
}

/// A committed, replicable player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move the piece at `from`.
    Move {
        /// Square the piece started on.
        from: Coord,
        /// The generated move that was played.
        mv: Move,
    },
    /// Swap the promoting Governor with the trapped Ambassador at `ambassador`.
    Rescue {
        /// Square of the trapped Ambassador chosen for rescue.
        ambassador: Coord,
    },
    /// Restore the starting position.
    Reset,
}

/// What a successfully applied move or rescue did to the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// The turn passed to `next`.
    TurnPassed {
        /// Player now to move.
        next: Player,
    },
    /// A Governor reached the back row; the mover must now pick an Ambassador to rescue.
    RescuePending {
        /// Where the promoting Governor stands.
        governor: Coord,
    },
    /// An Emperor was jumped.
    GameWon {
        /// The capturing player.
        winner: Player,
    },
}

/// Error from the validated turn API.
///
/// User-facing click handling swallows these; the replication layer reports them.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TurnError {
    /// The game has already been won.
    #[display("Game is already over")]
    GameOver,

    /// The square holds no untrapped piece of the player to move.
    #[display("No selectable piece at {}", _0)]
    NoSelectablePiece(Coord),

    /// The move is not produced by the move generator for this position.
    #[display("Illegal move from {} to {}", from, to)]
    IllegalMove {
        /// Source square.
        from: Coord,
        /// Requested destination.
        to: Coord,
    },

    /// A rescue choice is outstanding; no move may be played.
    #[display("A rescue choice is pending")]
    RescuePending,

    /// No rescue choice is outstanding.
    #[display("No rescue is pending")]
    NoRescuePending,

    /// The square does not hold a trapped Ambassador of the player to move.
    #[display("No trapped Ambassador to rescue at {}", _0)]
    InvalidRescueTarget(Coord),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for TurnError {}
