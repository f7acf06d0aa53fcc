//! Turn state machine for Dragon Face.
//!
//! The machine moves through selection, move application, an optional
//! rescue sub-turn and turn handoff. User-facing operations
//! ([`Game::handle_click`] and friends) silently ignore illegal input;
//! [`Game::play`] and [`Game::rescue`] are the validated entry points the
//! replication layer uses and report why an action was refused.

use super::action::{Action, Move, TurnError, TurnOutcome};
use super::movegen::moves_for;
use super::snapshot::GameSnapshot;
use super::types::{Board, Coord, Piece, PieceKind, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Phase of the turn state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the player to move to pick a piece.
    AwaitingSelection,
    /// A piece is selected; its legal moves are cached.
    PieceSelected {
        /// Square of the selected piece.
        from: Coord,
        /// Moves generated at selection time.
        moves: Vec<Move>,
    },
    /// A Governor reached the back row; the mover picks an Ambassador to rescue.
    AwaitingRescueChoice {
        /// Where the promoting Governor stands.
        governor: Coord,
    },
    /// An Emperor was captured.
    GameOver {
        /// The capturing player.
        winner: Player,
    },
}

/// Dragon Face game engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    current_player: Player,
    last_flipped: Option<Coord>,
    phase: Phase,
}

impl Game {
    /// Creates a new game with the standard layout; player 1 moves first.
    #[instrument]
    pub fn new() -> Self {
        Self::from_board(Board::new(), Player::One)
    }

    /// Creates a game from an arbitrary position.
    pub fn from_board(board: Board, current_player: Player) -> Self {
        Self {
            board,
            current_player,
            last_flipped: None,
            phase: Phase::AwaitingSelection,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Square flipped on the previous turn, immune from capture this turn.
    pub fn last_flipped(&self) -> Option<Coord> {
        self.last_flipped
    }

    /// Returns the current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// True once an Emperor has been captured.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver { .. })
    }

    /// The winner, if the game is over.
    pub fn winner(&self) -> Option<Player> {
        match self.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// Square of the promoting Governor while a rescue choice is pending.
    pub fn pending_rescue(&self) -> Option<Coord> {
        match self.phase {
            Phase::AwaitingRescueChoice { governor } => Some(governor),
            _ => None,
        }
    }

    /// Square of the selected piece, if any.
    pub fn selected(&self) -> Option<Coord> {
        match self.phase {
            Phase::PieceSelected { from, .. } => Some(from),
            _ => None,
        }
    }

    /// Moves available to the selected piece.
    pub fn selected_moves(&self) -> &[Move] {
        match &self.phase {
            Phase::PieceSelected { moves, .. } => moves,
            _ => &[],
        }
    }

    /// Untrapped piece of the player to move at `at`.
    fn selectable_piece(&self, at: Coord) -> Option<Piece> {
        self.board
            .get(at)
            .filter(|p| p.owner() == self.current_player && !p.is_trapped())
    }

    /// Legal moves for the piece at `from`, or nothing if the player to move
    /// could not select it.
    pub fn legal_moves(&self, from: Coord) -> Vec<Move> {
        if self.is_over() || self.selectable_piece(from).is_none() {
            return Vec::new();
        }
        moves_for(&self.board, from, self.last_flipped)
    }

    /// Trapped Ambassadors of the player to move.
    pub fn rescue_targets(&self) -> Vec<Coord> {
        self.trapped_ambassadors(self.current_player)
    }

    fn trapped_ambassadors(&self, player: Player) -> Vec<Coord> {
        self.board
            .pieces()
            .filter(|(_, p)| {
                p.kind() == PieceKind::Ambassador && p.owner() == player && p.is_trapped()
            })
            .map(|(at, _)| at)
            .collect()
    }

    /// Restores the starting position with player 1 to move.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting game");
        *self = Self::new();
    }

    // ─────────────────────────────────────────────────────────────
    //  User-facing operations (illegal input is ignored)
    // ─────────────────────────────────────────────────────────────

    /// Selects a piece of the player to move. Returns whether the selection took.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn select_square(&mut self, at: Coord) -> bool {
        if self.phase != Phase::AwaitingSelection || self.selectable_piece(at).is_none() {
            debug!("Selection ignored");
            return false;
        }
        let moves = moves_for(&self.board, at, self.last_flipped);
        debug!(count = moves.len(), "Piece selected");
        self.phase = Phase::PieceSelected { from: at, moves };
        true
    }

    /// Plays the cached move landing on `to`, if there is one.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn choose_destination(&mut self, to: Coord) -> Option<Action> {
        let Phase::PieceSelected { from, moves } = &self.phase else {
            return None;
        };
        let from = *from;
        let mv = moves.iter().copied().find(|m| m.to() == to)?;

        match self.play(from, mv) {
            Ok(_) => Some(Action::Move { from, mv }),
            Err(e) => {
                debug!(error = %e, "Destination ignored");
                None
            }
        }
    }

    /// Rescues the trapped Ambassador at `target`, if valid.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn choose_rescue_target(&mut self, target: Coord) -> Option<Action> {
        match self.rescue(target) {
            Ok(_) => Some(Action::Rescue { ambassador: target }),
            Err(e) => {
                debug!(error = %e, "Rescue target ignored");
                None
            }
        }
    }

    /// Single entry point for square clicks, dispatched on the current phase.
    ///
    /// Returns the committed action when the click played a move or a rescue.
    /// While a piece is selected, clicking another own piece re-selects and
    /// clicking anything else clears the selection.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn handle_click(&mut self, at: Coord) -> Option<Action> {
        match &self.phase {
            Phase::AwaitingSelection => {
                self.select_square(at);
                None
            }
            Phase::PieceSelected { moves, .. } => {
                if moves.iter().any(|m| m.to() == at) {
                    return self.choose_destination(at);
                }
                self.phase = Phase::AwaitingSelection;
                self.select_square(at);
                None
            }
            Phase::AwaitingRescueChoice { .. } => self.choose_rescue_target(at),
            Phase::GameOver { .. } => {
                debug!("Game is over, click ignored");
                None
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Validated operations
    // ─────────────────────────────────────────────────────────────

    /// Plays `mv` with the piece at `from` after checking it against the move generator.
    ///
    /// # Errors
    ///
    /// Fails without touching the state if the game is over, a rescue is
    /// pending, `from` holds no selectable piece, or `mv` is not generated
    /// for that piece. In debug builds a failed postcondition also rolls the
    /// move back and returns [`TurnError::InvariantViolation`].
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn play(&mut self, from: Coord, mv: Move) -> Result<TurnOutcome, TurnError> {
        match self.phase {
            Phase::GameOver { .. } => return Err(TurnError::GameOver),
            Phase::AwaitingRescueChoice { .. } => return Err(TurnError::RescuePending),
            Phase::AwaitingSelection | Phase::PieceSelected { .. } => {}
        }

        let piece = self
            .selectable_piece(from)
            .ok_or(TurnError::NoSelectablePiece(from))?;

        if !moves_for(&self.board, from, self.last_flipped).contains(&mv) {
            return Err(TurnError::IllegalMove { from, to: mv.to() });
        }

        #[cfg(debug_assertions)]
        let before = self.clone();

        let outcome = self.apply_move(from, piece, mv);

        #[cfg(debug_assertions)]
        self.check_contract(before)?;

        Ok(outcome)
    }

    /// Swaps the promoting Governor with the trapped Ambassador at `target`.
    ///
    /// # Errors
    ///
    /// Fails without touching the state if no rescue is pending or `target`
    /// is not a trapped Ambassador of the player to move. A failed debug
    /// postcondition is rolled back the same way as in [`Game::play`].
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub fn rescue(&mut self, target: Coord) -> Result<TurnOutcome, TurnError> {
        let governor_at = match self.phase {
            Phase::AwaitingRescueChoice { governor } => governor,
            Phase::GameOver { .. } => return Err(TurnError::GameOver),
            _ => return Err(TurnError::NoRescuePending),
        };

        let mut ambassador = self
            .board
            .get(target)
            .filter(|p| {
                p.kind() == PieceKind::Ambassador
                    && p.owner() == self.current_player
                    && p.is_trapped()
            })
            .ok_or(TurnError::InvalidRescueTarget(target))?;

        let mut governor = self.board.get(governor_at).ok_or_else(|| {
            TurnError::InvariantViolation(format!("No Governor at {}", governor_at))
        })?;

        #[cfg(debug_assertions)]
        let before = self.clone();

        // The Governor takes the Ambassador's place in the Sacrifice Zone.
        governor.set_trapped(true);
        ambassador.set_trapped(false);
        self.board.set(governor_at, Some(ambassador));
        self.board.set(target, Some(governor));
        info!(%governor_at, %target, "Ambassador rescued");

        let outcome = self.end_turn();

        #[cfg(debug_assertions)]
        self.check_contract(before)?;

        Ok(outcome)
    }

    /// Runs the turn postconditions, restoring `before` if they fail.
    #[cfg(debug_assertions)]
    fn check_contract(&mut self, before: Game) -> Result<(), TurnError> {
        if let Err(e) = super::contracts::TurnContract::post(&before, self) {
            *self = before;
            return Err(e);
        }
        Ok(())
    }

    fn apply_move(&mut self, from: Coord, mut piece: Piece, mv: Move) -> TurnOutcome {
        let mover = self.current_player;
        let mut flipped = None;

        if let Move::Capture { jumped, .. } = mv
            && let Some(mut target) = self.board.get(jumped)
        {
            if target.kind() == PieceKind::Emperor {
                // Terminal: nothing moves and nothing flips.
                info!(winner = %mover, %jumped, "Emperor captured");
                self.phase = Phase::GameOver { winner: mover };
                return TurnOutcome::GameWon { winner: mover };
            }
            target.set_owner(mover);
            self.board.set(jumped, Some(target));
            flipped = Some(jumped);
            debug!(%jumped, kind = %target.kind(), "Piece flipped");
        }

        let to = mv.to();
        if piece.kind() == PieceKind::Governor {
            piece.mark_moved();
        }
        // Emperors may jump into the Sacrifice Zone but are never trapped there.
        if !to.is_playable() && piece.kind() != PieceKind::Emperor {
            piece.set_trapped(true);
            debug!(%to, "Piece trapped in the Sacrifice Zone");
        }
        self.board.set(from, None);
        self.board.set(to, Some(piece));
        self.last_flipped = flipped;

        if piece.kind() == PieceKind::Governor
            && to.row() == mover.promotion_row()
            && !self.trapped_ambassadors(mover).is_empty()
        {
            info!(governor = %to, "Governor promoted, awaiting rescue choice");
            self.phase = Phase::AwaitingRescueChoice { governor: to };
            return TurnOutcome::RescuePending { governor: to };
        }

        self.end_turn()
    }

    fn end_turn(&mut self) -> TurnOutcome {
        self.current_player = self.current_player.opponent();
        self.phase = Phase::AwaitingSelection;
        debug!(next = %self.current_player, "Turn passed");
        TurnOutcome::TurnPassed {
            next: self.current_player,
        }
    }

    /// Read-only view for presentation.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
