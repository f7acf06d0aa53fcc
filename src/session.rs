//! Game session replication between two peers.
//!
//! Each peer owns one [`GameSession`]. Local clicks are applied first and the
//! resulting action is handed back for broadcast; remote actions are replayed
//! through the validated turn API so a desynchronised peer cannot corrupt
//! local state.

use crate::games::dragon_face::{Action, Coord, Game, GameSnapshot, Player, TurnError, TurnOutcome};
use crate::protocol::{ProtocolError, WireMessage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Opaque identifier the host shares with the joiner.
pub type SessionId = String;

/// How a peer entered the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Created the session; plays as player 1.
    Host,
    /// Connected with the host's session id; plays as player 2.
    Joiner,
}

impl Role {
    /// The player this role controls for the whole session.
    pub fn player(self) -> Player {
        match self {
            Role::Host => Player::One,
            Role::Joiner => Player::Two,
        }
    }
}

/// Which players the local peer controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    /// Networked play: one side is local, the other remote.
    Single(Player),
    /// Both sides share this terminal; nothing is replicated.
    HotSeat,
}

impl Seat {
    /// Returns true if the local peer moves for `player`.
    pub fn controls(self, player: Player) -> bool {
        match self {
            Seat::Single(local) => local == player,
            Seat::HotSeat => true,
        }
    }
}

/// Result of applying a remote message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// A move or rescue was replayed.
    Applied(TurnOutcome),
    /// The remote peer reset the game.
    Reset,
}

/// Error applying a remote message.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ReplicationError {
    /// The frame could not be turned into an action.
    #[display("Protocol error: {}", _0)]
    Protocol(ProtocolError),

    /// The remote peer acted while it was the local player's turn.
    #[display("Remote action received on {}'s turn", current)]
    OutOfTurn {
        /// Player to move locally.
        current: Player,
    },

    /// The local move generator disagrees with the remote action.
    #[display("Remote action rejected: {}", _0)]
    Rejected(TurnError),
}

impl std::error::Error for ReplicationError {}

impl From<ProtocolError> for ReplicationError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}

impl From<TurnError> for ReplicationError {
    fn from(err: TurnError) -> Self {
        Self::Rejected(err)
    }
}

/// One peer's copy of a Dragon Face session.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Session ID.
    id: SessionId,
    /// Players controlled locally.
    seat: Seat,
    /// The game state.
    game: Game,
}

impl GameSession {
    /// Creates a new game session.
    pub fn new(id: SessionId, seat: Seat) -> Self {
        Self::from_game(id, seat, Game::new())
    }

    /// Creates a session that continues from an existing position.
    ///
    /// Both peers must start from equal games to stay in lockstep.
    #[instrument(skip(game))]
    pub fn from_game(id: SessionId, seat: Seat, game: Game) -> Self {
        info!(session_id = %id, ?seat, player = %game.current_player(), "Creating game session");
        Self { id, seat, game }
    }

    /// Creates the session for one side of a networked game.
    pub fn networked(id: SessionId, role: Role) -> Self {
        Self::new(id, Seat::Single(role.player()))
    }

    /// Creates a two-players-one-terminal session.
    pub fn hot_seat() -> Self {
        Self::new("local".to_string(), Seat::HotSeat)
    }

    /// Session ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Players controlled locally.
    pub fn seat(&self) -> Seat {
        self.seat
    }

    /// The game state.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> GameSnapshot {
        self.game.snapshot()
    }

    /// Checks if the player to move is controlled locally.
    pub fn is_local_turn(&self) -> bool {
        self.seat.controls(self.game.current_player())
    }

    /// Feeds a local click into the state machine.
    ///
    /// Returns the message to broadcast when the click committed a move or
    /// a rescue. Clicks on the remote player's turn are ignored.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn handle_local_click(&mut self, at: Coord) -> Option<WireMessage> {
        if !self.is_local_turn() {
            debug!(current = %self.game.current_player(), "Not the local player's turn");
            return None;
        }

        let action = self.game.handle_click(at)?;
        info!(?action, "Local action committed");
        Some(WireMessage::from_action(&action))
    }

    /// Resets locally and returns the message that resets the remote copy.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset_local(&mut self) -> WireMessage {
        self.game.reset();
        WireMessage::Reset
    }

    /// Replays a message received from the remote peer.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the local state untouched if the message
    /// is malformed, arrives on the local player's turn, or describes an
    /// action the local move generator does not allow.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn apply_remote(&mut self, message: WireMessage) -> Result<RemoteOutcome, ReplicationError> {
        let action = message.into_action()?;

        let current = self.game.current_player();
        let result = match action {
            Action::Reset => {
                info!("Remote peer reset the game");
                self.game.reset();
                return Ok(RemoteOutcome::Reset);
            }
            _ if self.seat.controls(current) => {
                warn!(%current, ?action, "Remote action out of turn");
                return Err(ReplicationError::OutOfTurn { current });
            }
            Action::Move { from, mv } => self.game.play(from, mv),
            Action::Rescue { ambassador } => self.game.rescue(ambassador),
        };

        let outcome = result.inspect_err(|e| warn!(error = %e, ?action, "Remote action rejected"))?;

        info!(?action, ?outcome, "Remote action applied");
        Ok(RemoteOutcome::Applied(outcome))
    }
}
