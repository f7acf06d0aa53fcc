//! Dragon Face library - rules engine and peer-to-peer session replication
//!
//! Dragon Face is a two-player strategy game on an 11x9 board whose outer
//! ring is a Sacrifice Zone. Captures flip pieces instead of removing them,
//! and capturing the Emperor wins.
//!
//! # Architecture
//!
//! - **Games**: board model, move generator and turn state machine
//! - **Protocol**: the three JSON wire messages exchanged by peers
//! - **Session**: one peer's replica; validates remote actions before replay
//! - **Transport**: TCP, in-memory and offline message channels
//! - **Orchestrator**: async loop joining user input, session and transport
//!
//! # Example
//!
//! ```
//! use dragon_face::{Coord, GameSession, Role};
//!
//! let mut host = GameSession::networked("127.0.0.1:7878".to_string(), Role::Host);
//! let mut joiner = GameSession::networked("127.0.0.1:7878".to_string(), Role::Joiner);
//!
//! host.handle_local_click(Coord::new(8, 4).unwrap());
//! let message = host.handle_local_click(Coord::new(6, 4).unwrap()).unwrap();
//! joiner.apply_remote(message).unwrap();
//!
//! assert_eq!(host.game(), joiner.game());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod orchestrator;
mod protocol;
mod session;
mod terminal;
mod transport;

// Crate-level exports - Configuration
pub use config::{ConfigError, PeerConfig};

// Crate-level exports - Game types
pub use games::dragon_face::{
    Action, Board, COLS, Coord, Game, GameSnapshot, Move, Phase, Piece, PieceConservation,
    PieceKind, Player, ROWS, TurnContract, TurnError, TurnOutcome, invariants, moves_for,
};

// Crate-level exports - Wire protocol
pub use protocol::{
    MovePayload, ProtocolError, WireCell, WireMessage, WireMove, WireMoveKind, WireSquare,
};

// Crate-level exports - Session management
pub use session::{GameSession, RemoteOutcome, ReplicationError, Role, Seat, SessionId};

// Crate-level exports - Transports
pub use transport::{
    HostListener, MemoryTransport, OfflineTransport, TcpTransport, Transport, TransportError,
};

// Crate-level exports - Orchestration and terminal adapter
pub use orchestrator::{GameEvent, Input, Orchestrator, SessionEnd};
pub use terminal::{HELP, parse_command, render_board, render_status};
