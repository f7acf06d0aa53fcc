//! Wire protocol between the two peers.
//!
//! Three message shapes, newline-delimited JSON:
//!
//! ```text
//! {"type":"move","move":{"startRow":8,"startCol":4,"move":{"r":6,"c":4,"type":"move"}}}
//! {"type":"promotion","move":{"row":0,"col":5}}
//! {"type":"reset"}
//! ```
//!
//! Frames are decoded once, here, into a closed set of variants; unknown
//! tags are rejected.

use crate::games::dragon_face::{Action, Coord, Move};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// A message exchanged between peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireMessage {
    /// A move played by the sender.
    Move {
        /// Source square and move description.
        #[serde(rename = "move")]
        payload: MovePayload,
    },
    /// The sender's rescue choice after a promotion.
    Promotion {
        /// Square of the rescued Ambassador.
        #[serde(rename = "move")]
        target: WireSquare,
    },
    /// Restart from the initial position.
    Reset,
}

/// Payload of a `move` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    /// Row of the moving piece.
    pub start_row: u8,
    /// Column of the moving piece.
    pub start_col: u8,
    /// Destination and kind.
    #[serde(rename = "move")]
    pub step: WireMove,
}

/// Move description as it travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    /// Destination row.
    pub r: u8,
    /// Destination column.
    pub c: u8,
    /// `move` or `capture`.
    #[serde(rename = "type")]
    pub kind: WireMoveKind,
    /// Jumped square, captures only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jumped: Option<WireCell>,
}

/// Kind tag of a [`WireMove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireMoveKind {
    /// Plain move.
    Move,
    /// Jump with flip.
    Capture,
}

/// A square in `{r, c}` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCell {
    /// Row.
    pub r: u8,
    /// Column.
    pub c: u8,
}

/// A square in `{row, col}` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSquare {
    /// Row.
    pub row: u8,
    /// Column.
    pub col: u8,
}

/// Error decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ProtocolError {
    /// Not valid JSON, or not one of the three message shapes.
    #[display("Malformed message: {}", _0)]
    Malformed(String),

    /// A square outside the 11x9 grid.
    #[display("Square ({}, {}) is off the board", row, col)]
    OutOfBounds {
        /// Row received.
        row: u8,
        /// Column received.
        col: u8,
    },

    /// A capture without the jumped square.
    #[display("Capture is missing the jumped square")]
    MissingJumped,
}

impl std::error::Error for ProtocolError {}

fn coord(row: u8, col: u8) -> Result<Coord, ProtocolError> {
    Coord::new(row, col).ok_or(ProtocolError::OutOfBounds { row, col })
}

impl WireMessage {
    /// Builds the message that replicates `action`.
    pub fn from_action(action: &Action) -> Self {
        match *action {
            Action::Move { from, mv } => WireMessage::Move {
                payload: MovePayload {
                    start_row: from.row(),
                    start_col: from.col(),
                    step: WireMove {
                        r: mv.to().row(),
                        c: mv.to().col(),
                        kind: if mv.is_capture() {
                            WireMoveKind::Capture
                        } else {
                            WireMoveKind::Move
                        },
                        jumped: mv.jumped().map(|j| WireCell {
                            r: j.row(),
                            c: j.col(),
                        }),
                    },
                },
            },
            Action::Rescue { ambassador } => WireMessage::Promotion {
                target: WireSquare {
                    row: ambassador.row(),
                    col: ambassador.col(),
                },
            },
            Action::Reset => WireMessage::Reset,
        }
    }

    /// Converts the message into an action, checking every square is on the grid.
    ///
    /// Legality is not checked here; that is the turn engine's job.
    pub fn into_action(self) -> Result<Action, ProtocolError> {
        match self {
            WireMessage::Move { payload } => {
                let from = coord(payload.start_row, payload.start_col)?;
                let to = coord(payload.step.r, payload.step.c)?;
                let mv = match payload.step.kind {
                    WireMoveKind::Move => Move::Step { to },
                    WireMoveKind::Capture => {
                        let jumped = payload.step.jumped.ok_or(ProtocolError::MissingJumped)?;
                        Move::Capture {
                            to,
                            jumped: coord(jumped.r, jumped.c)?,
                        }
                    }
                };
                Ok(Action::Move { from, mv })
            }
            WireMessage::Promotion { target } => Ok(Action::Rescue {
                ambassador: coord(target.row, target.col)?,
            }),
            WireMessage::Reset => Ok(Action::Reset),
        }
    }

    /// Encodes the message as one JSON line (without the trailing newline).
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    /// Decodes one frame.
    #[instrument]
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        let message = serde_json::from_str(frame.trim())
            .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        trace!(?message, "Decoded frame");
        Ok(message)
    }
}

impl From<Action> for WireMessage {
    fn from(action: Action) -> Self {
        Self::from_action(&action)
    }
}
