//! Session event loop between the local adapter and the remote peer.

use crate::games::dragon_face::{Coord, GameSnapshot, Player};
use crate::protocol::WireMessage;
use crate::session::{GameSession, RemoteOutcome, ReplicationError};
use crate::transport::Transport;
use anyhow::Result;
use derive_new::new;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Input forwarded by the presentation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A square was clicked.
    Click(Coord),
    /// Restart the game on both peers.
    Reset,
    /// Leave the session.
    Quit,
}

/// Messages sent from orchestrator to UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Game state updated.
    StateChanged(GameSnapshot),
    /// The remote peer reset the game.
    RemoteReset,
    /// A remote action was dropped because it did not match local state.
    Desync(String),
    /// Game ended.
    GameOver {
        /// Player who captured the Emperor.
        winner: Player,
    },
    /// The session is over and the loop has stopped.
    SessionEnded(String),
}

/// Why [`Orchestrator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The local user quit.
    LocalQuit,
    /// The adapter dropped its input channel.
    InputClosed,
    /// The remote peer closed the connection.
    PeerDisconnected,
}

enum Step {
    Local(Option<Input>),
    Remote(Option<String>),
}

/// Drives one [`GameSession`] over a [`Transport`].
#[derive(new)]
pub struct Orchestrator<T: Transport> {
    session: GameSession,
    transport: T,
    input_rx: mpsc::UnboundedReceiver<Input>,
    event_tx: mpsc::UnboundedSender<GameEvent>,
}

impl<T: Transport> Orchestrator<T> {
    /// The session being driven.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Runs the event loop until the user quits or the peer disconnects.
    ///
    /// # Errors
    ///
    /// Transport failures end the session with an error; there is no retry.
    #[instrument(skip(self), fields(session_id = %self.session.id()))]
    pub async fn run(&mut self) -> Result<SessionEnd> {
        info!("Starting session loop");
        self.publish_state()?;

        loop {
            let step = tokio::select! {
                input = self.input_rx.recv() => Step::Local(input),
                frame = self.transport.recv() => Step::Remote(frame?),
            };

            match step {
                Step::Local(None) => {
                    info!("Input closed");
                    return Ok(SessionEnd::InputClosed);
                }
                Step::Local(Some(Input::Quit)) => {
                    info!("Local user quit");
                    self.event_tx
                        .send(GameEvent::SessionEnded("You left the game".to_string()))?;
                    return Ok(SessionEnd::LocalQuit);
                }
                Step::Local(Some(input)) => self.handle_input(input).await?,
                Step::Remote(Some(frame)) => self.handle_frame(&frame)?,
                Step::Remote(None) => {
                    warn!("Connection lost");
                    self.event_tx.send(GameEvent::SessionEnded(
                        "Connection to the other player was lost".to_string(),
                    ))?;
                    return Ok(SessionEnd::PeerDisconnected);
                }
            }
        }
    }

    async fn handle_input(&mut self, input: Input) -> Result<()> {
        let outbound = match input {
            Input::Click(at) => {
                let was_over = self.session.game().is_over();
                let outbound = self.session.handle_local_click(at);
                self.publish_state()?;
                if !was_over {
                    self.publish_winner()?;
                }
                outbound
            }
            Input::Reset => {
                let message = self.session.reset_local();
                self.publish_state()?;
                Some(message)
            }
            Input::Quit => None,
        };

        if let Some(message) = outbound {
            debug!(?message, "Broadcasting local action");
            self.transport.send(&message).await?;
        }
        Ok(())
    }

    fn handle_frame(&mut self, frame: &str) -> Result<()> {
        let applied = WireMessage::decode(frame)
            .map_err(ReplicationError::from)
            .and_then(|message| self.session.apply_remote(message));

        match applied {
            Ok(RemoteOutcome::Reset) => {
                self.event_tx.send(GameEvent::RemoteReset)?;
                self.publish_state()?;
            }
            Ok(RemoteOutcome::Applied(outcome)) => {
                debug!(?outcome, "Remote action replayed");
                self.publish_state()?;
                self.publish_winner()?;
            }
            Err(e) => {
                warn!(error = %e, %frame, "Dropping remote frame");
                self.event_tx.send(GameEvent::Desync(e.to_string()))?;
            }
        }
        Ok(())
    }

    fn publish_state(&self) -> Result<()> {
        self.event_tx
            .send(GameEvent::StateChanged(self.session.snapshot()))?;
        Ok(())
    }

    fn publish_winner(&self) -> Result<()> {
        if let Some(winner) = self.session.game().winner() {
            info!(%winner, "Game over");
            self.event_tx.send(GameEvent::GameOver { winner })?;
        }
        Ok(())
    }
}
