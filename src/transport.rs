//! Message transports between the two peers.
//!
//! A transport delivers frames reliably and in order between exactly two
//! endpoints. Any failure ends the session; there is no retry.

use crate::protocol::WireMessage;
use crate::session::SessionId;
use async_trait::async_trait;
use derive_more::{Display, Error};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace};

/// Transport error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", message, file, line)]
pub struct TransportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for TransportError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

/// A reliable, ordered, two-party message channel.
#[async_trait]
pub trait Transport: Send {
    /// Sends one message to the peer.
    async fn send(&mut self, message: &WireMessage) -> Result<(), TransportError>;

    /// Receives the next raw frame. `None` means the peer closed the connection.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;
}

// ─────────────────────────────────────────────────────────────
//  TCP
// ─────────────────────────────────────────────────────────────

/// Newline-delimited JSON over a TCP connection.
#[derive(Debug)]
pub struct TcpTransport {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
}

impl TcpTransport {
    fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let (read, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read).lines(),
            writer,
            peer,
        })
    }

    /// Connects to a host using the session id it displayed.
    #[instrument]
    pub async fn join(session_id: &str, timeout: Duration) -> Result<Self, TransportError> {
        info!("Joining session");
        let stream = tokio::time::timeout(timeout, TcpStream::connect(session_id))
            .await
            .map_err(|_| TransportError::new(format!("Timed out connecting to {}", session_id)))?
            .map_err(|e| TransportError::new(format!("Connection to {} refused: {}", session_id, e)))?;
        let transport = Self::from_stream(stream)?;
        info!(peer = %transport.peer, "Connected to host");
        Ok(transport)
    }

    /// Address of the remote peer.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, message: &WireMessage) -> Result<(), TransportError> {
        let mut frame = message
            .encode()
            .map_err(|e| TransportError::new(e.to_string()))?;
        trace!(%frame, "Sending frame");
        frame.push('\n');
        self.writer.write_all(frame.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        while let Some(line) = self.reader.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            trace!(frame = %line, "Received frame");
            return Ok(Some(line));
        }
        debug!(peer = %self.peer, "Peer closed the connection");
        Ok(None)
    }
}

/// A bound host waiting for its single opponent.
#[derive(Debug)]
pub struct HostListener {
    listener: TcpListener,
    session_id: SessionId,
}

impl HostListener {
    /// Binds the listener. The bound address becomes the session id.
    #[instrument]
    pub async fn bind(host: &str, port: u16) -> Result<Self, TransportError> {
        let listener = TcpListener::bind((host, port)).await?;
        let session_id = listener.local_addr()?.to_string();
        info!(%session_id, "Hosting session");
        Ok(Self {
            listener,
            session_id,
        })
    }

    /// The id the joiner must supply.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Waits for the opponent; the listener closes once it has connected.
    #[instrument(skip(self), fields(session_id = %self.session_id))]
    pub async fn accept(self) -> Result<TcpTransport, TransportError> {
        let (stream, peer) = self.listener.accept().await?;
        info!(%peer, "Opponent connected");
        TcpTransport::from_stream(stream)
    }
}

// ─────────────────────────────────────────────────────────────
//  In-memory
// ─────────────────────────────────────────────────────────────

/// One end of an in-process channel pair. Frames still go through the codec.
#[derive(Debug)]
pub struct MemoryTransport {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl MemoryTransport {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self { tx: a_tx, rx: a_rx },
            Self { tx: b_tx, rx: b_rx },
        )
    }

    /// Pushes a raw frame, bypassing the encoder.
    pub fn send_raw(&self, frame: impl Into<String>) -> Result<(), TransportError> {
        self.tx
            .send(frame.into())
            .map_err(|_| TransportError::new("Peer disconnected"))
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, message: &WireMessage) -> Result<(), TransportError> {
        let frame = message
            .encode()
            .map_err(|e| TransportError::new(e.to_string()))?;
        self.send_raw(frame)
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.rx.recv().await)
    }
}

// ─────────────────────────────────────────────────────────────
//  Offline
// ─────────────────────────────────────────────────────────────

/// Transport for hot-seat play: sends go nowhere and nothing ever arrives.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTransport;

#[async_trait]
impl Transport for OfflineTransport {
    async fn send(&mut self, _message: &WireMessage) -> Result<(), TransportError> {
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(std::future::pending().await)
    }
}
