//! Dragon Face - terminal client
//!
//! Host or join a networked game, or play hot-seat on one terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use dragon_face::{
    GameEvent, GameSession, HELP, HostListener, OfflineTransport, Orchestrator, PeerConfig,
    Role, Seat, SessionEnd, TcpTransport, Transport, parse_command, render_board, render_status,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = PeerConfig::load_or_default(&cli.config)?;

    // Logs go to stderr so the board on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Host { port, host } => run_host(config.with_overrides(host, port)).await,
        Command::Join { session_id } => run_join(&config, session_id).await,
        Command::Local => run_local().await,
    }
}

/// Host a session and wait for the joiner.
#[instrument(skip_all)]
async fn run_host(config: PeerConfig) -> Result<()> {
    let listener = HostListener::bind(config.host(), *config.port()).await?;
    let session_id = listener.session_id().to_string();

    println!("Session id: {}", session_id);
    println!("Share it with your opponent, then wait for them to join...");

    let transport = listener.accept().await?;
    println!("Opponent connected from {}. You are Player 1.", transport.peer());

    play(GameSession::networked(session_id, Role::Host), transport).await
}

/// Join a hosted session.
#[instrument(skip(config))]
async fn run_join(config: &PeerConfig, session_id: String) -> Result<()> {
    let transport = TcpTransport::join(&session_id, config.connect_timeout()).await?;
    println!("Connected to {}. You are Player 2.", transport.peer());

    play(GameSession::networked(session_id, Role::Joiner), transport).await
}

/// Two players, one terminal.
async fn run_local() -> Result<()> {
    println!("Hot-seat game: both players enter moves here.");
    play(GameSession::hot_seat(), OfflineTransport).await
}

/// Wires stdin and stdout to an orchestrator and runs it to completion.
async fn play<T: Transport>(session: GameSession, transport: T) -> Result<()> {
    let seat = session.seat();
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    println!("{}", HELP);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line) {
                Some(input) => {
                    if input_tx.send(input).is_err() {
                        break;
                    }
                }
                None => println!("{}", HELP),
            }
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            print_event(&event, seat);
        }
    });

    let mut orchestrator = Orchestrator::new(session, transport, input_rx, event_tx);
    let end = orchestrator.run().await;
    drop(orchestrator);
    printer.await?;

    match end? {
        SessionEnd::PeerDisconnected => {
            warn!("Session aborted: peer disconnected");
            anyhow::bail!("Connection to the other player was lost")
        }
        end => {
            info!(?end, "Session finished");
            Ok(())
        }
    }
}

fn print_event(event: &GameEvent, seat: Seat) {
    match event {
        GameEvent::StateChanged(snapshot) => {
            println!("\n{}{}", render_board(snapshot), render_status(snapshot, seat));
        }
        GameEvent::RemoteReset => println!("Your opponent restarted the game."),
        GameEvent::Desync(reason) => println!("Ignored a move from your opponent: {}", reason),
        GameEvent::GameOver { winner } => println!("*** {} Won!!! ***", winner),
        GameEvent::SessionEnded(reason) => println!("{}", reason),
    }
}
