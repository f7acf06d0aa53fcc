//! Command-line interface for dragon_face.

use clap::{Parser, Subcommand};

/// Dragon Face - two-player strategy board game over a direct peer connection
#[derive(Parser, Debug)]
#[command(name = "dragon_face")]
#[command(about = "Play Dragon Face against a friend over the network", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to an optional TOML config file
    #[arg(short, long, global = true, default_value = "dragon_face.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host a session and play as Player 1
    Host {
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Interface to listen on (overrides the config file)
        #[arg(long)]
        host: Option<String>,
    },

    /// Join a hosted session and play as Player 2
    Join {
        /// Session id displayed by the host
        session_id: String,
    },

    /// Both players share this terminal
    Local,
}
