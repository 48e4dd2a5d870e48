//! WorldSync CLI
//!
//! Command-line tools for running and debugging WorldSync clients.
//!
//! # Commands
//!
//! - `connect` - Run a client against a server until Ctrl-C or disconnect
//! - `decode` - Decode an inbound frame for debugging
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use worldsync_engine::{ClientConfig, SelfEchoPolicy};
use worldsync_protocol::Position;

/// WorldSync command-line client tools.
#[derive(Parser)]
#[command(name = "worldsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to a server and sync until interrupted
    Connect {
        /// Server address (ws:// or wss://); blank uses the default server
        #[arg(short, long, env = "WORLDSYNC_URL")]
        url: Option<String>,

        /// Local entity identifier
        #[arg(long, env = "WORLDSYNC_ID")]
        id: String,

        /// Publish interval in milliseconds
        #[arg(short, long, default_value = "100")]
        interval_ms: u64,

        /// Local entity position as x,y,z
        #[arg(short, long, value_parser = commands::connect::parse_position)]
        position: Option<Position>,

        /// Receive only, never publish
        #[arg(long)]
        no_publish: bool,

        /// Apply snapshots carrying the local identifier
        #[arg(long)]
        apply_self_echo: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Decode an inbound frame from a file or stdin
    Decode {
        /// File holding the frame; reads stdin when omitted
        file: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Connect {
            url,
            id,
            interval_ms,
            position,
            no_publish,
            apply_self_echo,
            format,
        } => {
            // wss:// needs a process-wide crypto provider.
            let _ = rustls::crypto::ring::default_provider().install_default();

            let self_echo = if apply_self_echo {
                SelfEchoPolicy::Apply
            } else {
                SelfEchoPolicy::Ignore
            };
            let config = ClientConfig::new(id)
                .with_server_override(url.as_deref())
                .with_send_interval(Duration::from_millis(interval_ms))
                .with_publish(!no_publish)
                .with_self_echo(self_echo);
            commands::connect::run(config, position, &format)?;
        }
        Commands::Decode { file, format } => {
            commands::decode::run(file.as_deref(), &format)?;
        }
        Commands::Version => {
            println!("WorldSync CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Default server: {}", worldsync_engine::DEFAULT_SERVER_URL);
        }
    }

    Ok(())
}
