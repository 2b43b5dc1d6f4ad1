use std::path::PathBuf;

use clap::Parser;

/// chatstatus: live typing and read-position presence for a chat room.
///
/// Reads local signals from stdin, one per line, and prints presence
/// changes for the other users in the room.
#[derive(Parser, Debug)]
#[command(name = "chatstatus", version, about)]
pub struct Args {
    /// Room to join.
    pub room: String,

    /// Local user id.
    pub user: String,

    /// Relay host override.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
