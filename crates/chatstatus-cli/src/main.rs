//! chatstatus: headless presence client.
//!
//! Connects to the presence relay for one room, turns stdin lines into
//! local signals, and prints what the other users are doing.

mod cli;
mod commands;
mod render;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chatstatus_client::{
    ControllerConfig, LocalSignal, PresenceChange, PresenceSession, TransportConfig,
};
use chatstatus_common::{ChatStatusError, ConfigError, RoomId, UserId};
use chatstatus_config::{toml_loader, validation, ChatStatusConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::commands::{parse_command, Command, HELP};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let config_path = match args.config.clone() {
        Some(path) => Some(path),
        None => toml_loader::default_config_path().ok(),
    };
    let loaded = match &config_path {
        Some(path) => load_or_create(path),
        None => Err(ChatStatusError::Other(
            "could not determine config directory".into(),
        )),
    };
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => ChatStatusConfig::default(),
    };
    // Preference writes go back to the file without CLI overrides.
    let file_config = config.clone();
    if let Some(server) = &args.server {
        config.connection.server = server.clone();
    }

    init_logging(args.log_level.as_deref(), config.preferences.debug);
    tracing::info!("chatstatus v{} starting...", env!("CARGO_PKG_VERSION"));
    match (&loaded, &config_path) {
        (Ok(_), Some(path)) => tracing::info!("Config loaded from {}", path.display()),
        (Err(e), _) => tracing::warn!("Config load failed, using defaults: {e}"),
        _ => {}
    }
    if let Err(e) = validation::validate(&config) {
        tracing::warn!("Config validation warning: {e}");
    }

    if args.print_config {
        println!("{}", chatstatus_config::config_to_json(&config));
        return;
    }

    let room = RoomId::new(args.room);
    let user = UserId::new(args.user);
    let (session, changes) = PresenceSession::start(
        transport_config(&config, room, user.clone()),
        controller_config(&config, user),
    );

    run(session, changes, file_config, config_path).await;
    tracing::info!("Shutdown complete");
}

/// Default directive is `chatstatus=info`; the `debug` preference raises it.
fn init_logging(override_level: Option<&str>, debug: bool) {
    let fallback = if debug {
        "chatstatus=debug"
    } else {
        "chatstatus=info"
    };
    let directive = override_level.unwrap_or(fallback);
    let filter = match directive.parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::new(fallback),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_or_create(path: &Path) -> chatstatus_common::Result<ChatStatusConfig> {
    match toml_loader::load_from_path(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            toml_loader::create_default_config(path)?;
            Ok(ChatStatusConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn transport_config(config: &ChatStatusConfig, room: RoomId, user: UserId) -> TransportConfig {
    let conn = config.connection.clamped();
    let mut transport = TransportConfig::new(conn.server.clone(), room, user);
    transport.ping_interval = Duration::from_secs(u64::from(conn.ping_interval_seconds));
    transport.retry_interval = Duration::from_secs(u64::from(conn.retry_interval_seconds));
    transport.connect_timeout = Duration::from_secs(u64::from(conn.connect_timeout_seconds));
    transport
}

fn controller_config(config: &ChatStatusConfig, user: UserId) -> ControllerConfig {
    let mut controller = ControllerConfig::new(user, config.connection.server.clone());
    controller.show_self = config.preferences.show_self;
    controller
}

async fn run(
    session: PresenceSession,
    mut changes: tokio::sync::mpsc::Receiver<PresenceChange>,
    mut config: ChatStatusConfig,
    config_path: Option<PathBuf>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read stdin");
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::Help)) => println!("{HELP}"),
                    Ok(Some(Command::Signal(signal))) => {
                        if let LocalSignal::SetShowSelf(visible) = signal {
                            persist_show_self(&mut config, config_path.as_deref(), visible);
                        }
                        session.signal(signal).await;
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            change = changes.recv() => match change {
                Some(change) => println!("{}", render::describe(&change)),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.shutdown().await;
}

fn persist_show_self(config: &mut ChatStatusConfig, path: Option<&Path>, visible: bool) {
    if config.preferences.show_self == visible {
        return;
    }
    config.preferences.show_self = visible;
    let saved = match path {
        Some(path) => chatstatus_config::save_config_to_path(config, path),
        None => chatstatus_config::save_config(config),
    };
    match saved {
        Ok(()) => tracing::debug!("Saved show_self = {visible}"),
        Err(e) => tracing::warn!("Failed to save preferences: {e}"),
    }
}
