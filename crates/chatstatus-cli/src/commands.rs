//! Line commands read from stdin.

use chatstatus_client::{FeedMessage, LocalSignal};
use chatstatus_common::{MessageId, UserId};

pub const HELP: &str = "\
commands:
  focus                  input box gained focus
  blur                   input box lost focus
  key                    one keystroke
  loaded <id>...         initial feed batch, as id or id:author
  message <id> <user>    a live message arrived
  self on|off            show or hide your own indicator
  fail <asset>           a collaborator failed to load
  help                   this text
  quit                   leave the room";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Signal(LocalSignal),
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("invalid message id: {0}")]
    BadId(String),
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (name, rest.as_slice()) {
        ("focus", []) => Command::Signal(LocalSignal::FocusChanged(true)),
        ("blur", []) => Command::Signal(LocalSignal::FocusChanged(false)),
        ("key", []) => Command::Signal(LocalSignal::Keystroke),
        ("loaded", ids) => {
            let messages = ids
                .iter()
                .map(|entry| parse_loaded(entry))
                .collect::<Result<Vec<_>, _>>()?;
            Command::Signal(LocalSignal::FeedLoaded { messages })
        }
        ("message", [id, user]) => Command::Signal(LocalSignal::MessageAdded(FeedMessage::new(
            parse_id(id)?,
            UserId::new(*user),
        ))),
        ("message", _) => return Err(CommandError::Usage("message <id> <user>")),
        ("self", ["on"]) => Command::Signal(LocalSignal::SetShowSelf(true)),
        ("self", ["off"]) => Command::Signal(LocalSignal::SetShowSelf(false)),
        ("self", _) => return Err(CommandError::Usage("self on|off")),
        ("fail", [asset]) => Command::Signal(LocalSignal::CollaboratorFailed {
            name: (*asset).to_string(),
        }),
        ("fail", _) => return Err(CommandError::Usage("fail <asset>")),
        ("help", []) => Command::Help,
        ("quit", []) | ("exit", []) => Command::Quit,
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };
    Ok(Some(command))
}

/// `id` or `id:author`. Authors are irrelevant to the initial batch.
fn parse_loaded(entry: &str) -> Result<FeedMessage, CommandError> {
    let (id, author) = entry.split_once(':').unwrap_or((entry, ""));
    Ok(FeedMessage::new(parse_id(id)?, UserId::new(author)))
}

fn parse_id(raw: &str) -> Result<MessageId, CommandError> {
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(CommandError::BadId(raw.to_string())),
        Ok(id) => Ok(MessageId(id)),
    }
}
