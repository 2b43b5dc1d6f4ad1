//! Wire protocol spoken with the presence relay.
//!
//! Every frame is a single JSON object with a `type` discriminant. Clients
//! send `{"type", "value"?}`; the relay fans frames out to the room as
//! `{"type", "user_id", "value"?}`. An empty text frame is the relay's
//! keepalive echo.

use chatstatus_common::{ChatStatusError, MessageId, UserId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Frame kinds
// ---------------------------------------------------------------------------

/// `type` values used on the wire.
pub mod kinds {
    pub const PING: &str = "ping";
    pub const ACTIVE: &str = "active";
    pub const POSITION: &str = "position";
    pub const TYPING: &str = "typing";
    pub const QUIT: &str = "quit";
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A frame this client sends to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Keepalive.
    Ping,
    /// Input focus gained or lost.
    Active(bool),
    /// Last message the local user has read.
    Position(MessageId),
    /// Local user typed; unix timestamp in seconds.
    Typing(i64),
}

#[derive(Serialize)]
struct OutboundWire {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<WireValue>,
}

/// Message ids are unsigned and timestamps signed; both go out as bare JSON
/// numbers.
#[derive(Serialize)]
#[serde(untagged)]
enum WireValue {
    Signed(i64),
    Unsigned(u64),
}

impl OutboundFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundFrame::Ping => kinds::PING,
            OutboundFrame::Active(_) => kinds::ACTIVE,
            OutboundFrame::Position(_) => kinds::POSITION,
            OutboundFrame::Typing(_) => kinds::TYPING,
        }
    }

    /// Serialize to the JSON text sent over the socket.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let value = match *self {
            OutboundFrame::Ping => None,
            OutboundFrame::Active(active) => Some(WireValue::Unsigned(u64::from(active))),
            OutboundFrame::Position(id) => Some(WireValue::Unsigned(id.0)),
            OutboundFrame::Typing(ts) => Some(WireValue::Signed(ts)),
        };
        serde_json::to_string(&OutboundWire {
            kind: self.kind(),
            value,
        })
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A frame received from the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Empty keepalive echo or a relayed ping. Carries no state.
    Keepalive,
    Active { user_id: UserId, active: bool },
    Position { user_id: UserId, message_id: MessageId },
    Typing { user_id: UserId, timestamp: i64 },
    Quit { user_id: UserId },
}

/// Why an inbound frame was dropped.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} frame is missing user_id")]
    MissingUser(&'static str),

    #[error("{kind} frame has invalid value: {value}")]
    BadValue {
        kind: &'static str,
        value: serde_json::Value,
    },

    #[error("unrecognized frame type: {0}")]
    UnknownType(String),
}

impl From<FrameError> for ChatStatusError {
    fn from(e: FrameError) -> Self {
        ChatStatusError::Protocol(e.to_string())
    }
}

#[derive(Deserialize)]
struct InboundWire {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    value: serde_json::Value,
}

impl InboundFrame {
    /// Parse one text frame from the relay.
    ///
    /// Extra fields (such as `room_id`) are ignored.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        if text.trim().is_empty() {
            return Ok(InboundFrame::Keepalive);
        }

        let wire: InboundWire = serde_json::from_str(text)?;

        let kind = match wire.kind.as_str() {
            kinds::PING => return Ok(InboundFrame::Keepalive),
            kinds::ACTIVE => kinds::ACTIVE,
            kinds::POSITION => kinds::POSITION,
            kinds::TYPING => kinds::TYPING,
            kinds::QUIT => kinds::QUIT,
            _ => return Err(FrameError::UnknownType(wire.kind)),
        };

        let user_id = wire.user_id.ok_or(FrameError::MissingUser(kind))?;
        let bad_value = |value: serde_json::Value| FrameError::BadValue { kind, value };

        match kind {
            kinds::ACTIVE => {
                let active = parse_flag(&wire.value).ok_or_else(|| bad_value(wire.value))?;
                Ok(InboundFrame::Active { user_id, active })
            }
            kinds::POSITION => {
                let id = wire.value.as_u64().ok_or_else(|| bad_value(wire.value))?;
                Ok(InboundFrame::Position {
                    user_id,
                    message_id: MessageId(id),
                })
            }
            kinds::TYPING => {
                let timestamp = wire.value.as_i64().ok_or_else(|| bad_value(wire.value))?;
                Ok(InboundFrame::Typing { user_id, timestamp })
            }
            _ => Ok(InboundFrame::Quit { user_id }),
        }
    }

    /// The user this frame is about, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            InboundFrame::Keepalive => None,
            InboundFrame::Active { user_id, .. }
            | InboundFrame::Position { user_id, .. }
            | InboundFrame::Typing { user_id, .. }
            | InboundFrame::Quit { user_id } => Some(user_id),
        }
    }
}

/// `active` arrives as 0/1 from clients and as a boolean in relay replays.
fn parse_flag(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}
