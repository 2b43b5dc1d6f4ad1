use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, server-assigned identifier of a chat user.
///
/// The relay may encode user ids as JSON strings or integers; both forms
/// normalize to the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of a chat room, used only to address the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for UserId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<RawId> for RoomId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => Self(s),
            RawId::Number(n) => Self(n.to_string()),
        }
    }
}

/// Position of a message in the feed. Only the total order is meaningful.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    /// The "nothing read yet" position. Never names a real message.
    pub const NONE: MessageId = MessageId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_from_string_and_number_match() {
        let a: UserId = serde_json::from_str("\"42\"").unwrap();
        let b: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "42");
    }

    #[test]
    fn user_id_serializes_as_string() {
        let id = UserId::new("7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
    }

    #[test]
    fn user_id_display() {
        let id = UserId::from("alice");
        assert_eq!(id.to_string(), "alice");
    }

    #[test]
    fn user_id_rejects_other_json() {
        assert!(serde_json::from_str::<UserId>("true").is_err());
        assert!(serde_json::from_str::<UserId>("null").is_err());
    }

    #[test]
    fn room_id_from_number() {
        let room: RoomId = serde_json::from_str("201").unwrap();
        assert_eq!(room.as_str(), "201");
        assert_eq!(room.to_string(), "201");
    }

    #[test]
    fn message_id_ordering() {
        assert!(MessageId(5) > MessageId(3));
        assert!(MessageId::NONE < MessageId(1));
        assert!(MessageId::NONE.is_none());
        assert!(!MessageId(1).is_none());
    }

    #[test]
    fn message_id_is_transparent() {
        let id: MessageId = serde_json::from_str("12345").unwrap();
        assert_eq!(id, MessageId(12345));
        assert_eq!(serde_json::to_string(&id).unwrap(), "12345");
    }
}
