//! Remote user state and the change notifications emitted for renderers.

use chatstatus_common::{MessageId, UserId};

// ---------------------------------------------------------------------------
// Remote user
// ---------------------------------------------------------------------------

/// What this client knows about one remote user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub user_id: UserId,
    /// Input focus state; `None` until the first signal.
    pub active: Option<bool>,
    /// Mirrors whether a typing timer is armed for this user.
    pub typing: bool,
    /// Last message the user reported reading.
    pub last_read: Option<MessageId>,
}

impl RemoteUser {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            active: None,
            typing: false,
            last_read: None,
        }
    }

    /// Treats an unknown focus state as inactive.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// What a per-user timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    TypingExpiry,
}

/// Key of a per-user timer. At most one timer exists per key.
pub type TimerKey = (UserId, TimerPurpose);

// ---------------------------------------------------------------------------
// Changes
// ---------------------------------------------------------------------------

/// Fire-and-forget notifications for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    /// Relay connection opened or closed.
    Connection { open: bool },
    /// A user's focus state changed.
    Active { user_id: UserId, active: bool },
    /// A user started or stopped typing.
    Typing { user_id: UserId, typing: bool },
    /// A user's read indicator belongs under this message, which is known.
    Position {
        user_id: UserId,
        message_id: MessageId,
    },
    /// A user read a message that has not reached the feed yet. The
    /// indicator stays detached until the message arrives.
    PositionPending {
        user_id: UserId,
        message_id: MessageId,
    },
    /// A user left; drop every trace of them.
    Removed { user_id: UserId },
    /// Whether the local user's own indicator should be shown.
    SelfVisibility { visible: bool },
    /// One-off message for the user.
    Notice(String),
}

impl PresenceChange {
    /// The user this change is about, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            PresenceChange::Active { user_id, .. }
            | PresenceChange::Typing { user_id, .. }
            | PresenceChange::Position { user_id, .. }
            | PresenceChange::PositionPending { user_id, .. }
            | PresenceChange::Removed { user_id } => Some(user_id),
            PresenceChange::Connection { .. }
            | PresenceChange::SelfVisibility { .. }
            | PresenceChange::Notice(_) => None,
        }
    }
}
