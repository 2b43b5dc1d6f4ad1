//! Inputs and outputs of the presence controller.

use std::time::Duration;

use chatstatus_common::{MessageId, UserId};

use crate::presence::{PresenceChange, TYPING_WINDOW};
use crate::protocol::OutboundFrame;

/// Minimum spacing between two outbound `typing` frames.
pub const TYPING_THROTTLE: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// The local user.
    pub self_id: UserId,
    /// Whether changes about the local user reach the renderer.
    pub show_self: bool,
    pub typing_throttle: Duration,
    pub typing_window: Duration,
    /// Relay host, named in user-visible notices.
    pub server: String,
}

impl ControllerConfig {
    pub fn new(self_id: UserId, server: impl Into<String>) -> Self {
        Self {
            self_id,
            show_self: true,
            typing_throttle: TYPING_THROTTLE,
            typing_window: TYPING_WINDOW,
            server: server.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Local signals
// ---------------------------------------------------------------------------

/// A message the local feed rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMessage {
    pub id: MessageId,
    pub author: UserId,
}

impl FeedMessage {
    pub fn new(id: MessageId, author: UserId) -> Self {
        Self { id, author }
    }
}

/// Signals from the host page's collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSignal {
    /// The feed's initial batch. Never advances the read position.
    FeedLoaded { messages: Vec<FeedMessage> },
    /// A message arrived live.
    MessageAdded(FeedMessage),
    /// Input focus gained (`true`) or lost (`false`).
    FocusChanged(bool),
    /// One raw keystroke in the input box.
    Keystroke,
    /// The "show me" preference was toggled.
    SetShowSelf(bool),
    /// A collaborator (such as the feed observer) failed to load.
    CollaboratorFailed { name: String },
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// What the driver must do after the controller handled an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerAction {
    /// Hand a frame to the transport.
    Send(OutboundFrame),
    /// Deliver a change to the renderer.
    Notify(PresenceChange),
}
