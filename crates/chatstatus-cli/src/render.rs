//! Text rendering of presence changes.

use chatstatus_client::PresenceChange;

pub fn describe(change: &PresenceChange) -> String {
    match change {
        PresenceChange::Connection { open: true } => "* connected".to_string(),
        PresenceChange::Connection { open: false } => "* disconnected".to_string(),
        PresenceChange::Active { user_id, active } => {
            let state = if *active { "active" } else { "idle" };
            format!("{user_id} is {state}")
        }
        PresenceChange::Typing {
            user_id,
            typing: true,
        } => format!("{user_id} is typing..."),
        PresenceChange::Typing {
            user_id,
            typing: false,
        } => format!("{user_id} stopped typing"),
        PresenceChange::Position {
            user_id,
            message_id,
        } => format!("{user_id} has read this far: #{message_id}"),
        PresenceChange::PositionPending {
            user_id,
            message_id,
        } => format!("{user_id} has read #{message_id} (not loaded yet)"),
        PresenceChange::Removed { user_id } => format!("{user_id} left"),
        PresenceChange::SelfVisibility { visible: true } => "* showing you".to_string(),
        PresenceChange::SelfVisibility { visible: false } => "* hiding you".to_string(),
        PresenceChange::Notice(text) => format!("! {text}"),
    }
}
