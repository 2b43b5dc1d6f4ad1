//! Orchestration between the relay, the local feed, and the presence store.

mod engine;
mod types;


pub use engine::PresenceController;
pub use types::{
    ControllerAction, ControllerConfig, FeedMessage, LocalSignal, TYPING_THROTTLE,
};
