//! Presence state: per-user records, typing expiry, and deferred read
//! placements.
//!
//! The store is plain data driven by explicit timestamps. It is owned by the
//! controller and has no knowledge of the transport.

mod pending;
mod store;
mod timers;
mod types;

#[cfg(test)]
mod tests;

pub use pending::PendingResolver;
pub use store::{PresenceStore, TYPING_WINDOW};
pub use timers::Timers;
pub use types::{PresenceChange, RemoteUser, TimerKey, TimerPurpose};
