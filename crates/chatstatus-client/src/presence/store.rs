//! Authoritative presence state for every known remote user.
//!
//! The store knows nothing about sockets or rendering. Mutations record
//! [`PresenceChange`]s which the owner drains with
//! [`PresenceStore::take_changes`]. Every mutation is idempotent: repeating
//! the same input produces no further changes.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use chatstatus_common::{MessageId, UserId};
use tracing::debug;

use super::pending::PendingResolver;
use super::timers::Timers;
use super::types::{PresenceChange, RemoteUser, TimerKey, TimerPurpose};

/// How long a single typing signal keeps a user marked as typing.
pub const TYPING_WINDOW: Duration = Duration::from_secs(4);

#[derive(Debug)]
pub struct PresenceStore {
    users: HashMap<UserId, RemoteUser>,
    /// Messages the local feed has reported.
    known: BTreeSet<MessageId>,
    pending: PendingResolver,
    timers: Timers<TimerKey>,
    typing_window: Duration,
    changes: Vec<PresenceChange>,
}

impl PresenceStore {
    pub fn new() -> Self {
        Self::with_typing_window(TYPING_WINDOW)
    }

    pub fn with_typing_window(typing_window: Duration) -> Self {
        Self {
            users: HashMap::new(),
            known: BTreeSet::new(),
            pending: PendingResolver::new(),
            timers: Timers::new(),
            typing_window,
            changes: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Look up a user, creating a default record on first access.
    pub fn get_or_create(&mut self, user_id: &UserId) -> &mut RemoteUser {
        self.users
            .entry(user_id.clone())
            .or_insert_with(|| RemoteUser::new(user_id.clone()))
    }

    pub fn get(&self, user_id: &UserId) -> Option<&RemoteUser> {
        self.users.get(user_id)
    }

    /// Erase everything about a user: record, typing timer, and any parked
    /// placement.
    pub fn remove(&mut self, user_id: &UserId) {
        if self.users.remove(user_id).is_none() {
            return;
        }
        self.timers
            .cancel(&(user_id.clone(), TimerPurpose::TypingExpiry));
        self.pending.forget(user_id);
        debug!(user = %user_id, "Removed user");
        self.changes.push(PresenceChange::Removed {
            user_id: user_id.clone(),
        });
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub fn set_active(&mut self, user_id: &UserId, active: bool) {
        let user = self.get_or_create(user_id);
        if user.active == Some(active) {
            return;
        }
        user.active = Some(active);
        self.changes.push(PresenceChange::Active {
            user_id: user_id.clone(),
            active,
        });
    }

    /// Start, refresh, or stop a user's typing state.
    ///
    /// A `true` signal cancels any armed expiry and arms a fresh one, so the
    /// user stays typing without a gap as long as signals keep coming.
    pub fn set_typing(&mut self, user_id: &UserId, is_typing: bool, now: Instant) {
        let key = (user_id.clone(), TimerPurpose::TypingExpiry);
        if is_typing {
            self.timers.arm(key, now + self.typing_window);
        } else {
            self.timers.cancel(&key);
        }

        let user = self.get_or_create(user_id);
        if user.typing == is_typing {
            return;
        }
        user.typing = is_typing;
        self.changes.push(PresenceChange::Typing {
            user_id: user_id.clone(),
            typing: is_typing,
        });
    }

    /// Record the last message a user has read.
    ///
    /// A position also means the user is active. Position zero means "nothing
    /// read yet" and carries no placement. A position older than the one
    /// already recorded is ignored.
    pub fn set_position(&mut self, user_id: &UserId, message_id: MessageId) {
        self.set_active(user_id, true);
        if message_id.is_none() {
            return;
        }

        let user = self.get_or_create(user_id);
        match user.last_read {
            Some(current) if current == message_id => return,
            Some(current) if current > message_id => {
                debug!(
                    user = %user_id,
                    current = %current,
                    received = %message_id,
                    "Ignoring position regression"
                );
                return;
            }
            _ => {}
        }
        user.last_read = Some(message_id);

        if self.known.contains(&message_id) {
            self.pending.forget(user_id);
            self.changes.push(PresenceChange::Position {
                user_id: user_id.clone(),
                message_id,
            });
        } else {
            self.pending.associate(message_id, user_id.clone());
            self.changes.push(PresenceChange::PositionPending {
                user_id: user_id.clone(),
                message_id,
            });
        }
    }

    /// The feed now contains `message_id`. Place every user parked on it.
    pub fn resolve(&mut self, message_id: MessageId) {
        if !self.known.insert(message_id) {
            return;
        }
        for user_id in self.pending.resolve(message_id) {
            let still_there = self
                .users
                .get(&user_id)
                .is_some_and(|u| u.last_read == Some(message_id));
            if still_there {
                self.changes.push(PresenceChange::Position {
                    user_id,
                    message_id,
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Fire every typing expiry due at `now`.
    pub fn expire(&mut self, now: Instant) {
        for (user_id, purpose) in self.timers.take_expired(now) {
            match purpose {
                TimerPurpose::TypingExpiry => {
                    if let Some(user) = self.users.get_mut(&user_id) {
                        if user.typing {
                            user.typing = false;
                            self.changes.push(PresenceChange::Typing {
                                user_id,
                                typing: false,
                            });
                        }
                    }
                }
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Whether the user's typing window is still open at `now`, regardless
    /// of whether [`expire`](Self::expire) has run yet.
    pub fn is_typing(&self, user_id: &UserId, now: Instant) -> bool {
        self.timers
            .deadline(&(user_id.clone(), TimerPurpose::TypingExpiry))
            .is_some_and(|deadline| now < deadline)
    }

    pub fn is_known(&self, message_id: MessageId) -> bool {
        self.known.contains(&message_id)
    }

    pub fn pending(&self) -> &PendingResolver {
        &self.pending
    }

    /// Drain the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<PresenceChange> {
        std::mem::take(&mut self.changes)
    }
}

impl Default for PresenceStore {
    fn default() -> Self {
        Self::new()
    }
}
