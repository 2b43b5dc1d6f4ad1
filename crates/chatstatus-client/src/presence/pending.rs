//! Read positions that name messages the feed has not rendered yet.
//!
//! Position notifications and feed renders arrive on independent streams.
//! When a peer reports reading a message before that message shows up in the
//! local feed, the placement is parked here until [`PendingResolver::resolve`]
//! is called for that message.
//!
//! There is a single entry per message. A user belongs to at most one entry:
//! re-associating a user moves them, it never stacks.

use std::collections::{BTreeSet, HashMap};

use chatstatus_common::{MessageId, UserId};

#[derive(Debug, Clone, Default)]
pub struct PendingResolver {
    by_message: HashMap<MessageId, BTreeSet<UserId>>,
    by_user: HashMap<UserId, MessageId>,
}

impl PendingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `user_id`'s placement under `message_id`.
    ///
    /// Returns `false` if the user was already parked there.
    pub fn associate(&mut self, message_id: MessageId, user_id: UserId) -> bool {
        if self.by_user.get(&user_id) == Some(&message_id) {
            return false;
        }
        self.forget(&user_id);
        self.by_message
            .entry(message_id)
            .or_default()
            .insert(user_id.clone());
        self.by_user.insert(user_id, message_id);
        true
    }

    /// Consume the entry for `message_id`, returning the users parked on it
    /// (in id order). Empty if nothing was pending.
    pub fn resolve(&mut self, message_id: MessageId) -> Vec<UserId> {
        let Some(users) = self.by_message.remove(&message_id) else {
            return Vec::new();
        };
        for user in &users {
            self.by_user.remove(user);
        }
        users.into_iter().collect()
    }

    /// Drop whatever placement `user_id` has parked.
    pub fn forget(&mut self, user_id: &UserId) -> Option<MessageId> {
        let message_id = self.by_user.remove(user_id)?;
        if let Some(users) = self.by_message.get_mut(&message_id) {
            users.remove(user_id);
            if users.is_empty() {
                self.by_message.remove(&message_id);
            }
        }
        Some(message_id)
    }

    pub fn pending_for(&self, user_id: &UserId) -> Option<MessageId> {
        self.by_user.get(user_id).copied()
    }

    pub fn is_pending(&self, message_id: MessageId) -> bool {
        self.by_message.contains_key(&message_id)
    }

    /// Number of messages with parked placements.
    pub fn len(&self) -> usize {
        self.by_message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_message.is_empty()
    }
}
