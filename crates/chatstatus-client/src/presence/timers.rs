//! Keyed deadline table.
//!
//! Each key owns at most one deadline. Arming an armed key replaces its
//! deadline, so a stale deadline can never fire after a newer one was set.
//! The table never sleeps itself; the dispatcher asks for
//! [`Timers::next_deadline`] and calls [`Timers::take_expired`] when it
//! passes.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Timers<K> {
    deadlines: HashMap<K, Instant>,
}

impl<K: Clone + Eq + Hash> Timers<K> {
    pub fn new() -> Self {
        Self {
            deadlines: HashMap::new(),
        }
    }

    /// Cancel any existing deadline for `key` and schedule a new one.
    /// Returns `true` if a previous deadline was replaced.
    pub fn arm(&mut self, key: K, deadline: Instant) -> bool {
        self.deadlines.insert(key, deadline).is_some()
    }

    /// Returns `true` if a deadline was cancelled.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_expired(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(K, Instant)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(k, at)| (k.clone(), *at))
            .collect();
        due.sort_by_key(|(_, at)| *at);
        for (key, _) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(k, _)| k).collect()
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

impl<K: Clone + Eq + Hash> Default for Timers<K> {
    fn default() -> Self {
        Self::new()
    }
}
