//! Tests for the presence store and its interaction with the resolver.

use std::time::{Duration, Instant};

use chatstatus_common::{MessageId, UserId};

use super::*;

fn uid(s: &str) -> UserId {
    UserId::new(s)
}

fn typing_changes(changes: &[PresenceChange]) -> Vec<bool> {
    changes
        .iter()
        .filter_map(|c| match c {
            PresenceChange::Typing { typing, .. } => Some(*typing),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn get_or_create_starts_with_defaults() {
    let mut store = PresenceStore::new();
    let user = store.get_or_create(&uid("1"));
    assert_eq!(user.active, None);
    assert!(!user.typing);
    assert_eq!(user.last_read, None);
    assert!(!user.is_active());
    assert!(store.take_changes().is_empty());
}

#[test]
fn remove_erases_all_state() {
    let t0 = Instant::now();
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_active(&u, true);
    store.set_typing(&u, true, t0);
    store.set_position(&u, MessageId(10));
    store.take_changes();

    store.remove(&u);
    assert_eq!(
        store.take_changes(),
        vec![PresenceChange::Removed { user_id: u.clone() }]
    );
    assert!(store.get(&u).is_none());
    assert!(store.next_deadline().is_none());
    assert!(store.pending().is_empty());

    let fresh = store.get_or_create(&u).clone();
    assert_eq!(fresh, RemoteUser::new(u.clone()));
    assert!(!store.is_typing(&u, t0));
}

#[test]
fn remove_unknown_user_is_noop() {
    let mut store = PresenceStore::new();
    store.remove(&uid("ghost"));
    assert!(store.take_changes().is_empty());
}

// ---------------------------------------------------------------------------
// Active
// ---------------------------------------------------------------------------

#[test]
fn set_active_notifies_only_on_change() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_active(&u, false);
    store.set_active(&u, false);
    store.set_active(&u, true);
    store.set_active(&u, true);
    assert_eq!(
        store.take_changes(),
        vec![
            PresenceChange::Active {
                user_id: u.clone(),
                active: false
            },
            PresenceChange::Active {
                user_id: u,
                active: true
            },
        ]
    );
}

// ---------------------------------------------------------------------------
// Typing
// ---------------------------------------------------------------------------

#[test]
fn typing_signals_under_window_never_flicker() {
    let t0 = Instant::now();
    let mut store = PresenceStore::new();
    let u = uid("1");

    let mut now = t0;
    for _ in 0..10 {
        store.set_typing(&u, true, now);
        // Check just before the next signal lands.
        let at = now + Duration::from_millis(3_900);
        store.expire(at);
        assert!(store.is_typing(&u, at));
        now += Duration::from_millis(3_900);
    }

    assert_eq!(typing_changes(&store.take_changes()), vec![true]);
}

#[test]
fn typing_expires_at_window_and_not_before() {
    let t0 = Instant::now();
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_typing(&u, true, t0);
    store.take_changes();

    let just_before = t0 + TYPING_WINDOW - Duration::from_millis(1);
    store.expire(just_before);
    assert!(store.is_typing(&u, just_before));
    assert!(store.get(&u).unwrap().typing);
    assert!(store.take_changes().is_empty());

    assert_eq!(store.next_deadline(), Some(t0 + TYPING_WINDOW));
    store.expire(t0 + TYPING_WINDOW);
    assert!(!store.is_typing(&u, t0 + TYPING_WINDOW));
    assert!(!store.get(&u).unwrap().typing);
    assert_eq!(typing_changes(&store.take_changes()), vec![false]);
    assert!(store.next_deadline().is_none());
}

#[test]
fn newer_signal_outlives_older_timer() {
    let t0 = Instant::now();
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_typing(&u, true, t0);
    store.set_typing(&u, true, t0 + Duration::from_secs(3));

    // The first signal's deadline has passed but was replaced.
    store.expire(t0 + Duration::from_secs(5));
    assert!(store.get(&u).unwrap().typing);
    store.expire(t0 + Duration::from_secs(7));
    assert!(!store.get(&u).unwrap().typing);
}

#[test]
fn explicit_stop_cancels_timer() {
    let t0 = Instant::now();
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_typing(&u, true, t0);
    store.set_typing(&u, false, t0 + Duration::from_secs(1));
    assert!(store.next_deadline().is_none());
    assert!(!store.is_typing(&u, t0 + Duration::from_secs(1)));

    store.expire(t0 + Duration::from_secs(10));
    assert_eq!(typing_changes(&store.take_changes()), vec![true, false]);
}

#[test]
fn stopping_idle_user_is_silent() {
    let mut store = PresenceStore::new();
    store.set_typing(&uid("1"), false, Instant::now());
    assert!(store.take_changes().is_empty());
}

#[test]
fn custom_typing_window() {
    let t0 = Instant::now();
    let mut store = PresenceStore::with_typing_window(Duration::from_secs(1));
    store.set_typing(&uid("1"), true, t0);
    assert_eq!(store.next_deadline(), Some(t0 + Duration::from_secs(1)));
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

#[test]
fn position_on_known_message_places_immediately() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.resolve(MessageId(5));
    store.set_position(&u, MessageId(5));

    let changes = store.take_changes();
    assert!(changes.contains(&PresenceChange::Position {
        user_id: u.clone(),
        message_id: MessageId(5),
    }));
    assert_eq!(store.get(&u).unwrap().last_read, Some(MessageId(5)));
}

#[test]
fn position_implies_active() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_active(&u, false);
    store.set_position(&u, MessageId(3));
    assert!(store.get(&u).unwrap().is_active());
}

#[test]
fn repeated_position_is_idempotent() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.resolve(MessageId(5));
    store.set_position(&u, MessageId(5));
    let first = store.take_changes();
    store.set_position(&u, MessageId(5));
    assert!(store.take_changes().is_empty());

    let placements = first
        .iter()
        .filter(|c| matches!(c, PresenceChange::Position { .. }))
        .count();
    assert_eq!(placements, 1);
}

#[test]
fn repeated_pending_position_is_idempotent() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_position(&u, MessageId(8));
    store.take_changes();
    store.set_position(&u, MessageId(8));
    assert!(store.take_changes().is_empty());
    assert_eq!(store.pending().len(), 1);
}

#[test]
fn position_zero_is_not_a_placement() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_position(&u, MessageId::NONE);
    assert_eq!(store.get(&u).unwrap().last_read, None);
    assert!(store.pending().is_empty());
    assert_eq!(
        store.take_changes(),
        vec![PresenceChange::Active {
            user_id: u,
            active: true
        }]
    );
}

#[test]
fn position_regression_is_ignored() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.resolve(MessageId(3));
    store.resolve(MessageId(7));
    store.set_position(&u, MessageId(7));
    store.take_changes();

    store.set_position(&u, MessageId(3));
    assert_eq!(store.get(&u).unwrap().last_read, Some(MessageId(7)));
    assert!(store.take_changes().is_empty());
}

#[test]
fn associate_then_resolve_matches_direct_placement() {
    let u = uid("42");

    // Message arrives first.
    let mut direct = PresenceStore::new();
    direct.resolve(MessageId(5));
    direct.set_position(&u, MessageId(5));
    let direct_placements: Vec<_> = direct
        .take_changes()
        .into_iter()
        .filter(|c| matches!(c, PresenceChange::Position { .. }))
        .collect();

    // Position arrives first.
    let mut deferred = PresenceStore::new();
    deferred.set_position(&u, MessageId(5));
    let parked = deferred.take_changes();
    assert!(parked.contains(&PresenceChange::PositionPending {
        user_id: u.clone(),
        message_id: MessageId(5),
    }));
    assert!(!parked
        .iter()
        .any(|c| matches!(c, PresenceChange::Position { .. })));
    deferred.resolve(MessageId(5));
    let deferred_placements = deferred.take_changes();

    assert_eq!(direct_placements, deferred_placements);
    assert_eq!(
        direct.get(&u).unwrap().last_read,
        deferred.get(&u).unwrap().last_read
    );
    assert!(deferred.pending().is_empty());
}

#[test]
fn resolve_places_each_parked_user() {
    let mut store = PresenceStore::new();
    store.set_position(&uid("a"), MessageId(9));
    store.set_position(&uid("b"), MessageId(9));
    store.take_changes();

    store.resolve(MessageId(9));
    assert_eq!(
        store.take_changes(),
        vec![
            PresenceChange::Position {
                user_id: uid("a"),
                message_id: MessageId(9)
            },
            PresenceChange::Position {
                user_id: uid("b"),
                message_id: MessageId(9)
            },
        ]
    );

    // Resolving again does nothing.
    store.resolve(MessageId(9));
    assert!(store.take_changes().is_empty());
}

#[test]
fn moving_on_before_resolution_drops_old_placement() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_position(&u, MessageId(5));
    store.resolve(MessageId(6));
    store.set_position(&u, MessageId(6));
    store.take_changes();

    store.resolve(MessageId(5));
    assert!(store.take_changes().is_empty());
    assert_eq!(store.get(&u).unwrap().last_read, Some(MessageId(6)));
}

#[test]
fn quit_while_pending_discards_placement() {
    let mut store = PresenceStore::new();
    let u = uid("1");
    store.set_position(&u, MessageId(5));
    store.remove(&u);
    store.take_changes();

    store.resolve(MessageId(5));
    assert!(store.take_changes().is_empty());
    assert!(store.get(&u).is_none());
}
