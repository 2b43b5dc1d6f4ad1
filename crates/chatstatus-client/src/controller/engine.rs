//! Presence policy: wires relay frames and local signals to the store and
//! to outbound frames.

use std::time::Instant;

use chatstatus_common::{MessageId, UserId};
use tracing::{debug, info, warn};

use super::types::{ControllerAction, ControllerConfig, FeedMessage, LocalSignal};
use crate::clock::Clock;
use crate::presence::{PresenceChange, PresenceStore};
use crate::protocol::{InboundFrame, OutboundFrame};
use crate::throttle::{RunOnce, Throttle};
use crate::transport::TransportEvent;

/// Sans-IO presence controller for one session.
///
/// Every input returns the actions the driver must perform, in order. The
/// controller never touches the socket and reads time only through its
/// [`Clock`].
#[derive(Debug)]
pub struct PresenceController<C: Clock> {
    config: ControllerConfig,
    clock: C,
    store: PresenceStore,
    /// Whether the local input box has focus.
    window_active: bool,
    /// Highest message the feed has reported.
    last_message_id: MessageId,
    /// Highest message the local user has acknowledged. Never exceeds
    /// `last_message_id`.
    last_message_read_id: MessageId,
    connected: bool,
    typing_throttle: Throttle,
    load_failure_notice: RunOnce,
}

impl<C: Clock> PresenceController<C> {
    pub fn new(config: ControllerConfig, clock: C) -> Self {
        let store = PresenceStore::with_typing_window(config.typing_window);
        let typing_throttle = Throttle::new(config.typing_throttle);
        Self {
            config,
            clock,
            store,
            window_active: true,
            last_message_id: MessageId::NONE,
            last_message_read_id: MessageId::NONE,
            connected: false,
            typing_throttle,
            load_failure_notice: RunOnce::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    pub fn on_transport(&mut self, event: TransportEvent) -> Vec<ControllerAction> {
        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Frame(frame) => self.on_frame(frame),
            TransportEvent::Error(error) => {
                debug!(error = %error, "Transport error");
                Vec::new()
            }
            TransportEvent::Closed => {
                self.connected = false;
                vec![ControllerAction::Notify(PresenceChange::Connection {
                    open: false,
                })]
            }
        }
    }

    /// Re-announce our state so peers recover anything lost while we were
    /// away.
    fn on_open(&mut self) -> Vec<ControllerAction> {
        self.connected = true;
        // A typing frame from the old socket may never have reached the relay.
        self.typing_throttle.reset();
        info!(
            active = self.window_active,
            last_read = %self.last_message_read_id,
            "Re-syncing presence"
        );
        let mut actions = vec![
            ControllerAction::Notify(PresenceChange::Connection { open: true }),
            ControllerAction::Send(OutboundFrame::Active(self.window_active)),
        ];
        if !self.last_message_read_id.is_none() {
            actions.push(ControllerAction::Send(OutboundFrame::Position(
                self.last_message_read_id,
            )));
        }
        actions
    }

    /// Apply one relay frame to the store.
    pub fn on_frame(&mut self, frame: InboundFrame) -> Vec<ControllerAction> {
        let now = self.clock.now();
        match frame {
            InboundFrame::Keepalive => {}
            InboundFrame::Active { user_id, active } => {
                self.store.set_active(&user_id, active);
            }
            InboundFrame::Position {
                user_id,
                message_id,
            } => {
                self.store.set_position(&user_id, message_id);
            }
            InboundFrame::Typing { user_id, timestamp } => {
                if self.typing_is_fresh(timestamp) {
                    self.store.set_typing(&user_id, true, now);
                } else {
                    debug!(user = %user_id, timestamp, "Ignoring stale typing signal");
                }
            }
            InboundFrame::Quit { user_id } => {
                self.store.remove(&user_id);
            }
        }
        self.drain_changes()
    }

    /// A typing signal counts only if it was sent within the typing window
    /// of our wall clock. Replays of old signals fail this check. The
    /// timestamp comes off the wire, so the age saturates instead of
    /// overflowing.
    fn typing_is_fresh(&self, timestamp: i64) -> bool {
        let window = i64::try_from(self.config.typing_window.as_secs()).unwrap_or(i64::MAX);
        self.clock.unix_time().saturating_sub(timestamp) < window
    }

    // -----------------------------------------------------------------------
    // Local signals
    // -----------------------------------------------------------------------

    pub fn on_local(&mut self, signal: LocalSignal) -> Vec<ControllerAction> {
        match signal {
            LocalSignal::FeedLoaded { messages } => {
                self.on_feed_loaded(&messages);
                self.drain_changes()
            }
            LocalSignal::MessageAdded(message) => self.on_message_added(message),
            LocalSignal::FocusChanged(true) => self.on_focus_gained(),
            LocalSignal::FocusChanged(false) => self.on_focus_lost(),
            LocalSignal::Keystroke => self.on_keystroke(),
            LocalSignal::SetShowSelf(visible) => self.set_show_self(visible),
            LocalSignal::CollaboratorFailed { name } => self.on_collaborator_failed(&name),
        }
    }

    fn on_feed_loaded(&mut self, messages: &[FeedMessage]) {
        for message in messages {
            self.store.resolve(message.id);
            self.last_message_id = self.last_message_id.max(message.id);
        }
        debug!(
            count = messages.len(),
            last_message = %self.last_message_id,
            "Feed loaded"
        );
    }

    fn on_message_added(&mut self, message: FeedMessage) -> Vec<ControllerAction> {
        let now = self.clock.now();
        self.store.resolve(message.id);
        // A posted message means its author stopped typing.
        self.store.set_typing(&message.author, false, now);
        self.last_message_id = self.last_message_id.max(message.id);

        let mut actions = self.drain_changes();
        if self.window_active {
            actions.extend(self.advance_read_position());
        }
        actions
    }

    fn on_focus_gained(&mut self) -> Vec<ControllerAction> {
        if self.window_active {
            return Vec::new();
        }
        debug!("Window has gained focus");
        self.window_active = true;
        let mut actions = vec![ControllerAction::Send(OutboundFrame::Active(true))];
        actions.extend(self.advance_read_position());
        actions
    }

    fn on_focus_lost(&mut self) -> Vec<ControllerAction> {
        if !self.window_active {
            return Vec::new();
        }
        debug!("Window has lost focus");
        self.window_active = false;
        vec![ControllerAction::Send(OutboundFrame::Active(false))]
    }

    fn on_keystroke(&mut self) -> Vec<ControllerAction> {
        if !self.connected {
            return Vec::new();
        }
        if !self.typing_throttle.ready(self.clock.now()) {
            return Vec::new();
        }
        let timestamp = self.clock.unix_time();
        debug!(timestamp, "last_char_entered");
        vec![ControllerAction::Send(OutboundFrame::Typing(timestamp))]
    }

    fn set_show_self(&mut self, visible: bool) -> Vec<ControllerAction> {
        if self.config.show_self == visible {
            return Vec::new();
        }
        self.config.show_self = visible;
        vec![ControllerAction::Notify(PresenceChange::SelfVisibility {
            visible,
        })]
    }

    fn on_collaborator_failed(&mut self, name: &str) -> Vec<ControllerAction> {
        warn!(asset = %name, server = %self.config.server, "Collaborator failed to load");
        if !self.load_failure_notice.run() {
            return Vec::new();
        }
        vec![ControllerAction::Notify(PresenceChange::Notice(format!(
            "Unable to load {name} from {}.",
            self.config.server
        )))]
    }

    /// Catch the read position up to the newest message, if behind.
    fn advance_read_position(&mut self) -> Option<ControllerAction> {
        if self.last_message_id <= self.last_message_read_id {
            return None;
        }
        self.last_message_read_id = self.last_message_id;
        debug!(last_message_read = %self.last_message_read_id, "Advancing read position");
        Some(ControllerAction::Send(OutboundFrame::Position(
            self.last_message_read_id,
        )))
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Fire every timer due now.
    pub fn on_tick(&mut self) -> Vec<ControllerAction> {
        self.store.expire(self.clock.now());
        self.drain_changes()
    }

    /// When the driver should next call [`on_tick`](Self::on_tick).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.store.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn store(&self) -> &PresenceStore {
        &self.store
    }

    pub fn self_id(&self) -> &UserId {
        &self.config.self_id
    }

    pub fn show_self(&self) -> bool {
        self.config.show_self
    }

    pub fn window_active(&self) -> bool {
        self.window_active
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn last_message_id(&self) -> MessageId {
        self.last_message_id
    }

    pub fn last_message_read_id(&self) -> MessageId {
        self.last_message_read_id
    }

    /// Turn store changes into notifications, hiding our own indicator when
    /// `show_self` is off.
    fn drain_changes(&mut self) -> Vec<ControllerAction> {
        let show_self = self.config.show_self;
        let self_id = &self.config.self_id;
        self.store
            .take_changes()
            .into_iter()
            .filter(|change| show_self || change.user_id() != Some(self_id))
            .map(ControllerAction::Notify)
            .collect()
    }
}
