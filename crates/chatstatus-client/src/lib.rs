pub mod clock;
pub mod controller;
pub mod presence;
pub mod protocol;
pub mod session;
pub mod throttle;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use controller::{
    ControllerAction, ControllerConfig, FeedMessage, LocalSignal, PresenceController,
};
pub use presence::{PendingResolver, PresenceChange, PresenceStore, RemoteUser, TYPING_WINDOW};
pub use protocol::{FrameError, InboundFrame, OutboundFrame};
pub use session::{FrameSink, PresenceSession};
pub use throttle::{RunOnce, Throttle};
pub use transport::{ConnectionState, TransportClient, TransportConfig, TransportEvent};
