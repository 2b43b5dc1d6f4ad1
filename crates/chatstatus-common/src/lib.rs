pub mod errors;
pub mod id;

pub use errors::{ChatStatusError, ConfigError};
pub use id::{MessageId, RoomId, UserId};

pub type Result<T> = std::result::Result<T, ChatStatusError>;
