//! Event payloads and their wire framing.

pub mod frame;
pub mod types;

pub use frame::{FrameKind, StreamFrame};
pub use types::{NotificationEvent, UnreadCount};
