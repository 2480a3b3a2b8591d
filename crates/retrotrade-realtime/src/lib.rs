//! # retrotrade-realtime
//!
//! Server-Sent-Events notification delivery core for RetroTrade. Provides:
//!
//! - Stream session lifecycle (authenticate, confirm, register, snapshot, heartbeat, teardown)
//! - A thread-safe connection registry keyed by user with lazy cleanup on broadcast
//! - The `data:` / comment wire framing
//! - Notification store implementations (in-memory and backend HTTP)
//! - Fan-out bridges (in-process, and Redis pub/sub for multi-process deployments)
//! - Delivery metrics

pub mod bridge;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod server;
pub mod store;
pub mod stream;

pub use bridge::{FanOut, PublishReceipt};
pub use connection::authenticator::{StreamAuthenticator, StreamCredential};
pub use connection::manager::{ConnectionManager, DeliveryReport};
pub use message::types::NotificationEvent;
pub use server::RealtimeEngine;
pub use store::build_store;
pub use stream::opener::{OpenedStream, StreamOpener};
