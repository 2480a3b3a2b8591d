//! Fan-out bridges: how a published event reaches the sessions of its user.

pub mod local;
pub mod redis_pubsub;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use retrotrade_core::result::AppResult;
use retrotrade_core::types::UserId;

use crate::connection::manager::DeliveryReport;
use crate::message::types::NotificationEvent;

pub use local::LocalFanOut;
pub use redis_pubsub::{NotificationEnvelope, RedisFanOut};

/// What happened to a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishReceipt {
    /// Delivered into this process's registry.
    Local(DeliveryReport),
    /// Handed to a relay; `receivers` processes were subscribed.
    Relayed {
        /// Subscribed relay count reported by the broker.
        receivers: usize,
    },
}

/// Delivers published events to user sessions.
#[async_trait]
pub trait FanOut: Send + Sync + std::fmt::Debug + 'static {
    /// Publish `event` to every session of `user_id`.
    async fn publish(&self, user_id: &UserId, event: &NotificationEvent) -> AppResult<PublishReceipt>;
}
