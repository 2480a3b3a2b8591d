//! Notification event envelope.

use serde::{Deserialize, Serialize};

/// Event type of the unread-count snapshot sent when a stream opens.
pub const UNREAD_COUNT: &str = "unread_count";

/// A tagged notification payload: `{ "type": ..., "data": ... }`.
///
/// The core only produces `unread_count`; other types come from external
/// producers and are forwarded without shape validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Event discriminator.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Opaque event body.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl NotificationEvent {
    /// Creates an event with an arbitrary body.
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// The `unread_count` snapshot event.
    pub fn unread_count(count: u64) -> Self {
        Self {
            event_type: UNREAD_COUNT.to_string(),
            data: serde_json::json!(UnreadCount {
                unread_count: count
            }),
        }
    }
}

/// Body of an `unread_count` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    /// Number of unread notifications.
    #[serde(rename = "unreadCount")]
    pub unread_count: u64,
}
