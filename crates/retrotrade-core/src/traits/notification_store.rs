//! Unread notification counts.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserId;

/// Read side of the notification store, as seen by the delivery core.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Number of unread notifications for `user_id`.
    async fn count_unread(&self, user_id: &UserId) -> AppResult<u64>;
}
