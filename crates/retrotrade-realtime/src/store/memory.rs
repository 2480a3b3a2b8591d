//! Process-local unread counters.

use async_trait::async_trait;
use dashmap::DashMap;

use retrotrade_core::result::AppResult;
use retrotrade_core::traits::NotificationStore;
use retrotrade_core::types::UserId;

/// In-memory unread counts. Users never seen have zero unread.
#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    unread: DashMap<UserId, u64>,
}

impl MemoryNotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's unread count.
    pub fn set_unread(&self, user_id: &UserId, count: u64) {
        self.unread.insert(user_id.clone(), count);
    }

    /// Adds one unread notification and returns the new count.
    pub fn increment(&self, user_id: &UserId) -> u64 {
        let mut entry = self.unread.entry(user_id.clone()).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }

    /// Clears a user's unread count.
    pub fn mark_all_read(&self, user_id: &UserId) {
        self.unread.remove(user_id);
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn count_unread(&self, user_id: &UserId) -> AppResult<u64> {
        Ok(self.unread.get(user_id).map(|c| *c).unwrap_or(0))
    }
}
