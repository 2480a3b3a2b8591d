//! Notification store implementations.

pub mod http;
pub mod memory;

use std::sync::Arc;

use retrotrade_core::config::StoreConfig;
use retrotrade_core::config::store::StoreProvider;
use retrotrade_core::result::AppResult;
use retrotrade_core::traits::NotificationStore;

pub use http::HttpNotificationStore;
pub use memory::MemoryNotificationStore;

/// Builds the store selected by `store.provider`.
pub fn build_store(config: &StoreConfig) -> AppResult<Arc<dyn NotificationStore>> {
    let store: Arc<dyn NotificationStore> = match config.provider {
        StoreProvider::Memory => Arc::new(MemoryNotificationStore::new()),
        StoreProvider::Http => Arc::new(HttpNotificationStore::new(&config.http)?),
    };
    Ok(store)
}
