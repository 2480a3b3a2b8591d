//! In-process fan-out for single-node deployments.

use std::sync::Arc;

use async_trait::async_trait;

use retrotrade_core::result::AppResult;
use retrotrade_core::types::UserId;

use crate::connection::manager::ConnectionManager;
use crate::message::types::NotificationEvent;

use super::{FanOut, PublishReceipt};

/// Broadcasts straight into the local registry.
#[derive(Debug, Clone)]
pub struct LocalFanOut {
    connections: Arc<ConnectionManager>,
}

impl LocalFanOut {
    /// Creates a fan-out over `connections`.
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl FanOut for LocalFanOut {
    async fn publish(&self, user_id: &UserId, event: &NotificationEvent) -> AppResult<PublishReceipt> {
        let report = self.connections.broadcast(user_id, event)?;
        Ok(PublishReceipt::Local(report))
    }
}
