//! Redis pub/sub fan-out for multi-process deployments.
//!
//! Every process publishes envelopes to one channel and runs a relay that
//! subscribes to it and broadcasts each envelope into its own registry.

use serde::{Deserialize, Serialize};

use retrotrade_core::types::UserId;

use crate::message::types::NotificationEvent;

/// Wire format on the Redis channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEnvelope {
    /// Recipient.
    pub user_id: UserId,
    /// Event to deliver.
    pub event: NotificationEvent,
}

#[cfg(feature = "redis-fanout")]
pub mod implementation {
    use std::sync::Arc;

    use async_trait::async_trait;
    use futures::StreamExt;
    use redis::AsyncCommands;
    use redis::aio::ConnectionManager as RedisConnection;
    use tokio::sync::broadcast;
    use tokio::task::JoinHandle;
    use tracing::{debug, error, info, warn};

    use retrotrade_core::error::{AppError, ErrorKind};
    use retrotrade_core::result::AppResult;
    use retrotrade_core::types::UserId;

    use super::NotificationEnvelope;
    use crate::bridge::{FanOut, PublishReceipt};
    use crate::connection::manager::ConnectionManager;
    use crate::message::types::NotificationEvent;

    fn map_err(context: &str, e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::ExternalService, format!("Redis {context} failed"), e)
    }

    /// Publishes envelopes to a Redis channel.
    #[derive(Clone)]
    pub struct RedisFanOut {
        client: redis::Client,
        conn: RedisConnection,
        channel: String,
    }

    impl std::fmt::Debug for RedisFanOut {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RedisFanOut")
                .field("channel", &self.channel)
                .finish()
        }
    }

    impl RedisFanOut {
        /// Connects to `url` and publishes on `channel`.
        pub async fn connect(url: &str, channel: &str) -> AppResult<Self> {
            let client = redis::Client::open(url).map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e)
            })?;
            let conn = client
                .get_connection_manager()
                .await
                .map_err(|e| map_err("connection", e))?;

            info!(channel = %channel, "Redis fan-out connected");
            Ok(Self {
                client,
                conn,
                channel: channel.to_string(),
            })
        }

        /// Subscribes to the channel and broadcasts every envelope into
        /// `connections` until `shutdown` fires.
        pub async fn spawn_relay(
            &self,
            connections: Arc<ConnectionManager>,
            mut shutdown: broadcast::Receiver<()>,
        ) -> AppResult<JoinHandle<()>> {
            let mut pubsub = self
                .client
                .get_async_pubsub()
                .await
                .map_err(|e| map_err("subscribe", e))?;
            pubsub
                .subscribe(&self.channel)
                .await
                .map_err(|e| map_err("subscribe", e))?;

            let channel = self.channel.clone();
            info!(channel = %channel, "Redis fan-out relay subscribed");

            Ok(tokio::spawn(async move {
                let mut messages = pubsub.on_message();
                loop {
                    tokio::select! {
                        _ = shutdown.recv() => break,
                        msg = messages.next() => {
                            let Some(msg) = msg else {
                                warn!(channel = %channel, "Redis subscription ended");
                                break;
                            };
                            let payload = match msg.get_payload::<String>() {
                                Ok(payload) => payload,
                                Err(e) => {
                                    error!(error = %e, "Unreadable fan-out payload");
                                    continue;
                                }
                            };
                            relay(&connections, &payload);
                        }
                    }
                }
                debug!(channel = %channel, "Redis fan-out relay stopped");
            }))
        }
    }

    fn relay(connections: &ConnectionManager, payload: &str) {
        let envelope: NotificationEnvelope = match serde_json::from_str(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Malformed fan-out envelope");
                return;
            }
        };
        if let Err(e) = connections.broadcast(&envelope.user_id, &envelope.event) {
            error!(user_id = %envelope.user_id, error = %e, "Relayed delivery failed");
        }
    }

    #[async_trait]
    impl FanOut for RedisFanOut {
        async fn publish(&self, user_id: &UserId, event: &NotificationEvent) -> AppResult<PublishReceipt> {
            let payload = serde_json::to_string(&NotificationEnvelope {
                user_id: user_id.clone(),
                event: event.clone(),
            })?;

            let mut conn = self.conn.clone();
            let receivers: usize = conn
                .publish(&self.channel, payload)
                .await
                .map_err(|e| map_err("PUBLISH", e))?;

            debug!(user_id = %user_id, receivers, "Notification relayed");
            Ok(PublishReceipt::Relayed { receivers })
        }
    }
}

#[cfg(not(feature = "redis-fanout"))]
pub mod implementation {
    use async_trait::async_trait;

    use retrotrade_core::error::AppError;
    use retrotrade_core::result::AppResult;
    use retrotrade_core::types::UserId;

    use crate::bridge::{FanOut, PublishReceipt};
    use crate::message::types::NotificationEvent;

    fn disabled() -> AppError {
        AppError::configuration("fanout.provider = \"redis\" requires the redis-fanout feature")
    }

    /// Placeholder when the `redis-fanout` feature is disabled.
    #[derive(Debug, Clone)]
    pub struct RedisFanOut;

    impl RedisFanOut {
        /// Always fails: the binary was built without Redis support.
        pub async fn connect(_url: &str, _channel: &str) -> AppResult<Self> {
            Err(disabled())
        }
    }

    #[async_trait]
    impl FanOut for RedisFanOut {
        async fn publish(&self, _user_id: &UserId, _event: &NotificationEvent) -> AppResult<PublishReceipt> {
            Err(disabled())
        }
    }
}

pub use implementation::RedisFanOut;
