//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info};

use retrotrade_core::config::realtime::FanOutProvider;
use retrotrade_core::config::{FanOutConfig, RealtimeConfig};
use retrotrade_core::error::AppError;
use retrotrade_core::result::AppResult;
use retrotrade_core::traits::{IdentityVerifier, NotificationStore};
use retrotrade_core::types::UserId;

use crate::bridge::{FanOut, LocalFanOut, PublishReceipt, RedisFanOut};
use crate::connection::authenticator::{StreamAuthenticator, StreamCredential};
use crate::connection::manager::ConnectionManager;
use crate::message::types::NotificationEvent;
use crate::metrics::RealtimeMetrics;
use crate::stream::opener::{OpenedStream, StreamOpener};

/// Central real-time engine: opens streams and routes published events.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Stream opening sequence.
    opener: StreamOpener,
    /// Where published events go.
    fanout: Arc<dyn FanOut>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("fanout", &self.fanout)
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates an engine delivering published events in-process.
    pub fn new(
        config: RealtimeConfig,
        verifier: Arc<dyn IdentityVerifier>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let connections = Arc::new(ConnectionManager::new(config, metrics.clone()));
        let opener = StreamOpener::new(
            StreamAuthenticator::new(verifier),
            connections.clone(),
            store,
        );
        let fanout: Arc<dyn FanOut> = Arc::new(LocalFanOut::new(connections.clone()));

        info!("Real-time engine initialized");

        Self {
            connections,
            metrics,
            opener,
            fanout,
            shutdown_tx,
        }
    }

    /// Switches to the configured fan-out provider.
    ///
    /// The Redis provider also starts the relay that feeds this process's
    /// registry; it stops on [`RealtimeEngine::shutdown`].
    pub async fn connect_fanout(mut self, config: &FanOutConfig) -> AppResult<Self> {
        match config.provider {
            FanOutProvider::Local => {}
            FanOutProvider::Redis => {
                let redis = RedisFanOut::connect(&config.redis_url, &config.channel).await?;
                #[cfg(feature = "redis-fanout")]
                {
                    redis
                        .spawn_relay(self.connections.clone(), self.shutdown_receiver())
                        .await?;
                }
                self.fanout = Arc::new(redis);
            }
        }
        info!(provider = ?config.provider, "Fan-out configured");
        Ok(self)
    }

    /// Opens a notification stream for the caller.
    pub async fn open_stream(&self, credential: StreamCredential) -> AppResult<OpenedStream> {
        self.opener.open(credential).await
    }

    /// Publishes an event to every session of `user_id`.
    pub async fn publish(&self, user_id: &UserId, event: &NotificationEvent) -> AppResult<PublishReceipt> {
        let receipt = self.fanout.publish(user_id, event).await?;
        self.metrics.event_published();
        debug!(user_id = %user_id, event_type = %event.event_type, "Event published");
        Ok(receipt)
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals background tasks to stop and ends every open stream.
    pub fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        let _ = self.shutdown_tx.send(());
        let closed = self.connections.close_all();

        info!(closed, "Real-time engine shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::StreamExt;

    use retrotrade_core::types::Identity;

    use super::*;
    use crate::connection::manager::DeliveryReport;
    use crate::store::MemoryNotificationStore;

    #[derive(Debug)]
    struct PrefixVerifier;

    #[async_trait]
    impl IdentityVerifier for PrefixVerifier {
        async fn verify(&self, token: &str) -> AppResult<Identity> {
            let raw = token.strip_prefix("user:").ok_or_else(AppError::invalid_token)?;
            Ok(Identity::new(UserId::new(raw)?))
        }
    }

    fn engine() -> RealtimeEngine {
        RealtimeEngine::new(
            RealtimeConfig::default(),
            Arc::new(PrefixVerifier),
            Arc::new(MemoryNotificationStore::new()),
        )
    }

    #[tokio::test]
    async fn test_publish_reaches_open_stream() {
        let engine = engine();
        let opened = engine
            .open_stream(StreamCredential::query_token("user:alice"))
            .await
            .expect("open");
        let mut body = std::pin::pin!(opened.body);
        // connected comment, then the zero snapshot
        body.next().await.expect("comment").expect("ok");
        body.next().await.expect("snapshot").expect("ok");

        let alice = UserId::new("alice").expect("valid");
        let receipt = engine
            .publish(&alice, &NotificationEvent::unread_count(1))
            .await
            .expect("publish");
        assert_eq!(
            receipt,
            PublishReceipt::Local(DeliveryReport {
                delivered: 1,
                dropped: 0,
                reaped: 0
            })
        );
        assert_eq!(
            body.next().await.expect("event").expect("ok"),
            "data: {\"type\":\"unread_count\",\"data\":{\"unreadCount\":1}}\n\n"
        );
        assert_eq!(engine.metrics.snapshot().events_published, 1);
    }

    #[tokio::test]
    async fn test_shutdown_ends_streams() {
        let engine = engine();
        let first = engine
            .open_stream(StreamCredential::query_token("user:alice"))
            .await
            .expect("open");
        let second = engine
            .open_stream(StreamCredential::query_token("user:bob"))
            .await
            .expect("open");
        let mut shutdown = engine.shutdown_receiver();

        engine.shutdown().expect("shutdown");

        assert!(shutdown.recv().await.is_ok());
        let mut first_body = std::pin::pin!(first.body);
        let mut second_body = std::pin::pin!(second.body);
        assert!(first_body.next().await.is_none());
        assert!(second_body.next().await.is_none());
        assert_eq!(engine.connections.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_local_provider_keeps_engine() {
        let engine = engine()
            .connect_fanout(&FanOutConfig::default())
            .await
            .expect("local");
        assert_eq!(engine.connections.connection_count(), 0);
    }
}
