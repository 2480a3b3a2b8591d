//! Opens stream sessions.
//!
//! Each open runs the same fixed sequence: resolve identity, write the
//! confirmation comment, register, send the unread-count snapshot, start the
//! heartbeat. Every step before registration either completes or leaves
//! nothing behind.

use std::sync::Arc;

use tracing::{info, warn};

use retrotrade_core::error::{AppError, ErrorKind};
use retrotrade_core::result::AppResult;
use retrotrade_core::traits::NotificationStore;
use retrotrade_core::types::UserId;

use crate::connection::authenticator::{StreamAuthenticator, StreamCredential};
use crate::connection::handle::ConnectionHandle;
use crate::connection::heartbeat::{HeartbeatConfig, spawn_heartbeat};
use crate::connection::manager::ConnectionManager;
use crate::message::frame::StreamFrame;
use crate::message::types::NotificationEvent;

use super::body::SessionStream;

/// A session that has been confirmed and registered.
#[derive(Debug)]
pub struct OpenedStream {
    /// The registered session.
    pub session: Arc<ConnectionHandle>,
    /// Frames to write to the peer. Dropping it tears the session down.
    pub body: SessionStream,
}

/// Runs the stream opening sequence.
#[derive(Debug, Clone)]
pub struct StreamOpener {
    authenticator: StreamAuthenticator,
    manager: Arc<ConnectionManager>,
    store: Arc<dyn NotificationStore>,
    heartbeat: HeartbeatConfig,
}

impl StreamOpener {
    /// Creates a new opener.
    pub fn new(
        authenticator: StreamAuthenticator,
        manager: Arc<ConnectionManager>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        let heartbeat = HeartbeatConfig::from_realtime(manager.config());
        Self {
            authenticator,
            manager,
            store,
            heartbeat,
        }
    }

    /// Opens a stream for the caller described by `credential`.
    ///
    /// Fails with `Unauthorized` or `InvalidToken` before any session state
    /// exists. Once this returns `Ok` the confirmation comment is already
    /// queued, so no failure after that point can change the response status.
    pub async fn open(&self, credential: StreamCredential) -> AppResult<OpenedStream> {
        let identity = self.authenticator.resolve(credential).await?;
        let user_id = identity.user_id;

        let config = self.manager.config();
        let (handle, frames) = ConnectionHandle::open(user_id.clone(), config.channel_buffer_size);
        let handle = Arc::new(handle);
        let body = SessionStream::new(frames, handle.clone(), self.manager.clone());

        // `body` is dropped on the error path, which closes the handle.
        self.manager
            .send(&handle, StreamFrame::comment(&config.connected_comment))
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Internal,
                    "Error establishing notification stream",
                    AppError::from(e),
                )
            })?;

        self.manager.register(handle.clone());

        self.send_snapshot(&handle, &user_id).await;

        spawn_heartbeat(handle.clone(), self.manager.clone(), self.heartbeat.clone());

        self.manager.metrics().session_opened();
        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            "Notification stream opened"
        );

        Ok(OpenedStream {
            session: handle,
            body,
        })
    }

    /// Best-effort initial `unread_count` frame. Failures are logged only.
    async fn send_snapshot(&self, handle: &ConnectionHandle, user_id: &UserId) {
        let count = match self.store.count_unread(user_id).await {
            Ok(count) => count,
            Err(e) => {
                let e = AppError::snapshot_unavailable(e);
                self.manager.metrics().snapshot_failed();
                warn!(
                    conn_id = %handle.id,
                    user_id = %user_id,
                    error = %e.detail(),
                    "Skipping initial unread count"
                );
                return;
            }
        };

        match StreamFrame::event(&NotificationEvent::unread_count(count)) {
            Ok(frame) => {
                // Send failures are already handled by the manager.
                let _ = self.manager.send(handle, frame);
            }
            Err(e) => warn!(conn_id = %handle.id, error = %e, "Failed to encode unread count"),
        }
    }
}
