//! Connection manager: session registration, teardown, and per-user delivery.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use retrotrade_core::config::RealtimeConfig;
use retrotrade_core::error::AppError;
use retrotrade_core::result::AppResult;
use retrotrade_core::types::UserId;

use crate::message::frame::StreamFrame;
use crate::message::types::NotificationEvent;
use crate::metrics::RealtimeMetrics;

use super::handle::{ConnectionHandle, ConnectionId, ConnectionInfo, SendError};
use super::pool::ConnectionPool;

/// Outcome of delivering one event to a user's sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Sessions the frame was queued to.
    pub delivered: usize,
    /// Sessions whose queue was full; the frame was dropped for them only.
    pub dropped: usize,
    /// Sessions found dead and removed during delivery.
    pub reaped: usize,
}

impl DeliveryReport {
    fn record(&mut self, result: Result<(), SendError>) {
        match result {
            Ok(()) => self.delivered += 1,
            Err(SendError::Full) => self.dropped += 1,
            Err(SendError::Closed) => self.reaped += 1,
        }
    }
}

/// Registry of all open stream sessions.
///
/// Safe to share across tokio worker threads. It only spans one process;
/// multi-process deployments put a fan-out bridge in front of it.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: ConnectionPool,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Configuration.
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(config: RealtimeConfig, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            pool: ConnectionPool::new(),
            metrics,
            config,
        }
    }

    /// Registers an open session under its user.
    ///
    /// When the user is already at `max_connections_per_user`, the oldest
    /// sessions are pushed out and closed.
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        let max = self.config.max_connections_per_user;
        let evicted = self.pool.add(handle.clone(), max);
        if !evicted.is_empty() {
            warn!(
                user_id = %handle.user_id,
                evicted = evicted.len(),
                max,
                "User at max connections, oldest replaced"
            );
        }
        for oldest in &evicted {
            if oldest.close() {
                self.metrics.session_evicted();
            }
        }

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            "Stream session registered"
        );
    }

    /// Removes a session from the registry. Absent sessions are ignored.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let removed = self.pool.remove(conn_id);
        if let Some(handle) = &removed {
            info!(
                conn_id = %conn_id,
                user_id = %handle.user_id,
                "Stream session unregistered"
            );
        }
        removed
    }

    /// The single teardown path: closes the session (cancelling its
    /// heartbeat and ending its body) and unregisters it.
    ///
    /// Safe to call any number of times; returns `true` only for the call
    /// that closed the session.
    pub fn close(&self, handle: &ConnectionHandle) -> bool {
        let first = handle.close();
        self.unregister(&handle.id);
        first
    }

    /// Queues a frame to one session. A closed transport closes and
    /// unregisters the session; a full queue drops the frame.
    pub fn send(&self, handle: &ConnectionHandle, frame: StreamFrame) -> Result<(), SendError> {
        let result = handle.send(frame);
        match result {
            Ok(()) => self.metrics.frame_sent(),
            Err(SendError::Full) => {
                self.metrics.frame_dropped();
                warn!(conn_id = %handle.id, "Session send buffer full, dropping frame");
            }
            Err(err @ SendError::Closed) => {
                if self.close(handle) {
                    self.metrics.session_reaped();
                    debug!(conn_id = %handle.id, error = %AppError::from(err), "Session reaped");
                }
            }
        }
        result
    }

    /// Delivers an event to every session of `user_id`.
    ///
    /// A dead session is removed and delivery continues to the others.
    pub fn broadcast(&self, user_id: &UserId, event: &NotificationEvent) -> AppResult<DeliveryReport> {
        let frame = StreamFrame::event(event)?;
        Ok(self.deliver(&self.pool.get_user_connections(user_id), &frame))
    }

    /// Delivers an event to every registered session.
    pub fn broadcast_all(&self, event: &NotificationEvent) -> AppResult<DeliveryReport> {
        let frame = StreamFrame::event(event)?;
        Ok(self.deliver(&self.pool.all_connections(), &frame))
    }

    fn deliver(&self, connections: &[Arc<ConnectionHandle>], frame: &StreamFrame) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for conn in connections {
            report.record(self.send(conn, frame.clone()));
        }
        report
    }

    /// Closes every session of a user.
    pub fn close_user(&self, user_id: &UserId) -> usize {
        let conns = self.pool.remove_user(user_id);
        for conn in &conns {
            conn.close();
        }
        if !conns.is_empty() {
            info!(user_id = %user_id, count = conns.len(), "Closed user sessions");
        }
        conns.len()
    }

    /// Closes all sessions.
    pub fn close_all(&self) -> usize {
        let all = self.pool.all_connections();
        for conn in &all {
            self.close(conn);
        }
        info!(count = all.len(), "All sessions closed");
        all.len()
    }

    /// Returns the total session count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }

    /// Returns all connected user IDs.
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.pool.connected_user_ids()
    }

    /// Checks if a user has at least one registered session.
    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        !self.pool.get_user_connections(user_id).is_empty()
    }

    /// Snapshots of a user's sessions, oldest first.
    pub fn user_sessions(&self, user_id: &UserId) -> Vec<ConnectionInfo> {
        self.pool
            .get_user_connections(user_id)
            .iter()
            .map(|conn| conn.info())
            .collect()
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Returns the shared metrics.
    pub fn metrics(&self) -> &Arc<RealtimeMetrics> {
        &self.metrics
    }
}
