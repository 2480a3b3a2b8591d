//! Connection pool: tracks all active sessions indexed by user.

use std::sync::Arc;

use dashmap::DashMap;

use retrotrade_core::types::UserId;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all registered sessions.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID → sessions in registration order (one user can have several tabs open).
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → session for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session to the pool, keeping at most `max_per_user` sessions
    /// for its user. Returns the oldest sessions pushed out to make room.
    ///
    /// The cap check and the insert happen under the user's entry lock, so
    /// concurrent adds for one user cannot overshoot the cap. Adding the same
    /// session twice is a no-op.
    pub fn add(&self, handle: Arc<ConnectionHandle>, max_per_user: usize) -> Vec<Arc<ConnectionHandle>> {
        let mut connections = self.by_user.entry(handle.user_id.clone()).or_default();
        if connections.iter().any(|c| c.id == handle.id) {
            return Vec::new();
        }

        let overflow = (connections.len() + 1).saturating_sub(max_per_user.max(1));
        let evicted: Vec<_> = connections.drain(..overflow).collect();
        for conn in &evicted {
            self.by_id.remove(&conn.id);
        }

        self.by_id.insert(handle.id, handle.clone());
        connections.push(handle);
        evicted
    }

    /// Removes a session from the pool. Returns `None` if it was not present.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *conn_id);
        }
        self.by_user
            .remove_if(&handle.user_id, |_, connections| connections.is_empty());
        Some(handle)
    }

    /// Gets all sessions for a user, oldest first.
    pub fn get_user_connections(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific session by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns total number of registered sessions.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Returns all session handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns all connected user IDs.
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.by_user.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Removes all sessions for a user.
    pub fn remove_user(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        match self.by_user.remove(user_id) {
            Some((_, connections)) => {
                for conn in &connections {
                    self.by_id.remove(&conn.id);
                }
                connections
            }
            None => Vec::new(),
        }
    }
}
