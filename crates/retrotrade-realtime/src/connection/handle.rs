//! Individual stream session handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use retrotrade_core::error::AppError;
use retrotrade_core::types::UserId;

use crate::message::frame::StreamFrame;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Why a frame could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The session is closed or its transport is gone.
    #[error("transport closed")]
    Closed,
    /// The session's outbound queue is full; the frame was dropped.
    #[error("outbound queue full")]
    Full,
}

impl From<SendError> for AppError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Closed => AppError::dead_connection("Session transport is closed"),
            SendError::Full => AppError::internal("Session send buffer is full"),
        }
    }
}

/// A handle to a single event-stream session.
///
/// Holds the write side of the transport plus the session's lifecycle
/// token. The token doubles as the liveness-timer handle: the heartbeat and
/// the response body both stop when it is cancelled, and it is cancelled
/// exactly once, by [`ConnectionHandle::close`].
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this session
    pub user_id: UserId,
    /// When the session was created
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<StreamFrame>,
    lifecycle: CancellationToken,
    closed: AtomicBool,
    heartbeat_armed: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new open session and the receiving end of its transport.
    pub fn open(user_id: UserId, buffer: usize) -> (Self, mpsc::Receiver<StreamFrame>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            sender,
            lifecycle: CancellationToken::new(),
            closed: AtomicBool::new(false),
            heartbeat_armed: AtomicBool::new(false),
        };
        (handle, receiver)
    }

    /// Queue a frame for this session without waiting for room.
    pub fn send(&self, frame: StreamFrame) -> Result<(), SendError> {
        if !self.is_open() {
            return Err(SendError::Closed);
        }
        match self.sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(SendError::Full),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SendError::Closed),
        }
    }

    /// Whether the session is still open
    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    /// Transition `Open -> Closed` and cancel the lifecycle token.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.lifecycle.cancel();
        true
    }

    /// Token cancelled when the session closes.
    pub fn lifecycle(&self) -> CancellationToken {
        self.lifecycle.clone()
    }

    /// Claims the session's single heartbeat slot. Returns `false` if a
    /// heartbeat was already started or the session is closed.
    pub fn arm_heartbeat(&self) -> bool {
        self.is_open() && !self.heartbeat_armed.swap(true, Ordering::SeqCst)
    }

    /// Get a snapshot of session info
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            user_id: self.user_id.clone(),
            connected_at: self.connected_at,
            open: self.is_open(),
        }
    }
}

/// Snapshot of session info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// User ID
    pub user_id: UserId,
    /// Connected at
    pub connected_at: DateTime<Utc>,
    /// Still open
    pub open: bool,
}
