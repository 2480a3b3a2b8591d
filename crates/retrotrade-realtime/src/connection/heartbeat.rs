//! Periodic keep-alive comments for open streams.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::message::frame::StreamFrame;

use super::handle::{ConnectionHandle, SendError};
use super::manager::ConnectionManager;

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between comment frames
    pub interval: Duration,
    /// Comment text written on each tick
    pub comment: String,
}

impl HeartbeatConfig {
    /// Builds the heartbeat settings from the session configuration.
    pub fn from_realtime(config: &retrotrade_core::config::RealtimeConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.heartbeat_interval_seconds),
            comment: config.heartbeat_comment.clone(),
        }
    }
}

/// Starts the session's heartbeat task.
///
/// Returns `None` when the session already has one or is closed.
pub fn spawn_heartbeat(
    handle: Arc<ConnectionHandle>,
    manager: Arc<ConnectionManager>,
    config: HeartbeatConfig,
) -> Option<JoinHandle<()>> {
    if !handle.arm_heartbeat() {
        return None;
    }
    Some(tokio::spawn(run_heartbeat(handle, manager, config)))
}

/// Run heartbeat loop for a session.
///
/// The first comment goes out one full interval after start. The loop ends
/// when the session closes or a write finds the transport gone, in which
/// case the manager closes and unregisters the session.
pub async fn run_heartbeat(
    handle: Arc<ConnectionHandle>,
    manager: Arc<ConnectionManager>,
    config: HeartbeatConfig,
) {
    let closed = handle.lifecycle();
    let frame = StreamFrame::comment(&config.comment);
    let mut interval = time::interval_at(Instant::now() + config.interval, config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = closed.cancelled() => break,
            _ = interval.tick() => {
                match manager.send(&handle, frame.clone()) {
                    Ok(()) => manager.metrics().heartbeat_sent(),
                    // A full queue still has frames in flight to the peer.
                    Err(SendError::Full) => {}
                    Err(SendError::Closed) => {
                        debug!(conn_id = %handle.id, "Heartbeat write failed, session closed");
                        break;
                    }
                }
            }
        }
    }

    debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
