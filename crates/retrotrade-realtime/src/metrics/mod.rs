//! Delivery metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level counters. Active session and user counts are read from the
/// registry instead of being tracked here.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Streams that completed setup
    sessions_opened: AtomicU64,
    /// Frames queued to a transport
    frames_sent: AtomicU64,
    /// Heartbeat comments queued
    heartbeats_sent: AtomicU64,
    /// Initial snapshots skipped because the store failed
    snapshots_failed: AtomicU64,
    /// Frames dropped on a full session queue
    frames_dropped: AtomicU64,
    /// Sessions removed after a write hit a closed transport
    sessions_reaped: AtomicU64,
    /// Sessions closed to make room under the per-user cap
    sessions_evicted: AtomicU64,
    /// Events accepted from producers
    events_published: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn heartbeat_sent(&self) {
        self.heartbeats_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot_failed(&self) {
        self.snapshots_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_reaped(&self) {
        self.sessions_reaped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_evicted(&self) {
        self.sessions_evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            heartbeats_sent: self.heartbeats_sent.load(Ordering::Relaxed),
            snapshots_failed: self.snapshots_failed.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            sessions_reaped: self.sessions_reaped.load(Ordering::Relaxed),
            sessions_evicted: self.sessions_evicted.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub sessions_opened: u64,
    pub frames_sent: u64,
    pub heartbeats_sent: u64,
    pub snapshots_failed: u64,
    pub frames_dropped: u64,
    pub sessions_reaped: u64,
    pub sessions_evicted: u64,
    pub events_published: u64,
}
