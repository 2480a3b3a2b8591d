//! Event-stream wire framing.
//!
//! ```text
//! : <comment text>\n\n
//! data: <JSON>\n\n
//! ```
//!
//! Frames are encoded once and shared as [`Bytes`], so a broadcast to many
//! sessions serializes the event a single time.

use bytes::{BufMut, Bytes, BytesMut};

use retrotrade_core::result::AppResult;

use super::types::NotificationEvent;

/// What a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Keep-alive or confirmation comment, ignored by `EventSource`.
    Comment,
    /// A `data:` event frame.
    Event,
}

/// A fully encoded frame ready to be written to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFrame {
    kind: FrameKind,
    bytes: Bytes,
}

impl StreamFrame {
    /// Encodes a comment frame. Multi-line text becomes one comment line per line.
    pub fn comment(text: &str) -> Self {
        let mut buf = BytesMut::with_capacity(text.len() + 4);
        for line in text.split('\n') {
            buf.put_slice(b": ");
            buf.put_slice(line.trim_end_matches('\r').as_bytes());
            buf.put_u8(b'\n');
        }
        buf.put_u8(b'\n');
        Self {
            kind: FrameKind::Comment,
            bytes: buf.freeze(),
        }
    }

    /// Encodes an event as a single `data:` frame.
    pub fn event(event: &NotificationEvent) -> AppResult<Self> {
        let json = serde_json::to_string(event)?;
        let mut buf = BytesMut::with_capacity(json.len() + 8);
        buf.put_slice(b"data: ");
        buf.put_slice(json.as_bytes());
        buf.put_slice(b"\n\n");
        Ok(Self {
            kind: FrameKind::Event,
            bytes: buf.freeze(),
        })
    }

    /// Frame kind.
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the frame into its encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
