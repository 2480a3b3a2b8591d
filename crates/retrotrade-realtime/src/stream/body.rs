//! Response body of an open stream.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use tokio::sync::mpsc;
use tokio_util::sync::WaitForCancellationFutureOwned;
use tracing::debug;

use crate::connection::handle::ConnectionHandle;
use crate::connection::manager::ConnectionManager;
use crate::message::frame::StreamFrame;

/// Closes the session when the body goes away.
#[derive(Debug)]
struct SessionGuard {
    handle: Arc<ConnectionHandle>,
    manager: Arc<ConnectionManager>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.manager.close(&self.handle) {
            debug!(conn_id = %self.handle.id, "Stream body dropped, session closed");
        }
    }
}

pin_project! {
    /// Stream of encoded frames for one session.
    ///
    /// Ends as soon as the session closes. Dropping it (the HTTP layer does
    /// so when the peer disconnects) closes and unregisters the session.
    pub struct SessionStream {
        #[pin]
        closed: WaitForCancellationFutureOwned,
        frames: mpsc::Receiver<StreamFrame>,
        finished: bool,
        guard: SessionGuard,
    }
}

impl SessionStream {
    pub(crate) fn new(
        frames: mpsc::Receiver<StreamFrame>,
        handle: Arc<ConnectionHandle>,
        manager: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            closed: handle.lifecycle().cancelled_owned(),
            frames,
            finished: false,
            guard: SessionGuard { handle, manager },
        }
    }

    /// The session this body belongs to.
    pub fn session(&self) -> &Arc<ConnectionHandle> {
        &self.guard.handle
    }
}

impl std::fmt::Debug for SessionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStream")
            .field("conn_id", &self.guard.handle.id)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Stream for SessionStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.finished {
            return Poll::Ready(None);
        }

        if this.closed.poll(cx).is_ready() {
            *this.finished = true;
            return Poll::Ready(None);
        }

        match this.frames.poll_recv(cx) {
            Poll::Ready(Some(frame)) => Poll::Ready(Some(Ok(frame.into_bytes()))),
            Poll::Ready(None) => {
                *this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
