//! Reader task forwarding inbound frames to the session loop.

use bytes::Bytes;
use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument, debug, warn};

use crate::transport::FrameSource;

/// Handle to a running reader task.
///
/// The task pulls raw frames off the transport and forwards them one at a
/// time. It ends on read error or when the peer closes, which closes the
/// channel. Dropping the handle aborts the task.
#[derive(Debug)]
pub(super) struct Reader {
    frames: mpsc::Receiver<Bytes>,
    task: JoinHandle<()>,
}

impl Reader {
    pub(super) fn spawn(mut source: FrameSource) -> Self {
        let (tx, frames) = mpsc::channel(1);
        let task = tokio::spawn(
            async move {
                while let Some(item) = source.next().await {
                    match item {
                        Ok(raw) => {
                            if tx.send(raw).await.is_err() {
                                return;
                            }
                        }
                        Err(err) => {
                            warn!(error = %err, "transport read failed");
                            return;
                        }
                    }
                }
                debug!("transport closed by peer");
            }
            .in_current_span(),
        );
        Self { frames, task }
    }

    /// Next raw frame; `None` once the transport has ended.
    pub(super) async fn recv(&mut self) -> Option<Bytes> { self.frames.recv().await }
}

impl Drop for Reader {
    fn drop(&mut self) { self.task.abort(); }
}
