// ── Reactive snapshot stream ──
//
// Subscription type for consuming snapshot replacements from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Snapshot;

/// A subscription to the code snapshot.
///
/// Provides both point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting to a `Stream`.
pub struct SnapshotStream {
    current: Arc<Snapshot>,
    receiver: watch::Receiver<Arc<Snapshot>>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Snapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<Snapshot> {
        &self.current
    }

    /// The latest snapshot (may have changed since `current`).
    pub fn latest(&self) -> Arc<Snapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next replacement.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    /// The first item is the snapshot current at conversion time.
    pub fn into_stream(self) -> SnapshotWatchStream {
        SnapshotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct SnapshotWatchStream {
    inner: WatchStream<Arc<Snapshot>>,
}

impl Stream for SnapshotWatchStream {
    type Item = Arc<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::model::Freshness;

    #[tokio::test]
    async fn stream_yields_current_then_replacements() {
        let (tx, rx) = watch::channel(Arc::new(Snapshot::empty()));
        let mut stream = SnapshotStream::new(rx).into_stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.freshness(), &Freshness::Unloaded);

        tx.send_replace(Arc::new(Snapshot::empty().with_freshness(Freshness::Pending)));
        let second = stream.next().await.unwrap();
        assert_eq!(second.freshness(), &Freshness::Pending);
    }

    #[tokio::test]
    async fn changed_returns_none_when_store_dropped() {
        let (tx, rx) = watch::channel(Arc::new(Snapshot::empty()));
        let mut stream = SnapshotStream::new(rx);
        drop(tx);
        assert!(stream.changed().await.is_none());
    }
}
