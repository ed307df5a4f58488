// ── Atomic snapshot holder ──
//
// A single `watch` channel carrying `Arc<Snapshot>`. Readers clone the Arc
// and never block writers; writers swap in a whole new snapshot and every
// subscriber is woken.
//
// Fetch outcomes carry the ticket they were issued with. An outcome older
// than the last one settled is dropped, so a slow fetch can never overwrite
// a newer snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::model::{Freshness, Snapshot};
use crate::stream::SnapshotStream;

pub struct SnapshotStore {
    sender: watch::Sender<Arc<Snapshot>>,
    /// Highest fetch ticket whose outcome has been applied.
    settled: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self {
            sender,
            settled: AtomicU64::new(0),
        }
    }

    /// The current snapshot. Cheap: clones an `Arc`.
    pub fn current(&self) -> Arc<Snapshot> {
        self.sender.borrow().clone()
    }

    /// Install the result of fetch `ticket` and notify subscribers.
    ///
    /// Returns `false` without touching the snapshot if a later fetch has
    /// already settled.
    pub fn install(&self, ticket: u64, snapshot: Snapshot) -> bool {
        self.update(|_| self.settle(ticket).then_some(snapshot))
    }

    /// Derive a new snapshot from the current one under the channel's
    /// write lock. Returning `None` keeps the current one and wakes no one.
    pub fn update<F>(&self, derive: F) -> bool
    where
        F: FnOnce(&Snapshot) -> Option<Snapshot>,
    {
        self.sender.send_if_modified(|current| match derive(current) {
            Some(next) => {
                *current = Arc::new(next);
                true
            }
            None => false,
        })
    }

    /// Keep the current contents but flag them as untrustworthy, because
    /// fetch `ticket` failed. Ignored if a later fetch has already settled.
    pub fn mark_stale(&self, ticket: u64, reason: impl Into<String>) {
        let reason = reason.into();
        self.update(|current| {
            if !self.settle(ticket) {
                return None;
            }
            warn!(%reason, "code snapshot is stale");
            current
                .is_loaded()
                .then(|| current.with_freshness(Freshness::Stale { reason }))
        });
    }

    /// Claim `ticket` as the newest settled fetch. Only called under the
    /// channel's write lock.
    fn settle(&self, ticket: u64) -> bool {
        let settled = self.settled.load(Ordering::Acquire);
        if ticket <= settled {
            debug!(ticket, settled, "dropping overtaken fetch outcome");
            return false;
        }
        self.settled.store(ticket, Ordering::Release);
        true
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.sender.subscribe())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
