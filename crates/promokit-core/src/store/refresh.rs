// ── Refresh requests ──
//
// Anything that learns the snapshot may be out of date (a redemption went
// through, the sink disagreed with us, the sink could not be reached) asks
// for a refresh by message instead of fetching inline. The desk's refresh
// worker drains the channel and performs one fetch per burst.

use strum::Display;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Why a refresh was requested. Logged by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RefreshReason {
    /// The sink accepted a redemption.
    Redeemed { code: String },
    /// The sink refused a code the snapshot considered active.
    Rejected { code: String },
    /// The sink outcome is unknown.
    Unreachable { code: String },
    /// Explicit request from a consumer.
    Requested,
}

/// Sending half of the refresh channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    tx: mpsc::Sender<RefreshReason>,
}

impl RefreshTrigger {
    /// Create a trigger and the receiver a worker should drain.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<RefreshReason>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Ask for a refresh without waiting.
    ///
    /// A full channel means a refresh is already queued, which will pick
    /// up this change too, so the request is dropped. Returns `false` only
    /// when no worker is listening.
    pub fn request(&self, reason: RefreshReason) -> bool {
        match self.tx.try_send(reason) {
            Ok(()) => true,
            Err(TrySendError::Full(reason)) => {
                debug!(%reason, "refresh already queued");
                true
            }
            Err(TrySendError::Closed(reason)) => {
                warn!(%reason, "no refresh worker running, request dropped");
                false
            }
        }
    }
}
