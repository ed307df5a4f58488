// ── Desk: the presentation adapter ──
//
// Wires the code store client, the redemption engine and the refresh
// worker together and presents them to a UI (or the CLI) as one handle.
// Everything a UI needs to show comes out as either a snapshot or a
// `Notice`; nothing here renders.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use promokit_api::PromoClient;

use crate::collaborator::{CodeSource, RedemptionSink};
use crate::config::DeskConfig;
use crate::engine::RedemptionEngine;
use crate::error::CoreError;
use crate::filter::{self, CodeFilter};
use crate::model::{PromoCode, RedemptionResult, Snapshot};
use crate::notice::Notice;
use crate::store::{CodeStoreClient, RefreshReason, RefreshTrigger, SnapshotStore};
use crate::stream::SnapshotStream;

const NOTICE_CHANNEL_SIZE: usize = 64;
/// One slot: any number of requests made while a refresh is queued
/// collapse into that one refresh.
const REFRESH_CHANNEL_SIZE: usize = 1;
/// Date written into a locally patched record after a redemption, in the
/// desk's local time zone.
pub const LOCAL_REDEMPTION_DATE_FORMAT: &str = "%Y-%m-%d";

// ── Connection state ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Desk ─────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DeskInner>`. Owns the current snapshot,
/// runs the background refresh worker between [`connect`](Self::connect)
/// and [`disconnect`](Self::disconnect), and publishes a [`Notice`] for
/// every outcome.
pub struct Desk<C = PromoClient, S = PromoClient> {
    inner: Arc<DeskInner<C, S>>,
}

impl<C, S> Clone for Desk<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct DeskInner<C, S> {
    store: Arc<SnapshotStore>,
    codes: CodeStoreClient<C>,
    engine: RedemptionEngine<S>,
    refresh: RefreshTrigger,
    refresh_rx: Mutex<Option<mpsc::Receiver<RefreshReason>>>,
    connection_state: watch::Sender<ConnectionState>,
    notice_tx: broadcast::Sender<Notice>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Desk {
    /// Create a desk talking HTTP to the configured collaborators. Does
    /// NOT fetch anything: call [`connect()`](Self::connect).
    pub fn new(config: &DeskConfig) -> Result<Self, CoreError> {
        let client = PromoClient::new(
            config.source_url.clone(),
            config.redeem_url.clone(),
            &config.transport(),
        )
        .map_err(|e| CoreError::Config {
            message: e.to_string(),
        })?;
        let client = Arc::new(client);
        Ok(Self::with_collaborators(Arc::clone(&client), client))
    }

    /// One-shot: connect, run closure, disconnect.
    pub async fn oneshot<F, Fut, T>(config: &DeskConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Desk) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let desk = Desk::new(config)?;
        desk.connect().await?;
        let result = f(desk.clone()).await;
        desk.disconnect().await;
        result
    }
}

impl<C: CodeSource, S: RedemptionSink> Desk<C, S> {
    pub fn with_collaborators(source: Arc<C>, sink: Arc<S>) -> Self {
        let store = Arc::new(SnapshotStore::new());
        let (refresh, refresh_rx) = RefreshTrigger::channel(REFRESH_CHANNEL_SIZE);
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);

        Self {
            inner: Arc::new(DeskInner {
                codes: CodeStoreClient::new(source, Arc::clone(&store)),
                engine: RedemptionEngine::new(sink, refresh.clone()),
                store,
                refresh,
                refresh_rx: Mutex::new(Some(refresh_rx)),
                connection_state,
                notice_tx,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Load the initial snapshot and start the refresh worker.
    ///
    /// A failed initial load leaves the desk disconnected and may be
    /// retried. Connecting a desk that was already disconnected returns
    /// [`CoreError::Disconnected`].
    pub async fn connect(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Disconnected);
        }

        let mut rx_slot = self.inner.refresh_rx.lock().await;
        let Some(rx) = rx_slot.take() else {
            debug!("desk already connected");
            return Ok(());
        };

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        if let Err(e) = self.refresh().await {
            *rx_slot = Some(rx);
            self.inner
                .connection_state
                .send_replace(ConnectionState::Failed);
            return Err(e);
        }
        drop(rx_slot);

        let desk = self.clone();
        let cancel = self.inner.cancel.clone();
        self.inner
            .task_handles
            .lock()
            .await
            .push(tokio::spawn(refresh_worker(desk, rx, cancel)));

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!("desk connected");
        Ok(())
    }

    /// Stop the refresh worker. The last snapshot stays readable.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("desk disconnected");
    }

    // ── Snapshot ─────────────────────────────────────────────────

    /// Fetch now and swap the result in. Failures are also published as
    /// a notice and leave the previous snapshot marked stale.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        match self.inner.codes.refresh().await {
            Ok(snapshot) => {
                self.publish(Notice::refreshed(snapshot.len()));
                Ok(snapshot)
            }
            Err(e) => {
                self.publish(Notice::from_error(&e));
                Err(e)
            }
        }
    }

    /// Queue a background refresh without waiting for it.
    pub fn request_refresh(&self) -> bool {
        self.inner.refresh.request(RefreshReason::Requested)
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.current()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notice_tx.subscribe()
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn search(&self, term: &str) -> Vec<PromoCode> {
        filter::filter(&self.snapshot(), term)
    }

    pub fn list(&self, predicate: &CodeFilter, term: &str) -> Vec<PromoCode> {
        filter::select(&self.snapshot(), predicate, term)
    }

    /// The record a submitted token refers to, if any.
    pub fn find(&self, code: &str) -> Option<PromoCode> {
        self.snapshot().find(code).cloned()
    }

    // ── Redemption ───────────────────────────────────────────────

    /// Redeem `code` against the latest snapshot.
    ///
    /// On success the snapshot is immediately replaced by one with the
    /// record marked redeemed (`Freshness::Pending`), so a second
    /// submission is answered locally until the refresh lands.
    pub async fn submit(&self, code: &str) -> Result<RedemptionResult, CoreError> {
        let outcome = self.redeem(code).await;
        match &outcome {
            Ok(result) => {
                self.mark_redeemed(result);
                self.publish(Notice::redeemed(result));
            }
            Err(e) => self.publish(Notice::from_error(e)),
        }
        outcome
    }

    async fn redeem(&self, code: &str) -> Result<RedemptionResult, CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Disconnected);
        }
        let snapshot = self.snapshot();
        if !snapshot.is_loaded() {
            return Err(CoreError::SourceUnavailable {
                detail: "promo codes have not been loaded".into(),
                timed_out: false,
            });
        }
        self.inner.engine.redeem(&snapshot, code).await
    }

    fn mark_redeemed(&self, result: &RedemptionResult) {
        let date = result
            .redeemed_at
            .with_timezone(&Local)
            .format(LOCAL_REDEMPTION_DATE_FORMAT)
            .to_string();
        self.inner.store.update(|current| {
            current
                .get(&result.id)
                .is_some_and(PromoCode::is_active)
                .then(|| current.with_redeemed(&result.id, &date))
        });
    }

    fn publish(&self, notice: Notice) {
        debug!(level = %notice.level, title = %notice.title, "notice");
        // No subscribers is fine: the CLI never listens.
        let _ = self.inner.notice_tx.send(notice);
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Drain refresh requests and fetch once per burst.
async fn refresh_worker<C: CodeSource, S: RedemptionSink>(
    desk: Desk<C, S>,
    mut rx: mpsc::Receiver<RefreshReason>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            reason = rx.recv() => {
                let Some(reason) = reason else { break };
                let mut coalesced = 0_usize;
                while rx.try_recv().is_ok() {
                    coalesced += 1;
                }
                debug!(%reason, coalesced, "refreshing codes");
                if let Err(e) = desk.refresh().await {
                    warn!(error = %e, timed_out = e.is_timeout(), "background refresh failed");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_source_fails_connect() {
        let config = DeskConfig::new("http://127.0.0.1:9/exec".parse().unwrap());
        let desk = Desk::new(&config).unwrap();

        let err = desk.connect().await.unwrap_err();

        assert!(matches!(err, CoreError::SourceUnavailable { .. }));
        assert_eq!(*desk.connection_state().borrow(), ConnectionState::Failed);
        assert!(!desk.snapshot().is_loaded());
    }

    #[tokio::test]
    async fn submit_before_load_is_source_unavailable() {
        let config = DeskConfig::new("http://127.0.0.1:9/exec".parse().unwrap());
        let desk = Desk::new(&config).unwrap();
        let mut notices = desk.notices();

        let err = desk.submit("A1").await.unwrap_err();

        assert!(matches!(err, CoreError::SourceUnavailable { .. }));
        assert_eq!(notices.recv().await.unwrap().title, "Configuration error");
    }

    #[tokio::test]
    async fn connect_after_disconnect_is_refused() {
        let config = DeskConfig::new("http://127.0.0.1:9/exec".parse().unwrap());
        let desk = Desk::new(&config).unwrap();
        desk.disconnect().await;

        assert_eq!(desk.connect().await.unwrap_err(), CoreError::Disconnected);
        assert_eq!(desk.submit("A1").await.unwrap_err(), CoreError::Disconnected);
    }
}
