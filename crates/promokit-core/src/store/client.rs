// ── Code Store Client ──
//
// Reads the full code list from the source and turns it into a validated
// snapshot. No caching: every fetch is a full read. Fetches may overlap;
// the one issued last wins, whatever order they finish in.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::SnapshotStore;
use crate::collaborator::CodeSource;
use crate::convert::snapshot_from_page;
use crate::error::CoreError;
use crate::model::Snapshot;

pub struct CodeStoreClient<C> {
    source: Arc<C>,
    store: Arc<SnapshotStore>,
    /// Last ticket handed to a refresh.
    issued: AtomicU64,
}

impl<C: CodeSource> CodeStoreClient<C> {
    pub fn new(source: Arc<C>, store: Arc<SnapshotStore>) -> Self {
        Self {
            source,
            store,
            issued: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Fetch a fresh snapshot without touching the store.
    ///
    /// Transport failures, HTTP errors, error payloads and malformed
    /// records all come back as [`CoreError::SourceUnavailable`].
    pub async fn fetch(&self) -> Result<Snapshot, CoreError> {
        let page = self
            .source
            .fetch_codes()
            .await
            .map_err(CoreError::from_source)?;
        Ok(snapshot_from_page(page, Utc::now())?)
    }

    /// Fetch and swap the result into the store.
    ///
    /// On failure the previous snapshot stays readable but is marked
    /// stale, and the error is returned. If a refresh issued after this
    /// one has already settled, this result is discarded and the store's
    /// current snapshot is returned instead.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let ticket = self.issued.fetch_add(1, Ordering::AcqRel) + 1;
        match self.fetch().await {
            Ok(snapshot) => {
                let (codes, active) = (snapshot.len(), snapshot.active_count());
                let source = snapshot.source().to_owned();
                if self.store.install(ticket, snapshot) {
                    info!(codes, active, %source, ticket, "code snapshot refreshed");
                } else {
                    debug!(ticket, "refresh overtaken by a later one");
                }
                Ok(self.store.current())
            }
            Err(e) => {
                warn!(error = %e, ticket, "code refresh failed");
                self.store.mark_stale(ticket, e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use promokit_api::{CodeRecord, CodesPage};
    use tokio::sync::{Notify, oneshot};

    use super::*;
    use crate::model::Freshness;

    /// Serves queued responses in order.
    struct ScriptedSource {
        replies: Mutex<Vec<Result<CodesPage, promokit_api::Error>>>,
    }

    impl ScriptedSource {
        fn new(mut replies: Vec<Result<CodesPage, promokit_api::Error>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    impl CodeSource for ScriptedSource {
        async fn fetch_codes(&self) -> Result<CodesPage, promokit_api::Error> {
            self.replies.lock().unwrap().pop().unwrap()
        }
    }

    /// Serves queued pages in order. A page with a gate is held back until
    /// the gate is released.
    struct GatedSource {
        replies: Mutex<Vec<(Option<oneshot::Receiver<()>>, CodesPage)>>,
        started: Notify,
    }

    impl GatedSource {
        fn new(mut replies: Vec<(Option<oneshot::Receiver<()>>, CodesPage)>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                started: Notify::new(),
            }
        }
    }

    impl CodeSource for GatedSource {
        async fn fetch_codes(&self) -> Result<CodesPage, promokit_api::Error> {
            let (gate, page) = self.replies.lock().unwrap().pop().unwrap();
            self.started.notify_one();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(page)
        }
    }

    fn labelled(source: &str, status: &str) -> CodesPage {
        let mut page = page(&[("1", "A1")]);
        page.source = source.into();
        page.codes[0].status = status.into();
        if status == "redeemed" {
            page.codes[0].redemption_date = Some("2024-03-03".into());
        }
        page
    }

    fn page(codes: &[(&str, &str)]) -> CodesPage {
        CodesPage {
            codes: codes
                .iter()
                .map(|(id, code)| CodeRecord {
                    id: (*id).into(),
                    code: (*code).into(),
                    description: String::new(),
                    bonus_item: None,
                    customer: None,
                    value: "$1".into(),
                    status: "active".into(),
                    redemption_date: None,
                })
                .collect(),
            source: "sheet".into(),
        }
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot() {
        let source = ScriptedSource::new(vec![
            Ok(page(&[("1", "A1")])),
            Ok(page(&[("1", "A1"), ("2", "B2")])),
        ]);
        let client = CodeStoreClient::new(Arc::new(source), Arc::new(SnapshotStore::new()));

        client.refresh().await.unwrap();
        assert_eq!(client.store().current().len(), 1);

        client.refresh().await.unwrap();
        let current = client.store().current();
        assert_eq!(current.len(), 2);
        assert_eq!(current.freshness(), &Freshness::Fresh);
    }

    #[tokio::test]
    async fn failed_refresh_marks_previous_stale() {
        let source = ScriptedSource::new(vec![
            Ok(page(&[("1", "A1")])),
            Err(promokit_api::Error::Timeout { timeout_secs: 30 }),
        ]);
        let client = CodeStoreClient::new(Arc::new(source), Arc::new(SnapshotStore::new()));

        client.refresh().await.unwrap();
        let err = client.refresh().await.unwrap_err();

        assert!(matches!(err, CoreError::SourceUnavailable { .. }));
        let current = client.store().current();
        assert_eq!(current.len(), 1);
        assert!(matches!(current.freshness(), Freshness::Stale { .. }));
    }

    #[tokio::test]
    async fn duplicate_active_codes_are_unavailable() {
        let source = ScriptedSource::new(vec![Ok(page(&[("1", "A1"), ("2", "a1")]))]);
        let client = CodeStoreClient::new(Arc::new(source), Arc::new(SnapshotStore::new()));

        let err = client.fetch().await.unwrap_err();
        assert!(err.to_string().contains("more than one record"));
    }

    #[tokio::test]
    async fn latest_issued_refresh_wins_over_slower_earlier_one() {
        let (release, gate) = oneshot::channel();
        let source = Arc::new(GatedSource::new(vec![
            (Some(gate), labelled("old", "active")),
            (None, labelled("new", "redeemed")),
        ]));
        let client = Arc::new(CodeStoreClient::new(
            Arc::clone(&source),
            Arc::new(SnapshotStore::new()),
        ));

        let slow = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.refresh().await }
        });
        source.started.notified().await;

        let fast = client.refresh().await.unwrap();
        assert_eq!(fast.source(), "new");

        release.send(()).unwrap();
        let late = slow.await.unwrap().unwrap();

        assert_eq!(late.source(), "new");
        let current = client.store().current();
        assert_eq!(current.source(), "new");
        assert_eq!(current.active_count(), 0);
        assert_eq!(current.freshness(), &Freshness::Fresh);
    }
}
