// ── Collaborator seams ──
//
// The core talks to exactly two external systems: a code source it reads
// and a redemption sink it writes. Both are traits so the desk can run
// against in-memory fakes in tests; `PromoClient` implements both.

use std::future::Future;

use promokit_api::{CodesPage, PromoClient, RedeemResponse};

/// Read side: lists every code the system of record knows about.
pub trait CodeSource: Send + Sync + 'static {
    /// Fetch the full current listing. Must not be served from a cache.
    fn fetch_codes(&self) -> impl Future<Output = Result<CodesPage, promokit_api::Error>> + Send;
}

/// Write side: durably records a redemption.
///
/// Implementations are the only authoritative guard against double
/// redemption. They must perform an atomic compare-and-set keyed by the
/// code, so that of two concurrent requests for one code at most one
/// answers `success: true`.
pub trait RedemptionSink: Send + Sync + 'static {
    /// Submit `code`. `Ok` carries the sink's verdict, `Err` means no
    /// verdict was obtained.
    fn submit_redemption(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<RedeemResponse, promokit_api::Error>> + Send;
}

impl CodeSource for PromoClient {
    async fn fetch_codes(&self) -> Result<CodesPage, promokit_api::Error> {
        self.list_codes().await
    }
}

impl RedemptionSink for PromoClient {
    async fn submit_redemption(&self, code: &str) -> Result<RedeemResponse, promokit_api::Error> {
        self.redeem_code(code).await
    }
}
