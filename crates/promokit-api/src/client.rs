// Promo collaborator HTTP client
//
// Wraps `reqwest::Client` with cache-busting reads, timeout mapping and
// raw-body capture. The endpoint calls themselves (code listing,
// redemption) live in separate files as inherent methods to keep this
// module focused on transport mechanics.

use chrono::Utc;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Query parameter appended to every read so intermediate caches miss.
pub const CACHE_BUST_PARAM: &str = "_ts";

/// Raw HTTP response: status plus the full body text.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: reqwest::StatusCode,
    pub body: String,
}

/// Async client for the code source and the redemption sink.
///
/// The two collaborators may live at the same URL (one deployment
/// answering GET with the code list and POST with redemptions) or at
/// different ones.
pub struct PromoClient {
    http: reqwest::Client,
    source_url: Url,
    redeem_url: Url,
    timeout_secs: u64,
}

impl PromoClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        source_url: Url,
        redeem_url: Url,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            source_url,
            redeem_url,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, source_url: Url, redeem_url: Url) -> Self {
        Self {
            http,
            source_url,
            redeem_url,
            timeout_secs: 0,
        }
    }

    /// The code source URL.
    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    /// The redemption sink URL.
    pub fn redeem_url(&self) -> &Url {
        &self.redeem_url
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET with every cache-bypass measure applied: `no-store` request
    /// headers and a unique `_ts` query parameter.
    pub(crate) async fn get_uncached(&self, url: &Url) -> Result<RawResponse, Error> {
        let url = cache_busted(url);
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store, max-age=0")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read(resp).await
    }

    /// POST a JSON body.
    pub(crate) async fn post_json(
        &self,
        url: &Url,
        body: &impl Serialize,
    ) -> Result<RawResponse, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.read(resp).await
    }

    async fn read(&self, resp: reqwest::Response) -> Result<RawResponse, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(RawResponse { status, body })
    }

    /// Timeouts become `Error::Timeout` so callers can tell them apart
    /// without digging into `reqwest` internals.
    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Preview of a response body for error messages.
pub(crate) fn body_preview(body: &str) -> String {
    body.chars().take(200).collect()
}

fn cache_busted(url: &Url) -> Url {
    let mut url = url.clone();
    let stamp = Utc::now().timestamp_millis().to_string();
    url.query_pairs_mut().append_pair(CACHE_BUST_PARAM, &stamp);
    url
}
