use thiserror::Error;

/// Top-level error type for the `promokit-api` crate.
///
/// Covers every failure mode across both collaborator endpoints: transport,
/// HTTP status, collaborator-reported errors and payload decoding.
/// `promokit-core` maps these into redemption-domain kinds; which kind
/// depends on whether the failing call was a code read or a redemption.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The API key could not be encoded as a header value.
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    // ── Collaborator responses ──────────────────────────────────────
    /// Non-success HTTP status without a recognizable payload.
    #[error("Unexpected HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The code source answered with its explicit error shape
    /// (`error: true` or `source: "error"`).
    #[error("Code source reported an error: {message}")]
    SourceReported {
        message: String,
        details: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request may have reached the collaborator but
    /// no trustworthy answer came back.
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Self::Transport(e) => !e.is_connect() && !e.is_builder(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the collaborator did not answer in time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
