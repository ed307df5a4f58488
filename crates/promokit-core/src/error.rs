// ── Core error types ──
//
// User-facing redemption errors. Consumers never see HTTP status codes or
// JSON parse failures directly. The same transport failure means different
// things depending on which collaborator it came from, so there is no blanket
// `From<promokit_api::Error>`: use `CoreError::from_source` for reads and
// `CoreError::from_sink` for redemptions.

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Unified error type for the core crate.
///
/// No variant is fatal: every failure is per-request and leaves the
/// [`Desk`](crate::Desk) ready for the next call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Code source ──────────────────────────────────────────────────
    /// `timed_out` is set when the source never answered in time.
    #[error("Promo codes unavailable: {detail}")]
    SourceUnavailable { detail: String, timed_out: bool },

    // ── Local validation ─────────────────────────────────────────────
    #[error("Promo code '{code}' not found")]
    CodeNotFound { code: String },

    #[error("Promo code '{code}' was already redeemed on {redemption_date}")]
    AlreadyRedeemed {
        code: String,
        redemption_date: String,
    },

    // ── Redemption sink ──────────────────────────────────────────────
    #[error("Redemption rejected: {message}")]
    SinkRejected { message: String },

    #[error("Redemption service unreachable: {reason}")]
    SinkUnreachable { reason: String, timed_out: bool },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Desk is disconnected")]
    Disconnected,
}

/// Flat discriminant of [`CoreError`], for notices and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SourceUnavailable,
    CodeNotFound,
    AlreadyRedeemed,
    SinkRejected,
    SinkUnreachable,
    Config,
    Disconnected,
}

/// A code source payload that could not be turned into a valid snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("record '{id}' has an empty code")]
    EmptyCode { id: String },

    #[error("record '{id}' has unknown status '{status}'")]
    UnknownStatus { id: String, status: String },

    #[error("record '{id}' is redeemed but has no redemption date")]
    MissingRedemptionDate { id: String },

    #[error("id '{id}' appears more than once")]
    DuplicateId { id: String },

    #[error("code '{code}' is active in more than one record")]
    DuplicateActiveCode { code: String },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceUnavailable { .. } => ErrorKind::SourceUnavailable,
            Self::CodeNotFound { .. } => ErrorKind::CodeNotFound,
            Self::AlreadyRedeemed { .. } => ErrorKind::AlreadyRedeemed,
            Self::SinkRejected { .. } => ErrorKind::SinkRejected,
            Self::SinkUnreachable { .. } => ErrorKind::SinkUnreachable,
            Self::Config { .. } => ErrorKind::Config,
            Self::Disconnected => ErrorKind::Disconnected,
        }
    }

    /// Returns `true` if simply trying again may succeed.
    ///
    /// `SinkRejected` is terminal by default: the sink's message decides,
    /// and the core cannot interpret it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::SinkUnreachable { .. }
        )
    }

    /// Returns `true` if a collaborator failed to answer within the
    /// configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable {
                timed_out: true,
                ..
            } | Self::SinkUnreachable {
                timed_out: true,
                ..
            }
        )
    }

    /// Returns `true` if the local snapshot must be re-fetched before it
    /// can be trusted again. The sink was contacted, so the system of
    /// record may have changed under us.
    pub fn requires_refresh(&self) -> bool {
        matches!(
            self,
            Self::SinkRejected { .. } | Self::SinkUnreachable { .. }
        )
    }

    /// Map a failed code read. Every failure collapses into
    /// `SourceUnavailable` with a readable detail.
    pub fn from_source(err: promokit_api::Error) -> Self {
        let timed_out = err.is_timeout();
        let detail = match err {
            promokit_api::Error::SourceReported {
                message,
                details: Some(details),
            } => format!("{message} ({details})"),
            promokit_api::Error::SourceReported {
                message,
                details: None,
            } => message,
            promokit_api::Error::Deserialization { message, body: _ } => {
                format!("malformed response: {message}")
            }
            other => other.to_string(),
        };
        Self::SourceUnavailable { detail, timed_out }
    }

    /// Map a redemption call that produced no explicit sink verdict.
    ///
    /// An HTTP error the sink answered deliberately is its verdict; one
    /// that leaves the outcome open is `SinkUnreachable`.
    pub fn from_sink(err: promokit_api::Error) -> Self {
        let ambiguous = err.is_ambiguous();
        let timed_out = err.is_timeout();
        match err {
            promokit_api::Error::Http { message, .. } if !ambiguous => {
                Self::SinkRejected { message }
            }
            promokit_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("invalid redemption URL: {e}"),
            },
            promokit_api::Error::InvalidApiKey(reason) => Self::Config {
                message: format!("invalid API key: {reason}"),
            },
            promokit_api::Error::SourceReported { message, .. } => {
                Self::SinkRejected { message }
            }
            promokit_api::Error::Deserialization { message, body: _ } => Self::SinkUnreachable {
                reason: format!("unreadable sink response: {message}"),
                timed_out: false,
            },
            other => Self::SinkUnreachable {
                reason: other.to_string(),
                timed_out,
            },
        }
    }
}

impl From<DataError> for CoreError {
    fn from(err: DataError) -> Self {
        Self::SourceUnavailable {
            detail: format!("malformed code list: {err}"),
            timed_out: false,
        }
    }
}
