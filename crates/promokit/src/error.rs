//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a distinct process exit code.

use miette::Diagnostic;
use thiserror::Error;

use promokit_config::ConfigError;
use promokit_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const REJECTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Collaborators ────────────────────────────────────────────────
    #[error("Could not load promo codes")]
    #[diagnostic(
        code(promokit::source_unavailable),
        help(
            "The code source did not return a usable code list.\n\
             Detail: {detail}\n\
             Check the source URL with: promokit config show"
        )
    )]
    SourceUnavailable { detail: String },

    #[error("Redemption status unknown: {reason}")]
    #[diagnostic(
        code(promokit::sink_unreachable),
        help(
            "The redemption service may or may not have recorded it.\n\
             Check with: promokit codes get <CODE>"
        )
    )]
    SinkUnreachable { reason: String },

    #[error("Request timed out: {detail}")]
    #[diagnostic(
        code(promokit::timeout),
        help("Increase timeout with --timeout or check the collaborator's responsiveness.")
    )]
    Timeout { detail: String },

    // ── Codes ────────────────────────────────────────────────────────
    #[error("Promo code '{code}' not found")]
    #[diagnostic(
        code(promokit::not_found),
        help("Run: promokit codes list --search <TERM> to look it up")
    )]
    CodeNotFound { code: String },

    #[error("Promo code '{code}' was already redeemed on {redemption_date}")]
    #[diagnostic(code(promokit::already_redeemed))]
    AlreadyRedeemed {
        code: String,
        redemption_date: String,
    },

    #[error("Redemption rejected: {message}")]
    #[diagnostic(code(promokit::rejected))]
    Rejected { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(promokit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(promokit::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: promokit config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No code source configured")]
    #[diagnostic(
        code(promokit::no_config),
        help(
            "Create a profile with: promokit config init\n\
             Or pass --source <URL>.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(promokit::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(promokit::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Aborted")]
    #[diagnostic(code(promokit::aborted))]
    Aborted,

    #[error("Internal error: {0}")]
    #[diagnostic(code(promokit::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SourceUnavailable { .. } | Self::SinkUnreachable { .. } => {
                exit_code::CONNECTION
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::CodeNotFound { .. } => exit_code::NOT_FOUND,
            Self::AlreadyRedeemed { .. } => exit_code::CONFLICT,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SourceUnavailable {
                detail,
                timed_out: true,
            }
            | CoreError::SinkUnreachable {
                reason: detail,
                timed_out: true,
            } => Self::Timeout { detail },
            CoreError::SourceUnavailable { detail, .. } => Self::SourceUnavailable { detail },
            CoreError::SinkUnreachable { reason, .. } => Self::SinkUnreachable { reason },
            CoreError::CodeNotFound { code } => Self::CodeNotFound { code },
            CoreError::AlreadyRedeemed {
                code,
                redemption_date,
            } => Self::AlreadyRedeemed {
                code,
                redemption_date,
            },
            CoreError::SinkRejected { message } => Self::Rejected { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Disconnected => Self::Internal("desk disconnected mid-command".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_distinct_exit_codes() {
        let cases = [
            (
                CoreError::CodeNotFound { code: "X".into() },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::AlreadyRedeemed {
                    code: "B2".into(),
                    redemption_date: "2024-01-01".into(),
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::SinkRejected {
                    message: "Code expired".into(),
                },
                exit_code::REJECTED,
            ),
            (
                CoreError::SinkUnreachable {
                    reason: "Unexpected HTTP 502: bad gateway".into(),
                    timed_out: false,
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::SourceUnavailable {
                    detail: "Request timed out after 2s".into(),
                    timed_out: true,
                },
                exit_code::TIMEOUT,
            ),
            (
                CoreError::SinkUnreachable {
                    reason: "Request timed out after 5s".into(),
                    timed_out: true,
                },
                exit_code::TIMEOUT,
            ),
        ];

        for (core, expected) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), expected, "{label}");
        }
    }

    #[test]
    fn timeout_wording_alone_is_not_a_timeout() {
        let err = CliError::from(CoreError::SourceUnavailable {
            detail: "Code source reported an error: sheet timed out".into(),
            timed_out: false,
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn rejection_message_is_verbatim() {
        let err = CliError::from(CoreError::SinkRejected {
            message: "Code expired".into(),
        });
        assert_eq!(err.to_string(), "Redemption rejected: Code expired");
    }
}
