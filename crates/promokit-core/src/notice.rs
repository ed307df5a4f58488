// ── User-facing notices ──
//
// What the presentation layer should tell the person at the desk. The
// desk broadcasts one notice per outcome; renderers only pick colors.

use serde::Serialize;
use strum::Display;

use crate::error::{CoreError, ErrorKind};
use crate::model::RedemptionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    /// Set when the notice reports a failure.
    pub kind: Option<ErrorKind>,
}

impl Notice {
    pub fn redeemed(result: &RedemptionResult) -> Self {
        let message = match &result.message {
            Some(extra) => format!("{}: {} ({extra})", result.code, result.description),
            None => format!("{}: {}", result.code, result.description),
        };
        Self {
            level: NoticeLevel::Success,
            title: "Code redeemed".into(),
            message,
            kind: None,
        }
    }

    pub fn refreshed(codes: usize) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: "Codes refreshed".into(),
            message: format!("{codes} codes loaded"),
            kind: None,
        }
    }

    /// The single place errors become wording.
    ///
    /// `SourceUnavailable` is presented as a setup problem rather than a
    /// transient hiccup: a desk with no codes cannot redeem anything.
    pub fn from_error(err: &CoreError) -> Self {
        let (level, title, message) = match err {
            CoreError::SourceUnavailable { detail, .. } => (
                NoticeLevel::Error,
                "Configuration error",
                format!("Promo codes could not be loaded: {detail}"),
            ),
            CoreError::CodeNotFound { code } if code.is_empty() => (
                NoticeLevel::Warning,
                "Enter a code",
                "Type a promo code to redeem.".to_owned(),
            ),
            CoreError::CodeNotFound { code } => (
                NoticeLevel::Warning,
                "Invalid code",
                format!("'{code}' is not a valid promo code."),
            ),
            CoreError::AlreadyRedeemed {
                code,
                redemption_date,
            } => (
                NoticeLevel::Warning,
                "Already redeemed",
                format!("'{code}' was already redeemed on {redemption_date}."),
            ),
            CoreError::SinkRejected { message } => {
                (NoticeLevel::Error, "Redemption failed", message.clone())
            }
            CoreError::SinkUnreachable { reason, .. } => (
                NoticeLevel::Error,
                "Redemption status unknown",
                format!(
                    "Could not confirm the redemption ({reason}). Codes are being \
                     refreshed; check the code before trying again."
                ),
            ),
            CoreError::Config { message } => {
                (NoticeLevel::Error, "Configuration error", message.clone())
            }
            CoreError::Disconnected => (
                NoticeLevel::Error,
                "Disconnected",
                "The desk is no longer connected.".to_owned(),
            ),
        };
        Self {
            level,
            title: title.to_owned(),
            message,
            kind: Some(err.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::CodeId;

    #[test]
    fn source_unavailable_is_configuration_error() {
        let notice = Notice::from_error(&CoreError::SourceUnavailable {
            detail: "HTTP 500".into(),
            timed_out: false,
        });
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Configuration error");
        assert_eq!(notice.kind, Some(ErrorKind::SourceUnavailable));
    }

    #[test]
    fn already_redeemed_names_the_date() {
        let notice = Notice::from_error(&CoreError::AlreadyRedeemed {
            code: "B2".into(),
            redemption_date: "2024-01-01".into(),
        });
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("2024-01-01"));
    }

    #[test]
    fn rejection_message_is_verbatim() {
        let notice = Notice::from_error(&CoreError::SinkRejected {
            message: "Expired".into(),
        });
        assert_eq!(notice.message, "Expired");
    }

    #[test]
    fn blank_code_asks_for_input() {
        let notice = Notice::from_error(&CoreError::CodeNotFound {
            code: String::new(),
        });
        assert_eq!(notice.title, "Enter a code");
    }

    #[test]
    fn success_notice_shows_description() {
        let notice = Notice::redeemed(&RedemptionResult {
            id: CodeId::from("1"),
            code: "A1".into(),
            description: "Free dessert".into(),
            redeemed_at: Utc::now(),
            message: None,
        });
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "A1: Free dessert");
        assert!(notice.kind.is_none());
    }
}
