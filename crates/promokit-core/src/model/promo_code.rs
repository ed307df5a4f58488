// ── Promo code domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ── CodeId ──────────────────────────────────────────────────────────

/// Opaque, stable identifier assigned by the code source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeId(String);

impl CodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CodeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── Status ──────────────────────────────────────────────────────────

/// Lifecycle state of a code. `Redeemed` is terminal and is the only
/// state that carries a redemption date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CodeStatus {
    Active,
    Redeemed { redemption_date: String },
}

/// Flat status discriminant, parsed case-insensitively from source data.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Active,
    Redeemed,
}

impl CodeStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Active => StatusKind::Active,
            Self::Redeemed { .. } => StatusKind::Redeemed,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn redemption_date(&self) -> Option<&str> {
        match self {
            Self::Active => None,
            Self::Redeemed { redemption_date } => Some(redemption_date),
        }
    }
}

// ── PromoCode ───────────────────────────────────────────────────────

/// A single promotional code as known to the local snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: CodeId,
    /// Human-entered token. Matching is case-insensitive.
    pub code: String,
    pub description: String,
    pub bonus_item: Option<String>,
    pub customer: Option<String>,
    /// Display value, never interpreted.
    pub value: String,
    #[serde(flatten)]
    pub status: CodeStatus,
}

impl PromoCode {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn redemption_date(&self) -> Option<&str> {
        self.status.redemption_date()
    }

    /// Whether `submitted` names this code once both sides are normalized.
    pub fn matches_code(&self, submitted: &str) -> bool {
        normalize_code(&self.code) == normalize_code(submitted)
    }

    /// A copy of this record transitioned to `Redeemed`.
    #[must_use]
    pub fn redeemed(&self, redemption_date: impl Into<String>) -> Self {
        Self {
            status: CodeStatus::Redeemed {
                redemption_date: redemption_date.into(),
            },
            ..self.clone()
        }
    }
}

/// Canonical form used for code comparison: trimmed and lowercased.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_lowercase()
}

// ── Redemption ──────────────────────────────────────────────────────

/// One customer submission. Ephemeral: created per engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionAttempt {
    pub submitted_code: String,
    pub timestamp: DateTime<Utc>,
}

impl RedemptionAttempt {
    pub fn new(submitted_code: impl Into<String>) -> Self {
        Self {
            submitted_code: submitted_code.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.submitted_code.trim().is_empty()
    }
}

/// Outcome of a redemption the sink accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedemptionResult {
    pub id: CodeId,
    pub code: String,
    pub description: String,
    pub redeemed_at: DateTime<Utc>,
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn code(token: &str) -> PromoCode {
        PromoCode {
            id: CodeId::from("c-1"),
            code: token.into(),
            description: "Free dessert".into(),
            bonus_item: None,
            customer: Some("Acme".into()),
            value: "$10".into(),
            status: CodeStatus::Active,
        }
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        let promo = code("Temple2024");
        assert!(promo.matches_code("  TEMPLE2024 "));
        assert!(promo.matches_code("temple2024"));
        assert!(!promo.matches_code("TEMPLE202"));
    }

    #[test]
    fn redeemed_copy_carries_date() {
        let promo = code("A1");
        let done = promo.redeemed("2024-05-01");
        assert!(promo.is_active());
        assert!(!done.is_active());
        assert_eq!(done.redemption_date(), Some("2024-05-01"));
        assert_eq!(done.code, "A1");
    }

    #[test]
    fn status_kind_parses_case_insensitively() {
        assert_eq!("ACTIVE".parse::<StatusKind>().unwrap(), StatusKind::Active);
        assert_eq!("Redeemed".parse::<StatusKind>().unwrap(), StatusKind::Redeemed);
        assert!("expired".parse::<StatusKind>().is_err());
    }

    #[test]
    fn serializes_status_flat() {
        let json = serde_json::to_value(code("A1").redeemed("2024-01-01")).unwrap();
        assert_eq!(json["status"], "redeemed");
        assert_eq!(json["redemption_date"], "2024-01-01");
        assert_eq!(json["id"], "c-1");
    }

    #[test]
    fn blank_attempts_are_whitespace_only() {
        let attempt = RedemptionAttempt::new(" Ab1 ");
        assert!(!attempt.is_blank());
        assert!(RedemptionAttempt::new("   ").is_blank());
    }
}
