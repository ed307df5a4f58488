// ── API-to-domain type conversions ──
//
// Bridges raw `promokit_api` records into canonical `promokit_core::model`
// types. Unlike a lenient display mapping, a record that cannot be trusted
// (no code, unknown status, redeemed without a date) fails the whole
// snapshot: redemption decisions must never run on guessed data.

use chrono::{DateTime, Utc};
use tracing::warn;

use promokit_api::{CodeRecord, CodesPage};

use crate::error::DataError;
use crate::model::{CodeId, CodeStatus, PromoCode, Snapshot, StatusKind};

// ── Helpers ────────────────────────────────────────────────────────

/// Blank optional text is absent text.
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

// ── PromoCode ──────────────────────────────────────────────────────

impl TryFrom<CodeRecord> for PromoCode {
    type Error = DataError;

    fn try_from(r: CodeRecord) -> Result<Self, Self::Error> {
        let code = r.code.trim().to_owned();
        if code.is_empty() {
            return Err(DataError::EmptyCode { id: r.id });
        }

        let kind: StatusKind =
            r.status
                .trim()
                .parse()
                .map_err(|_| DataError::UnknownStatus {
                    id: r.id.clone(),
                    status: r.status.clone(),
                })?;

        let date = non_blank(r.redemption_date);
        let status = match (kind, date) {
            (StatusKind::Redeemed, Some(redemption_date)) => {
                CodeStatus::Redeemed { redemption_date }
            }
            (StatusKind::Redeemed, None) => {
                return Err(DataError::MissingRedemptionDate { id: r.id });
            }
            (StatusKind::Active, Some(date)) => {
                warn!(id = %r.id, %date, "active code carries a redemption date, ignoring it");
                CodeStatus::Active
            }
            (StatusKind::Active, None) => CodeStatus::Active,
        };

        Ok(Self {
            id: CodeId::from(r.id),
            code,
            description: r.description,
            bonus_item: non_blank(r.bonus_item),
            customer: non_blank(r.customer),
            value: r.value,
            status,
        })
    }
}

// ── Snapshot ───────────────────────────────────────────────────────

/// Convert a full code listing into a validated snapshot.
pub fn snapshot_from_page(
    page: CodesPage,
    fetched_at: DateTime<Utc>,
) -> Result<Snapshot, DataError> {
    let codes = page
        .codes
        .into_iter()
        .map(PromoCode::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Snapshot::new(codes, page.source, fetched_at)
}
