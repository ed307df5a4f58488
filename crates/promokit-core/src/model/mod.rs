// ── Domain model ──
//
// Canonical promo code types. The wire records from promokit-api are
// converted into these (see `convert`) and nothing outside the core sees
// the raw JSON shape.

pub mod promo_code;
pub mod snapshot;

// ── Re-exports ──────────────────────────────────────────────────────

pub use promo_code::{
    CodeId, CodeStatus, PromoCode, RedemptionAttempt, RedemptionResult, StatusKind,
    normalize_code,
};
pub use snapshot::{Freshness, Snapshot};
