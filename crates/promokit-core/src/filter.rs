// ── Query / filter layer ──
//
// Pure functions over a snapshot. Used by the desk for search and by the
// CLI's `--status` / `--search` flags without re-querying the source.

use crate::model::{PromoCode, Snapshot, StatusKind};

/// Case-insensitive substring search over code, description, customer and
/// bonus item. Any one field matching is enough. A blank term matches
/// everything. Snapshot order is preserved.
pub fn filter(snapshot: &Snapshot, term: &str) -> Vec<PromoCode> {
    let needle = term.trim().to_lowercase();
    snapshot
        .codes()
        .iter()
        .filter(|c| matches_term(c, &needle))
        .cloned()
        .collect()
}

/// Apply a [`CodeFilter`] and a search term together.
pub fn select(snapshot: &Snapshot, predicate: &CodeFilter, term: &str) -> Vec<PromoCode> {
    let needle = term.trim().to_lowercase();
    snapshot
        .codes()
        .iter()
        .filter(|c| predicate.matches(c) && matches_term(c, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be trimmed and lowercased.
fn matches_term(code: &PromoCode, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let hit = |field: &str| field.to_lowercase().contains(needle);
    hit(&code.code)
        || hit(&code.description)
        || code.customer.as_deref().is_some_and(hit)
        || code.bonus_item.as_deref().is_some_and(hit)
}

/// Filter predicate for code collections.
pub enum CodeFilter {
    All,
    ByStatus(StatusKind),
    Search(String),
    Custom(Box<dyn Fn(&PromoCode) -> bool + Send + Sync>),
}

impl CodeFilter {
    pub fn matches(&self, code: &PromoCode) -> bool {
        match self {
            Self::All => true,
            Self::ByStatus(kind) => code.status.kind() == *kind,
            Self::Search(term) => matches_term(code, &term.trim().to_lowercase()),
            Self::Custom(f) => f(code),
        }
    }
}
