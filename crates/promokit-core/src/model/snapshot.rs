// ── Code snapshot ──
//
// An immutable, fully-validated view of every code the source listed at
// one point in time. Snapshots are replaced wholesale, never patched:
// "mutations" like `with_redeemed` return a new value.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::promo_code::{CodeId, PromoCode, normalize_code};
use crate::error::DataError;

/// How far the snapshot can be trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Freshness {
    /// Nothing fetched yet.
    #[default]
    Unloaded,
    /// Straight from the code source.
    Fresh,
    /// Patched locally after a redemption; a refresh is outstanding.
    Pending,
    /// The last refresh failed; contents are from an earlier fetch.
    Stale { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    codes: Vec<PromoCode>,
    source: String,
    fetched_at: Option<DateTime<Utc>>,
    freshness: Freshness,
}

impl Snapshot {
    /// The placeholder held before the first successful fetch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a fresh snapshot, rejecting payloads that break the
    /// uniqueness rules (ids unique, active codes unique ignoring case).
    pub fn new(
        codes: Vec<PromoCode>,
        source: impl Into<String>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Self, DataError> {
        let mut ids = HashSet::with_capacity(codes.len());
        let mut active = HashSet::new();
        for code in &codes {
            if !ids.insert(&code.id) {
                return Err(DataError::DuplicateId {
                    id: code.id.to_string(),
                });
            }
            if code.is_active() && !active.insert(normalize_code(&code.code)) {
                return Err(DataError::DuplicateActiveCode {
                    code: code.code.clone(),
                });
            }
        }

        Ok(Self {
            codes,
            source: source.into(),
            fetched_at: Some(fetched_at),
            freshness: Freshness::Fresh,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn codes(&self) -> &[PromoCode] {
        &self.codes
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn freshness(&self) -> &Freshness {
        &self.freshness
    }

    pub fn is_loaded(&self) -> bool {
        !matches!(self.freshness, Freshness::Unloaded)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.codes.iter().filter(|c| c.is_active()).count()
    }

    pub fn redeemed_count(&self) -> usize {
        self.len() - self.active_count()
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn get(&self, id: &CodeId) -> Option<&PromoCode> {
        self.codes.iter().find(|c| &c.id == id)
    }

    /// Find the record a customer means by `submitted`.
    ///
    /// Redeemed records may share a token with an active one (a code that
    /// was re-issued); the active record always wins.
    pub fn find(&self, submitted: &str) -> Option<&PromoCode> {
        let needle = normalize_code(submitted);
        if needle.is_empty() {
            return None;
        }
        let mut redeemed = None;
        for code in &self.codes {
            if normalize_code(&code.code) != needle {
                continue;
            }
            if code.is_active() {
                return Some(code);
            }
            redeemed.get_or_insert(code);
        }
        redeemed
    }

    // ── Derived snapshots ────────────────────────────────────────────

    /// A `Pending` copy with record `id` marked redeemed on `date`.
    /// Unknown ids leave the codes untouched.
    #[must_use]
    pub fn with_redeemed(&self, id: &CodeId, date: &str) -> Self {
        let codes = self
            .codes
            .iter()
            .map(|c| {
                if &c.id == id && c.is_active() {
                    c.redeemed(date)
                } else {
                    c.clone()
                }
            })
            .collect();
        Self {
            codes,
            source: self.source.clone(),
            fetched_at: self.fetched_at,
            freshness: Freshness::Pending,
        }
    }

    #[must_use]
    pub fn with_freshness(&self, freshness: Freshness) -> Self {
        Self {
            freshness,
            ..self.clone()
        }
    }
}
