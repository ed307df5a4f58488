//! Promo code redemption core between `promokit-api` and consumers (CLI, UIs).
//!
//! This crate owns the redemption business logic. It reads promo codes from
//! a code source, keeps one validated in-memory snapshot of them, and sends
//! redemptions to a sink that enforces single use.
//!
//! - **[`Desk`]**: the central facade. It manages the snapshot, the
//!   background refresh worker and redemption submission.
//!   [`Desk::oneshot`] connects, runs one closure and disconnects, which
//!   suits the CLI.
//!
//! - **[`SnapshotStore`]**: holds the current [`Snapshot`] in a `watch`
//!   channel. Every refresh replaces it wholesale. Use [`Desk::subscribe`]
//!   to get a [`SnapshotStream`] of replacements.
//!
//! - **[`RedemptionEngine`]**: a pure snapshot check ([`engine::validate`])
//!   followed by one sink call. The snapshot check is only a fast path. The
//!   sink's compare-and-set is the single authority on at-most-once
//!   redemption.
//!
//! - **[`filter`]**: case-insensitive search and status predicates over a
//!   snapshot.
//!
//! - **[`Notice`]**: every outcome, expressed as something to show a person.
//!
//! - **Collaborators** ([`CodeSource`], [`RedemptionSink`]): the trait seams
//!   for the two external systems. `PromoClient` implements both.

pub mod collaborator;
pub mod config;
pub mod convert;
pub mod desk;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod notice;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collaborator::{CodeSource, RedemptionSink};
pub use config::{DeskConfig, TlsVerification};
pub use desk::{ConnectionState, Desk};
pub use engine::RedemptionEngine;
pub use error::{CoreError, DataError, ErrorKind};
pub use filter::CodeFilter;
pub use notice::{Notice, NoticeLevel};
pub use store::{CodeStoreClient, RefreshReason, RefreshTrigger, SnapshotStore};
pub use stream::SnapshotStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CodeId, CodeStatus, Freshness, PromoCode, RedemptionAttempt, RedemptionResult, Snapshot,
    StatusKind,
};
