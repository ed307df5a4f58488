// ── Snapshot store ──
//
// Holds the one current snapshot, the client that refreshes it from the
// code source, and the channel used to ask for a refresh.

mod client;
mod refresh;
mod snapshot_store;

pub use client::CodeStoreClient;
pub use refresh::{RefreshReason, RefreshTrigger};
pub use snapshot_store::SnapshotStore;
