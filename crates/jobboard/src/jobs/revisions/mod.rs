//! Revision tracking for board content: tracked saves append immutable
//! snapshots, lookups are positional, and reverts reconcile divergent
//! per-language edit timelines while recreating deleted relations.

mod restore;
mod snapshot;
mod store;

#[cfg(test)]
mod tests;

pub use snapshot::{
    EntityId, EntityKind, EntityRef, FieldValue, SnapshotBody, SnapshotId, SnapshotRecord,
    Versioned,
};
pub use store::{ContentStore, RevisionError, StoreState, Stored};
