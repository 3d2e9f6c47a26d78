//! In-memory content tables plus the append-only snapshot log that backs
//! revision history.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;

use crate::jobs::domain::{
    JobApplication, JobCategory, JobOffer, LanguageCode, NewsletterSignup, NewsletterSignupUser,
    Translatable,
};

use super::restore;
use super::snapshot::{EntityId, EntityKind, EntityRef, SnapshotId, SnapshotRecord, Versioned};

#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    #[error("no snapshot at position {position} for {owner}")]
    NotFound { owner: EntityRef, position: usize },
    #[error("{reference} does not exist")]
    MissingEntity { reference: EntityRef },
    #[error("snapshot storage failure: {0}")]
    Storage(String),
}

/// Binds an entity type to its table inside [`StoreState`].
pub trait Stored: Versioned {
    #[doc(hidden)]
    fn table(state: &StoreState) -> &BTreeMap<EntityId, Self>;
    #[doc(hidden)]
    fn table_mut(state: &mut StoreState) -> &mut BTreeMap<EntityId, Self>;
}

/// Everything a transaction can touch: one table per entity kind and the
/// per-entity snapshot logs. Cloned wholesale at transaction entry.
#[derive(Debug, Default, Clone)]
pub struct StoreState {
    next_entity: u64,
    next_snapshot: u64,
    categories: BTreeMap<EntityId, JobCategory>,
    offers: BTreeMap<EntityId, JobOffer>,
    applications: BTreeMap<EntityId, JobApplication>,
    signups: BTreeMap<EntityId, NewsletterSignup>,
    signup_users: BTreeMap<EntityId, NewsletterSignupUser>,
    history: BTreeMap<EntityRef, Vec<SnapshotRecord>>,
}

impl StoreState {
    pub(crate) fn allocate_entity(&mut self) -> EntityId {
        self.next_entity += 1;
        EntityId(self.next_entity)
    }

    fn allocate_snapshot(&mut self) -> SnapshotId {
        self.next_snapshot += 1;
        SnapshotId(self.next_snapshot)
    }

    pub(crate) fn exists(&self, reference: &EntityRef) -> bool {
        match reference.kind {
            EntityKind::JobCategory => self.categories.contains_key(&reference.id),
            EntityKind::JobOffer => self.offers.contains_key(&reference.id),
            EntityKind::JobApplication => self.applications.contains_key(&reference.id),
            EntityKind::NewsletterSignup => self.signups.contains_key(&reference.id),
            EntityKind::NewsletterSignupUser => self.signup_users.contains_key(&reference.id),
        }
    }

    pub(crate) fn history_for(&self, owner: &EntityRef) -> &[SnapshotRecord] {
        self.history.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn fetch<T: Stored>(&self, id: EntityId) -> Option<&T> {
        T::table(self).get(&id)
    }

    pub(crate) fn put<T: Stored>(&mut self, entity: T) {
        T::table_mut(self).insert(entity.id(), entity);
    }

    /// Append one snapshot of `entity`'s current state to its log.
    pub(crate) fn record_snapshot<T: Stored>(&mut self, entity: &T) -> SnapshotId {
        let owner = entity.entity_ref();
        let id = self.allocate_snapshot();
        let body = entity.capture();
        let log = self.history.entry(owner).or_default();
        log.push(SnapshotRecord {
            id,
            owner,
            position: log.len() as u32 + 1,
            recorded_at: Utc::now(),
            body,
        });
        id
    }

    pub(crate) fn drop_history(&mut self, owner: &EntityRef) -> usize {
        self.history.remove(owner).map(|log| log.len()).unwrap_or(0)
    }
}

impl Stored for JobCategory {
    fn table(state: &StoreState) -> &BTreeMap<EntityId, Self> {
        &state.categories
    }

    fn table_mut(state: &mut StoreState) -> &mut BTreeMap<EntityId, Self> {
        &mut state.categories
    }
}

impl Stored for JobOffer {
    fn table(state: &StoreState) -> &BTreeMap<EntityId, Self> {
        &state.offers
    }

    fn table_mut(state: &mut StoreState) -> &mut BTreeMap<EntityId, Self> {
        &mut state.offers
    }
}

impl Stored for JobApplication {
    fn table(state: &StoreState) -> &BTreeMap<EntityId, Self> {
        &state.applications
    }

    fn table_mut(state: &mut StoreState) -> &mut BTreeMap<EntityId, Self> {
        &mut state.applications
    }
}

impl Stored for NewsletterSignup {
    fn table(state: &StoreState) -> &BTreeMap<EntityId, Self> {
        &state.signups
    }

    fn table_mut(state: &mut StoreState) -> &mut BTreeMap<EntityId, Self> {
        &mut state.signups
    }
}

impl Stored for NewsletterSignupUser {
    fn table(state: &StoreState) -> &BTreeMap<EntityId, Self> {
        &state.signup_users
    }

    fn table_mut(state: &mut StoreState) -> &mut BTreeMap<EntityId, Self> {
        &mut state.signup_users
    }
}

/// In-memory content store with revision tracking.
///
/// Tracked saves and restores run through [`ContentStore::transaction`]:
/// the closure works on a scratch copy of the state, which is committed
/// wholesale on `Ok` and discarded on `Err`, so concurrent readers never
/// observe a partial save or a partial restore.
#[derive(Debug, Default)]
pub struct ContentStore {
    inner: Mutex<StoreState>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // The scratch-copy commit keeps the guarded state coherent even if
        // a writer panicked, so a poisoned lock is recoverable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn transaction<T, E>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.state();
        let mut scratch = guard.clone();
        let value = f(&mut scratch)?;
        *guard = scratch;
        Ok(value)
    }

    /// Insert a record without recording history. The builder receives the
    /// allocated identity and must keep it.
    pub fn add<T, F>(&self, build: F) -> EntityId
    where
        T: Stored,
        F: FnOnce(EntityId) -> T,
    {
        let mut state = self.state();
        let id = state.allocate_entity();
        let entity = build(id);
        debug_assert_eq!(entity.id(), id);
        state.put(entity);
        id
    }

    /// Insert a record and append its first snapshot, atomically.
    pub fn add_tracked<T, F>(&self, build: F) -> Result<EntityId, RevisionError>
    where
        T: Stored,
        F: FnOnce(EntityId) -> T,
    {
        self.transaction(|state| {
            let id = state.allocate_entity();
            let entity = build(id);
            debug_assert_eq!(entity.id(), id);
            let owner = entity.entity_ref();
            let snapshot = state.record_snapshot(&entity);
            state.put(entity);
            debug!(owner = %owner, snapshot = %snapshot, "recorded create snapshot");
            Ok(id)
        })
    }

    /// Tracked save: mutate the record, persist it, and append exactly one
    /// snapshot of the post-save state, atomically. The snapshot captures
    /// the language that is active when the closure returns.
    pub fn save_tracked<T, F>(&self, id: EntityId, mutate: F) -> Result<SnapshotId, RevisionError>
    where
        T: Stored,
        F: FnOnce(&mut T),
    {
        self.transaction(|state| {
            let reference = EntityRef { kind: T::kind(), id };
            let mut entity = state
                .fetch::<T>(id)
                .cloned()
                .ok_or(RevisionError::MissingEntity { reference })?;
            mutate(&mut entity);
            let snapshot = state.record_snapshot(&entity);
            state.put(entity);
            debug!(owner = %reference, snapshot = %snapshot, "recorded save snapshot");
            Ok(snapshot)
        })
    }

    /// Tracked save under a temporary language context: the record's active
    /// language is switched to `language` for the closure and the capture,
    /// then restored before the record is persisted.
    pub fn save_tracked_in<T, F>(
        &self,
        id: EntityId,
        language: LanguageCode,
        mutate: F,
    ) -> Result<SnapshotId, RevisionError>
    where
        T: Stored + Translatable,
        F: FnOnce(&mut T),
    {
        self.transaction(|state| {
            let reference = EntityRef { kind: T::kind(), id };
            let mut entity = state
                .fetch::<T>(id)
                .cloned()
                .ok_or(RevisionError::MissingEntity { reference })?;
            let prior = entity.active_language();
            entity.set_active_language(language);
            mutate(&mut entity);
            let snapshot = state.record_snapshot(&entity);
            entity.set_active_language(prior);
            state.put(entity);
            debug!(owner = %reference, snapshot = %snapshot, "recorded save snapshot");
            Ok(snapshot)
        })
    }

    pub fn get<T: Stored>(&self, id: EntityId) -> Option<T> {
        self.state().fetch::<T>(id).cloned()
    }

    pub fn all<T: Stored>(&self) -> Vec<T> {
        T::table(&self.state()).values().cloned().collect()
    }

    pub fn count<T: Stored>(&self) -> usize {
        T::table(&self.state()).len()
    }

    /// Delete a record. Its snapshot history stays behind; restores that
    /// reference the dead identity read it to recreate the record.
    pub fn remove<T: Stored>(&self, id: EntityId) -> Result<(), RevisionError> {
        let reference = EntityRef { kind: T::kind(), id };
        let mut state = self.state();
        T::table_mut(&mut state)
            .remove(&id)
            .map(|_| ())
            .ok_or(RevisionError::MissingEntity { reference })
    }

    /// Full history for a record, oldest first. Empty if never tracked.
    pub fn snapshots<T: Stored>(&self, id: EntityId) -> Vec<SnapshotRecord> {
        let owner = EntityRef { kind: T::kind(), id };
        self.state().history_for(&owner).to_vec()
    }

    /// 1-based positional lookup into a record's history. Stored snapshot
    /// ids are shared across entities and play no part in ordering.
    pub fn snapshot_at<T: Stored>(
        &self,
        id: EntityId,
        position: usize,
    ) -> Result<SnapshotRecord, RevisionError> {
        let owner = EntityRef { kind: T::kind(), id };
        let state = self.state();
        position
            .checked_sub(1)
            .and_then(|index| state.history_for(&owner).get(index))
            .cloned()
            .ok_or(RevisionError::NotFound { owner, position })
    }

    /// Cascade delete of a record's entire history. Returns the number of
    /// snapshots dropped.
    pub fn purge_history<T: Stored>(&self, id: EntityId) -> usize {
        let owner = EntityRef { kind: T::kind(), id };
        self.state().drop_history(&owner)
    }

    /// Restore a record to the state captured at `position` (1-based,
    /// oldest first), atomically. See the `restore` module for the
    /// per-language merge rules.
    pub fn revert_to<T: Stored>(&self, id: EntityId, position: usize) -> Result<(), RevisionError> {
        self.transaction(|state| restore::revert_entity::<T>(state, id, position))
    }
}
