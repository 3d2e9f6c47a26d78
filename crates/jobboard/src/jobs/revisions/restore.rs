//! Translation-aware revert and recreation of deleted relations.
//!
//! A snapshot carries translated fields for exactly one language, so
//! rebuilding a record at a history position is a merge: the target
//! snapshot supplies its own language (and all plain fields), every other
//! language takes its nearest snapshot at or before the target, and a
//! language with no snapshot in that range is dropped.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::jobs::domain::{
    JobApplication, JobCategory, JobOffer, LanguageCode, NewsletterSignup, NewsletterSignupUser,
};

use super::snapshot::{EntityId, EntityKind, EntityRef, SnapshotRecord, Versioned};
use super::store::{RevisionError, Stored, StoreState};

/// Restore `id` to the state captured at `position` (1-based, oldest
/// first). Fails without touching anything when the position is out of
/// range or the record itself no longer exists.
pub(crate) fn revert_entity<T: Stored>(
    state: &mut StoreState,
    id: EntityId,
    position: usize,
) -> Result<(), RevisionError> {
    let owner = EntityRef { kind: T::kind(), id };
    let history = state.history_for(&owner).to_vec();
    let index = position
        .checked_sub(1)
        .filter(|index| *index < history.len())
        .ok_or(RevisionError::NotFound { owner, position })?;

    let mut entity = state
        .fetch::<T>(id)
        .cloned()
        .ok_or(RevisionError::MissingEntity { reference: owner })?;

    rebuild_at(state, &mut entity, &history, index)?;
    state.put(entity);
    debug!(owner = %owner, position, "reverted record");
    Ok(())
}

/// Merge snapshot state onto `entity` as of `history[index]`.
fn rebuild_at<T: Stored>(
    state: &mut StoreState,
    entity: &mut T,
    history: &[SnapshotRecord],
    index: usize,
) -> Result<(), RevisionError> {
    let target = &history[index];

    // Languages to reconcile: everything the record has ever carried,
    // live or anywhere in its history.
    let mut languages: BTreeSet<LanguageCode> = entity.known_languages().into_iter().collect();
    for record in history {
        languages.insert(record.body.language.clone());
    }
    languages.remove(&target.body.language);

    entity.apply_translation(&target.body.language, &target.body);
    for language in languages {
        let nearest = history[..=index]
            .iter()
            .rev()
            .find(|record| record.body.language == language);
        match nearest {
            Some(record) => entity.apply_translation(&language, &record.body),
            None => entity.clear_translation(&language),
        }
    }

    // Relations resolve before plain fields are applied, so a recreated
    // target's fresh identity is what gets linked.
    let mut links = BTreeMap::new();
    for (field, reference) in &target.body.references {
        links.insert(field.clone(), ensure_reference(state, reference)?);
    }
    entity.apply_plain(&target.body, &links);
    Ok(())
}

/// Resolve a snapshot reference to a live identity, recreating the target
/// from its own history when it has been deleted since the snapshot.
fn ensure_reference(
    state: &mut StoreState,
    reference: &EntityRef,
) -> Result<EntityId, RevisionError> {
    if state.exists(reference) {
        return Ok(reference.id);
    }
    match reference.kind {
        EntityKind::JobCategory => resurrect::<JobCategory>(state, reference),
        EntityKind::JobOffer => resurrect::<JobOffer>(state, reference),
        EntityKind::JobApplication => resurrect::<JobApplication>(state, reference),
        EntityKind::NewsletterSignup => resurrect::<NewsletterSignup>(state, reference),
        EntityKind::NewsletterSignupUser => resurrect::<NewsletterSignupUser>(state, reference),
    }
}

/// Recreate a deleted record under a new identity from its last known
/// snapshot. The dead identity is never reused, and the replacement starts
/// with an empty history of its own. A record with no history at all comes
/// back blank: the reference payload carries nothing but kind and identity.
fn resurrect<T: Stored>(
    state: &mut StoreState,
    reference: &EntityRef,
) -> Result<EntityId, RevisionError> {
    let history = state.history_for(reference).to_vec();
    let id = state.allocate_entity();
    let mut entity = T::resurrected(id);
    match history.len() {
        0 => warn!(reference = %reference, "recreating record with no history; only identity is recoverable"),
        len => rebuild_at(state, &mut entity, &history, len - 1)?,
    }
    state.put(entity);
    debug!(reference = %reference, replacement = %id, "recreated deleted relation");
    Ok(id)
}
