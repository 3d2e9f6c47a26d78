use super::common::{lang, rename_category, seed_category, seed_category_tracked};
use crate::jobs::domain::{with_language, JobCategory};
use crate::jobs::revisions::{ContentStore, RevisionError};

#[test]
fn tracked_create_records_the_first_snapshot() {
    let store = ContentStore::new();
    let id = seed_category_tracked(&store, "Design");
    assert_eq!(store.snapshots::<JobCategory>(id).len(), 1);
}

#[test]
fn untracked_insert_leaves_no_history() {
    let store = ContentStore::new();
    let id = seed_category(&store, "Design");
    assert!(store.snapshots::<JobCategory>(id).is_empty());
}

#[test]
fn each_tracked_save_appends_exactly_one_snapshot() {
    let store = ContentStore::new();
    let id = seed_category(&store, "Design");
    for revision in 1..=4 {
        rename_category(&store, id, "en", &format!("Design {revision}"));
        assert_eq!(store.snapshots::<JobCategory>(id).len(), revision);
    }
}

#[test]
fn snapshot_captures_only_the_active_language() {
    let store = ContentStore::new();
    let id = seed_category(&store, "Design");
    rename_category(&store, id, "de", "Entwurf");

    let history = store.snapshots::<JobCategory>(id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].body.language, lang("de"));
    assert_eq!(history[0].body.translated["name"].as_text(), Some("Entwurf"));
    assert!(!history[0].body.translated.contains_key("ordering"));

    // the English partition on the live record is untouched by the save
    let mut category = store.get::<JobCategory>(id).expect("category");
    with_language(&mut category, lang("en"), |category| {
        assert_eq!(category.name(), "Design");
    });
}

#[test]
fn snapshot_ids_are_shared_across_records_and_never_order_history() {
    let store = ContentStore::new();
    let first = seed_category(&store, "Design");
    let second = seed_category(&store, "Sales");

    rename_category(&store, first, "en", "Design 1");
    rename_category(&store, second, "en", "Sales 1");
    rename_category(&store, first, "en", "Design 2");

    let history = store.snapshots::<JobCategory>(first);
    assert_eq!(history.len(), 2);
    // the interleaved save to the other record left a gap in the ids
    assert!(history[1].id.0 - history[0].id.0 > 1);
    assert_eq!(history[0].position, 1);
    assert_eq!(history[1].position, 2);

    let at_two = store
        .snapshot_at::<JobCategory>(first, 2)
        .expect("position 2");
    assert_eq!(at_two.body.translated["name"].as_text(), Some("Design 2"));
}

#[test]
fn snapshot_at_rejects_positions_outside_the_log() {
    let store = ContentStore::new();
    let id = seed_category_tracked(&store, "Design");

    assert!(matches!(
        store.snapshot_at::<JobCategory>(id, 0),
        Err(RevisionError::NotFound { position: 0, .. })
    ));
    assert!(matches!(
        store.snapshot_at::<JobCategory>(id, 2),
        Err(RevisionError::NotFound { position: 2, .. })
    ));
}

#[test]
fn removing_a_record_keeps_its_history() {
    let store = ContentStore::new();
    let id = seed_category_tracked(&store, "Design");
    store.remove::<JobCategory>(id).expect("remove");
    assert_eq!(store.count::<JobCategory>(), 0);
    assert_eq!(store.snapshots::<JobCategory>(id).len(), 1);
}

#[test]
fn purging_history_drops_every_snapshot() {
    let store = ContentStore::new();
    let id = seed_category_tracked(&store, "Design");
    rename_category(&store, id, "en", "Design 1");
    assert_eq!(store.purge_history::<JobCategory>(id), 2);
    assert!(store.snapshots::<JobCategory>(id).is_empty());
}
