use crate::jobs::domain::{JobCategory, JobOffer, LanguageCode, TextPlugin};
use crate::jobs::forms::slugify;
use crate::jobs::revisions::{ContentStore, EntityId, SnapshotId};

pub(super) fn lang(code: &str) -> LanguageCode {
    LanguageCode::new(code)
}

/// Category inserted without history, named under `en`.
pub(super) fn seed_category(store: &ContentStore, name: &str) -> EntityId {
    store.add(|id| {
        let mut category = JobCategory::new(id, "jobs", lang("en"));
        category.set_name(name);
        category.set_slug(slugify(name));
        category
    })
}

/// Category inserted through a tracked save, so it carries one snapshot.
pub(super) fn seed_category_tracked(store: &ContentStore, name: &str) -> EntityId {
    store
        .add_tracked(|id| {
            let mut category = JobCategory::new(id, "jobs", lang("en"));
            category.set_name(name);
            category.set_slug(slugify(name));
            category
        })
        .expect("tracked category insert")
}

/// Offer inserted without history, titled under `en`.
pub(super) fn seed_offer(store: &ContentStore, category: EntityId, title: &str) -> EntityId {
    store.add(|id| {
        let mut offer = JobOffer::new(id, "jobs", category, lang("en"));
        offer.set_title(title);
        offer.set_slug(slugify(title));
        offer
    })
}

/// Rename a category under `code` through a tracked save.
pub(super) fn rename_category(
    store: &ContentStore,
    id: EntityId,
    code: &str,
    name: &str,
) -> SnapshotId {
    store
        .save_tracked_in(id, lang(code), |category: &mut JobCategory| {
            category.set_name(name);
        })
        .expect("tracked rename")
}

/// Overwrite the first plugin body under the offer's active language,
/// creating the plugin when the language has none yet.
pub(super) fn write_body(offer: &mut JobOffer, body: &str) {
    let plugins = offer.plugins_mut();
    match plugins.first_mut() {
        Some(plugin) => plugin.body = body.to_string(),
        None => plugins.push(TextPlugin {
            body: body.to_string(),
        }),
    }
}
