use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::jobs::domain::{JobOffer, LanguageCode, TextPlugin};
use jobboard::jobs::revisions::{ContentStore, EntityId, EntityRef, RevisionError, Stored};

/// First configured language that differs from the default, so the demo can
/// show a divergent timeline. Falls back to the default on single-language
/// boards.
pub(crate) fn second_language(config: &AppConfig) -> LanguageCode {
    config
        .board
        .languages
        .iter()
        .find(|language| **language != config.board.default_language)
        .cloned()
        .unwrap_or_else(|| config.board.default_language.clone())
}

/// Overwrite the first plugin body under the offer's active language,
/// creating the plugin when the language has none yet.
pub(crate) fn write_body(offer: &mut JobOffer, body: &str) {
    let plugins = offer.plugins_mut();
    match plugins.first_mut() {
        Some(plugin) => plugin.body = body.to_string(),
        None => plugins.push(TextPlugin {
            body: body.to_string(),
        }),
    }
}

pub(crate) fn require<T: Stored>(store: &ContentStore, id: EntityId) -> Result<T, AppError> {
    store.get::<T>(id).ok_or_else(|| {
        AppError::Revision(RevisionError::MissingEntity {
            reference: EntityRef {
                kind: T::kind(),
                id,
            },
        })
    })
}
