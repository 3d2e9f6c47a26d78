use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::revisions::{EntityId, EntityKind, EntityRef, FieldValue, SnapshotBody, Versioned};

/// Lowercase language code partitioning translated fields (e.g. `en`, `de`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::new("en")
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Records whose text fields are partitioned by language.
pub trait Translatable {
    fn active_language(&self) -> LanguageCode;
    fn set_active_language(&mut self, code: LanguageCode);
}

/// Run `f` with the record's active language switched to `code`, restoring
/// the prior language before returning.
pub fn with_language<E, T>(entity: &mut E, code: LanguageCode, f: impl FnOnce(&mut E) -> T) -> T
where
    E: Translatable,
{
    let prior = entity.active_language();
    entity.set_active_language(code);
    let value = f(entity);
    entity.set_active_language(prior);
    value
}

/// Translated fields of a job category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTranslation {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCategory {
    pub id: EntityId,
    /// Board namespace the category belongs to.
    pub app_scope: String,
    pub ordering: u32,
    pub active_language: LanguageCode,
    pub translations: BTreeMap<LanguageCode, CategoryTranslation>,
}

impl JobCategory {
    pub fn new(id: EntityId, app_scope: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            id,
            app_scope: app_scope.into(),
            ordering: 0,
            active_language: language,
            translations: BTreeMap::new(),
        }
    }

    /// Name under the active language; empty when that language has no
    /// translation yet.
    pub fn name(&self) -> &str {
        self.translations
            .get(&self.active_language)
            .map(|translation| translation.name.as_str())
            .unwrap_or("")
    }

    pub fn slug(&self) -> &str {
        self.translations
            .get(&self.active_language)
            .map(|translation| translation.slug.as_str())
            .unwrap_or("")
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.translation_entry().name = name.into();
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.translation_entry().slug = slug.into();
    }

    fn translation_entry(&mut self) -> &mut CategoryTranslation {
        self.translations
            .entry(self.active_language.clone())
            .or_default()
    }
}

impl Translatable for JobCategory {
    fn active_language(&self) -> LanguageCode {
        self.active_language.clone()
    }

    fn set_active_language(&mut self, code: LanguageCode) {
        self.active_language = code;
    }
}

/// Translated fields of a job offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferTranslation {
    pub title: String,
    pub slug: String,
    pub lead_in: String,
}

/// One rich-text plugin attached to a language partition of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPlugin {
    pub body: String,
}

/// Ordered rich-text plugins, partitioned by language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSlot {
    plugins: BTreeMap<LanguageCode, Vec<TextPlugin>>,
}

impl ContentSlot {
    pub fn plugins(&self, language: &LanguageCode) -> &[TextPlugin] {
        self.plugins
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn plugins_mut(&mut self, language: &LanguageCode) -> &mut Vec<TextPlugin> {
        self.plugins.entry(language.clone()).or_default()
    }

    pub fn bodies(&self, language: &LanguageCode) -> Vec<String> {
        self.plugins(language)
            .iter()
            .map(|plugin| plugin.body.clone())
            .collect()
    }

    pub fn set_bodies(&mut self, language: &LanguageCode, bodies: &[String]) {
        let plugins = bodies
            .iter()
            .map(|body| TextPlugin { body: body.clone() })
            .collect();
        self.plugins.insert(language.clone(), plugins);
    }

    pub fn clear(&mut self, language: &LanguageCode) {
        self.plugins.remove(language);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffer {
    pub id: EntityId,
    pub app_scope: String,
    pub category: EntityId,
    pub is_active: bool,
    pub can_apply: bool,
    pub publication_start: Option<DateTime<Utc>>,
    pub publication_end: Option<DateTime<Utc>>,
    pub active_language: LanguageCode,
    pub translations: BTreeMap<LanguageCode, OfferTranslation>,
    pub content: ContentSlot,
}

impl JobOffer {
    pub fn new(
        id: EntityId,
        app_scope: impl Into<String>,
        category: EntityId,
        language: LanguageCode,
    ) -> Self {
        Self {
            id,
            app_scope: app_scope.into(),
            category,
            is_active: true,
            can_apply: true,
            publication_start: None,
            publication_end: None,
            active_language: language,
            translations: BTreeMap::new(),
            content: ContentSlot::default(),
        }
    }

    pub fn title(&self) -> &str {
        self.translations
            .get(&self.active_language)
            .map(|translation| translation.title.as_str())
            .unwrap_or("")
    }

    pub fn slug(&self) -> &str {
        self.translations
            .get(&self.active_language)
            .map(|translation| translation.slug.as_str())
            .unwrap_or("")
    }

    pub fn lead_in(&self) -> &str {
        self.translations
            .get(&self.active_language)
            .map(|translation| translation.lead_in.as_str())
            .unwrap_or("")
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.translation_entry().title = title.into();
    }

    pub fn set_slug(&mut self, slug: impl Into<String>) {
        self.translation_entry().slug = slug.into();
    }

    pub fn set_lead_in(&mut self, lead_in: impl Into<String>) {
        self.translation_entry().lead_in = lead_in.into();
    }

    /// Rich-text plugins under the active language.
    pub fn plugins(&self) -> &[TextPlugin] {
        self.content.plugins(&self.active_language)
    }

    pub fn plugins_mut(&mut self) -> &mut Vec<TextPlugin> {
        let language = self.active_language.clone();
        self.content.plugins_mut(&language)
    }

    fn translation_entry(&mut self) -> &mut OfferTranslation {
        self.translations
            .entry(self.active_language.clone())
            .or_default()
    }
}

impl Translatable for JobOffer {
    fn active_language(&self) -> LanguageCode {
        self.active_language.clone()
    }

    fn set_active_language(&mut self, code: LanguageCode) {
        self.active_language = code;
    }
}

/// Uploaded file reference riding along with an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub name: String,
    pub storage_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: EntityId,
    pub job_offer: EntityId,
    pub salutation: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub cover_letter: String,
    pub attachments: Vec<AttachmentDescriptor>,
}

impl JobApplication {
    pub fn new(id: EntityId, job_offer: EntityId) -> Self {
        Self {
            id,
            job_offer,
            salutation: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            cover_letter: String::new(),
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSignup {
    pub id: EntityId,
    pub recipient: String,
    pub default_language: LanguageCode,
    pub confirmation_key: String,
    pub is_verified: bool,
    pub is_disabled: bool,
}

impl NewsletterSignup {
    pub fn new(
        id: EntityId,
        recipient: impl Into<String>,
        default_language: LanguageCode,
        confirmation_key: impl Into<String>,
    ) -> Self {
        Self {
            id,
            recipient: recipient.into(),
            default_language,
            confirmation_key: confirmation_key.into(),
            is_verified: false,
            is_disabled: false,
        }
    }
}

/// Links a signup to a known platform account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSignupUser {
    pub id: EntityId,
    pub signup: EntityId,
    pub user_name: String,
}

impl Versioned for JobCategory {
    fn kind() -> EntityKind {
        EntityKind::JobCategory
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn known_languages(&self) -> Vec<LanguageCode> {
        self.translations.keys().cloned().collect()
    }

    fn capture(&self) -> SnapshotBody {
        let mut plain = BTreeMap::new();
        plain.insert(
            "app_scope".to_string(),
            FieldValue::Text(self.app_scope.clone()),
        );
        plain.insert("ordering".to_string(), FieldValue::Count(self.ordering));

        let mut translated = BTreeMap::new();
        if let Some(translation) = self.translations.get(&self.active_language) {
            translated.insert(
                "name".to_string(),
                FieldValue::Text(translation.name.clone()),
            );
            translated.insert(
                "slug".to_string(),
                FieldValue::Text(translation.slug.clone()),
            );
        }

        SnapshotBody {
            language: self.active_language.clone(),
            plain,
            translated,
            content: None,
            references: BTreeMap::new(),
        }
    }

    fn apply_plain(&mut self, body: &SnapshotBody, _links: &BTreeMap<String, EntityId>) {
        if let Some(value) = body.plain.get("app_scope").and_then(FieldValue::as_text) {
            self.app_scope = value.to_string();
        }
        if let Some(value) = body.plain.get("ordering").and_then(FieldValue::as_count) {
            self.ordering = value;
        }
    }

    fn apply_translation(&mut self, language: &LanguageCode, body: &SnapshotBody) {
        if body.translated.is_empty() {
            self.translations.remove(language);
            return;
        }
        let entry = self.translations.entry(language.clone()).or_default();
        if let Some(value) = body.translated.get("name").and_then(FieldValue::as_text) {
            entry.name = value.to_string();
        }
        if let Some(value) = body.translated.get("slug").and_then(FieldValue::as_text) {
            entry.slug = value.to_string();
        }
    }

    fn clear_translation(&mut self, language: &LanguageCode) {
        self.translations.remove(language);
    }

    fn resurrected(id: EntityId) -> Self {
        Self::new(id, "", LanguageCode::default())
    }
}

impl Versioned for JobOffer {
    fn kind() -> EntityKind {
        EntityKind::JobOffer
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn known_languages(&self) -> Vec<LanguageCode> {
        self.translations.keys().cloned().collect()
    }

    fn capture(&self) -> SnapshotBody {
        let mut plain = BTreeMap::new();
        plain.insert(
            "app_scope".to_string(),
            FieldValue::Text(self.app_scope.clone()),
        );
        plain.insert("is_active".to_string(), FieldValue::Flag(self.is_active));
        plain.insert("can_apply".to_string(), FieldValue::Flag(self.can_apply));
        if let Some(start) = self.publication_start {
            plain.insert("publication_start".to_string(), FieldValue::Moment(start));
        }
        if let Some(end) = self.publication_end {
            plain.insert("publication_end".to_string(), FieldValue::Moment(end));
        }

        let mut translated = BTreeMap::new();
        if let Some(translation) = self.translations.get(&self.active_language) {
            translated.insert(
                "title".to_string(),
                FieldValue::Text(translation.title.clone()),
            );
            translated.insert(
                "slug".to_string(),
                FieldValue::Text(translation.slug.clone()),
            );
            translated.insert(
                "lead_in".to_string(),
                FieldValue::Text(translation.lead_in.clone()),
            );
        }

        let mut references = BTreeMap::new();
        references.insert(
            "category".to_string(),
            EntityRef {
                kind: EntityKind::JobCategory,
                id: self.category,
            },
        );

        SnapshotBody {
            language: self.active_language.clone(),
            plain,
            translated,
            content: Some(self.content.bodies(&self.active_language)),
            references,
        }
    }

    fn apply_plain(&mut self, body: &SnapshotBody, links: &BTreeMap<String, EntityId>) {
        if let Some(value) = body.plain.get("app_scope").and_then(FieldValue::as_text) {
            self.app_scope = value.to_string();
        }
        if let Some(value) = body.plain.get("is_active").and_then(FieldValue::as_flag) {
            self.is_active = value;
        }
        if let Some(value) = body.plain.get("can_apply").and_then(FieldValue::as_flag) {
            self.can_apply = value;
        }
        self.publication_start = body
            .plain
            .get("publication_start")
            .and_then(FieldValue::as_moment);
        self.publication_end = body
            .plain
            .get("publication_end")
            .and_then(FieldValue::as_moment);
        if let Some(category) = links.get("category") {
            self.category = *category;
        }
    }

    fn apply_translation(&mut self, language: &LanguageCode, body: &SnapshotBody) {
        if body.translated.is_empty() {
            self.translations.remove(language);
        } else {
            let entry = self.translations.entry(language.clone()).or_default();
            if let Some(value) = body.translated.get("title").and_then(FieldValue::as_text) {
                entry.title = value.to_string();
            }
            if let Some(value) = body.translated.get("slug").and_then(FieldValue::as_text) {
                entry.slug = value.to_string();
            }
            if let Some(value) = body.translated.get("lead_in").and_then(FieldValue::as_text) {
                entry.lead_in = value.to_string();
            }
        }
        if let Some(bodies) = &body.content {
            self.content.set_bodies(language, bodies);
        }
    }

    fn clear_translation(&mut self, language: &LanguageCode) {
        self.translations.remove(language);
        self.content.clear(language);
    }

    fn resurrected(id: EntityId) -> Self {
        Self::new(id, "", EntityId::UNASSIGNED, LanguageCode::default())
    }
}

impl Versioned for JobApplication {
    fn kind() -> EntityKind {
        EntityKind::JobApplication
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn known_languages(&self) -> Vec<LanguageCode> {
        Vec::new()
    }

    fn capture(&self) -> SnapshotBody {
        let mut plain = BTreeMap::new();
        plain.insert(
            "salutation".to_string(),
            FieldValue::Text(self.salutation.clone()),
        );
        plain.insert(
            "first_name".to_string(),
            FieldValue::Text(self.first_name.clone()),
        );
        plain.insert(
            "last_name".to_string(),
            FieldValue::Text(self.last_name.clone()),
        );
        plain.insert("email".to_string(), FieldValue::Text(self.email.clone()));
        plain.insert(
            "cover_letter".to_string(),
            FieldValue::Text(self.cover_letter.clone()),
        );
        plain.insert(
            "attachments".to_string(),
            FieldValue::Json(serde_json::to_value(&self.attachments).unwrap_or_default()),
        );

        let mut references = BTreeMap::new();
        references.insert(
            "job_offer".to_string(),
            EntityRef {
                kind: EntityKind::JobOffer,
                id: self.job_offer,
            },
        );

        SnapshotBody {
            language: LanguageCode::default(),
            plain,
            translated: BTreeMap::new(),
            content: None,
            references,
        }
    }

    fn apply_plain(&mut self, body: &SnapshotBody, links: &BTreeMap<String, EntityId>) {
        if let Some(value) = body.plain.get("salutation").and_then(FieldValue::as_text) {
            self.salutation = value.to_string();
        }
        if let Some(value) = body.plain.get("first_name").and_then(FieldValue::as_text) {
            self.first_name = value.to_string();
        }
        if let Some(value) = body.plain.get("last_name").and_then(FieldValue::as_text) {
            self.last_name = value.to_string();
        }
        if let Some(value) = body.plain.get("email").and_then(FieldValue::as_text) {
            self.email = value.to_string();
        }
        if let Some(value) = body.plain.get("cover_letter").and_then(FieldValue::as_text) {
            self.cover_letter = value.to_string();
        }
        if let Some(value) = body.plain.get("attachments").and_then(FieldValue::as_json) {
            self.attachments = serde_json::from_value(value.clone()).unwrap_or_default();
        }
        if let Some(offer) = links.get("job_offer") {
            self.job_offer = *offer;
        }
    }

    fn apply_translation(&mut self, _language: &LanguageCode, _body: &SnapshotBody) {}

    fn clear_translation(&mut self, _language: &LanguageCode) {}

    fn resurrected(id: EntityId) -> Self {
        Self::new(id, EntityId::UNASSIGNED)
    }
}

impl Versioned for NewsletterSignup {
    fn kind() -> EntityKind {
        EntityKind::NewsletterSignup
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn known_languages(&self) -> Vec<LanguageCode> {
        Vec::new()
    }

    fn capture(&self) -> SnapshotBody {
        let mut plain = BTreeMap::new();
        plain.insert(
            "recipient".to_string(),
            FieldValue::Text(self.recipient.clone()),
        );
        plain.insert(
            "default_language".to_string(),
            FieldValue::Text(self.default_language.as_str().to_string()),
        );
        plain.insert(
            "confirmation_key".to_string(),
            FieldValue::Text(self.confirmation_key.clone()),
        );
        plain.insert("is_verified".to_string(), FieldValue::Flag(self.is_verified));
        plain.insert("is_disabled".to_string(), FieldValue::Flag(self.is_disabled));

        SnapshotBody {
            language: LanguageCode::default(),
            plain,
            translated: BTreeMap::new(),
            content: None,
            references: BTreeMap::new(),
        }
    }

    fn apply_plain(&mut self, body: &SnapshotBody, _links: &BTreeMap<String, EntityId>) {
        if let Some(value) = body.plain.get("recipient").and_then(FieldValue::as_text) {
            self.recipient = value.to_string();
        }
        if let Some(value) = body
            .plain
            .get("default_language")
            .and_then(FieldValue::as_text)
        {
            self.default_language = LanguageCode::new(value);
        }
        if let Some(value) = body
            .plain
            .get("confirmation_key")
            .and_then(FieldValue::as_text)
        {
            self.confirmation_key = value.to_string();
        }
        if let Some(value) = body.plain.get("is_verified").and_then(FieldValue::as_flag) {
            self.is_verified = value;
        }
        if let Some(value) = body.plain.get("is_disabled").and_then(FieldValue::as_flag) {
            self.is_disabled = value;
        }
    }

    fn apply_translation(&mut self, _language: &LanguageCode, _body: &SnapshotBody) {}

    fn clear_translation(&mut self, _language: &LanguageCode) {}

    fn resurrected(id: EntityId) -> Self {
        Self::new(id, "", LanguageCode::default(), "")
    }
}

impl Versioned for NewsletterSignupUser {
    fn kind() -> EntityKind {
        EntityKind::NewsletterSignupUser
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn known_languages(&self) -> Vec<LanguageCode> {
        Vec::new()
    }

    fn capture(&self) -> SnapshotBody {
        let mut plain = BTreeMap::new();
        plain.insert(
            "user_name".to_string(),
            FieldValue::Text(self.user_name.clone()),
        );

        let mut references = BTreeMap::new();
        references.insert(
            "signup".to_string(),
            EntityRef {
                kind: EntityKind::NewsletterSignup,
                id: self.signup,
            },
        );

        SnapshotBody {
            language: LanguageCode::default(),
            plain,
            translated: BTreeMap::new(),
            content: None,
            references,
        }
    }

    fn apply_plain(&mut self, body: &SnapshotBody, links: &BTreeMap<String, EntityId>) {
        if let Some(value) = body.plain.get("user_name").and_then(FieldValue::as_text) {
            self.user_name = value.to_string();
        }
        if let Some(signup) = links.get("signup") {
            self.signup = *signup;
        }
    }

    fn apply_translation(&mut self, _language: &LanguageCode, _body: &SnapshotBody) {}

    fn clear_translation(&mut self, _language: &LanguageCode) {}

    fn resurrected(id: EntityId) -> Self {
        Self {
            id,
            signup: EntityId::UNASSIGNED,
            user_name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_language_restores_the_prior_context() {
        let mut category = JobCategory::new(EntityId(1), "jobs", LanguageCode::new("en"));
        category.set_name("Design");
        with_language(&mut category, LanguageCode::new("de"), |category| {
            category.set_name("Entwurf");
        });
        assert_eq!(category.active_language, LanguageCode::new("en"));
        assert_eq!(category.name(), "Design");
        assert_eq!(
            category
                .translations
                .get(&LanguageCode::new("de"))
                .map(|translation| translation.name.as_str()),
            Some("Entwurf")
        );
    }

    #[test]
    fn content_slot_partitions_plugins_by_language() {
        let english = LanguageCode::new("en");
        let german = LanguageCode::new("de");
        let mut slot = ContentSlot::default();
        slot.plugins_mut(&english).push(TextPlugin {
            body: "Hello".to_string(),
        });
        assert_eq!(slot.bodies(&english), vec!["Hello".to_string()]);
        assert!(slot.plugins(&german).is_empty());
        slot.clear(&english);
        assert!(slot.plugins(&english).is_empty());
    }

    #[test]
    fn language_codes_normalize_case_and_whitespace() {
        assert_eq!(LanguageCode::new(" EN ").as_str(), "en");
    }
}
