//! Admin-facing create forms. Uniqueness is checked here, against the live
//! tables, so the revision store only ever receives valid records.

use super::domain::{CategoryTranslation, JobCategory, JobOffer, LanguageCode, OfferTranslation};
use super::revisions::{ContentStore, EntityId, EntityKind, EntityRef, RevisionError};

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("category with that name already exists for the selected board")]
    DuplicateName { app_scope: String, name: String },
    #[error("offer with that title already exists for the selected category")]
    DuplicateTitle { category: EntityId, title: String },
    #[error("slug '{slug}' is already in use on that board")]
    DuplicateSlug { app_scope: String, slug: String },
    #[error("a name is required")]
    MissingName,
    #[error("unknown category {0}")]
    UnknownCategory(EntityId),
    #[error(transparent)]
    Revision(#[from] RevisionError),
}

/// Lowercase `value` and collapse every non-alphanumeric run to a dash.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut gap = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    slug
}

/// Create payload for a job category.
#[derive(Debug, Clone)]
pub struct CategoryForm {
    pub app_scope: String,
    pub language: LanguageCode,
    pub name: String,
    /// Derived from the name when not supplied.
    pub slug: Option<String>,
    pub ordering: u32,
}

impl CategoryForm {
    /// Check name and slug uniqueness within the board scope, across every
    /// language. Returns the slug that a save would use.
    pub fn validate(&self, store: &ContentStore) -> Result<String, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        let slug = self
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&self.name));

        for category in store.all::<JobCategory>() {
            if category.app_scope != self.app_scope {
                continue;
            }
            for translation in category.translations.values() {
                if translation.name == self.name {
                    return Err(FormError::DuplicateName {
                        app_scope: self.app_scope.clone(),
                        name: self.name.clone(),
                    });
                }
                if translation.slug == slug {
                    return Err(FormError::DuplicateSlug {
                        app_scope: self.app_scope.clone(),
                        slug,
                    });
                }
            }
        }
        Ok(slug)
    }

    /// Validate, then insert through a tracked save.
    pub fn save(&self, store: &ContentStore) -> Result<JobCategory, FormError> {
        let slug = self.validate(store)?;
        let id = store.add_tracked(|id| {
            let mut category = JobCategory::new(id, self.app_scope.clone(), self.language.clone());
            category.ordering = self.ordering;
            category.translations.insert(
                self.language.clone(),
                CategoryTranslation {
                    name: self.name.clone(),
                    slug: slug.clone(),
                },
            );
            category
        })?;
        store.get::<JobCategory>(id).ok_or_else(|| {
            FormError::Revision(RevisionError::MissingEntity {
                reference: EntityRef {
                    kind: EntityKind::JobCategory,
                    id,
                },
            })
        })
    }
}

/// Create payload for a job offer.
#[derive(Debug, Clone)]
pub struct OfferForm {
    pub category: EntityId,
    pub language: LanguageCode,
    pub title: String,
    /// Derived from the title when not supplied.
    pub slug: Option<String>,
    pub lead_in: String,
    pub is_active: bool,
    pub can_apply: bool,
}

impl OfferForm {
    /// Titles are unique within the category; slugs within the category's
    /// board scope. Returns the scope and slug a save would use.
    pub fn validate(&self, store: &ContentStore) -> Result<(String, String), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        let category = store
            .get::<JobCategory>(self.category)
            .ok_or(FormError::UnknownCategory(self.category))?;
        let slug = self
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&self.title));

        for offer in store.all::<JobOffer>() {
            for translation in offer.translations.values() {
                if offer.category == self.category && translation.title == self.title {
                    return Err(FormError::DuplicateTitle {
                        category: self.category,
                        title: self.title.clone(),
                    });
                }
                if offer.app_scope == category.app_scope && translation.slug == slug {
                    return Err(FormError::DuplicateSlug {
                        app_scope: category.app_scope.clone(),
                        slug,
                    });
                }
            }
        }
        Ok((category.app_scope, slug))
    }

    /// Validate, then insert through a tracked save.
    pub fn save(&self, store: &ContentStore) -> Result<JobOffer, FormError> {
        let (app_scope, slug) = self.validate(store)?;
        let id = store.add_tracked(|id| {
            let mut offer = JobOffer::new(id, app_scope.clone(), self.category, self.language.clone());
            offer.is_active = self.is_active;
            offer.can_apply = self.can_apply;
            offer.translations.insert(
                self.language.clone(),
                OfferTranslation {
                    title: self.title.clone(),
                    slug: slug.clone(),
                    lead_in: self.lead_in.clone(),
                },
            );
            offer
        })?;
        store.get::<JobOffer>(id).ok_or_else(|| {
            FormError::Revision(RevisionError::MissingEntity {
                reference: EntityRef {
                    kind: EntityKind::JobOffer,
                    id,
                },
            })
        })
    }
}
