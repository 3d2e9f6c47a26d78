//! Job-board content: domain records, admin forms, newsletter
//! bookkeeping, and the revision subsystem.

pub mod domain;
pub mod forms;
pub mod newsletter;
pub mod revisions;

pub use domain::{
    with_language, JobApplication, JobCategory, JobOffer, LanguageCode, NewsletterSignup,
    NewsletterSignupUser, Translatable,
};
pub use forms::{CategoryForm, FormError, OfferForm};
pub use newsletter::NewsletterError;
pub use revisions::{ContentStore, EntityId, RevisionError, SnapshotRecord};
