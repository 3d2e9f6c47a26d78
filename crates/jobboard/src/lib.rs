//! Job-board content models with translation-aware revision tracking.
//!
//! The crate models a small job board (categories, offers, applications,
//! newsletter signups) and keeps an append-only snapshot history for every
//! record, so editors can revert translated content without losing later
//! edits made under other languages. Relations referenced by old snapshots
//! are recreated on revert when the referenced record has been deleted.

pub mod config;
pub mod error;
pub mod jobs;
pub mod telemetry;
