use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::domain::LanguageCode;

/// Store-allocated identity. Stable across edits, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Placeholder identity for records recreated from a bare reference,
    /// before any relation has been re-linked.
    pub const UNASSIGNED: EntityId = EntityId(0);
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one history entry. Allocated from a counter shared by all
/// entities, so per-entity sequences are not contiguous; never an ordering
/// key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SnapshotId(pub u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    JobCategory,
    JobOffer,
    JobApplication,
    NewsletterSignup,
    NewsletterSignupUser,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::JobCategory => "job_category",
            Self::JobOffer => "job_offer",
            Self::JobApplication => "job_application",
            Self::NewsletterSignup => "newsletter_signup",
            Self::NewsletterSignupUser => "newsletter_signup_user",
        }
    }
}

/// Identity reference carried inside snapshots in place of a live relation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.label(), self.id)
    }
}

/// Typed value stored in snapshot field maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Count(u32),
    Moment(DateTime<Utc>),
    Json(serde_json::Value),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u32> {
        match self {
            FieldValue::Count(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_moment(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Moment(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            FieldValue::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Field state captured from a record at save time: every plain field, the
/// translated fields of exactly one language, that language's content
/// bodies, and all relations as identity references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotBody {
    /// Language whose translated fields this capture carries.
    pub language: LanguageCode,
    pub plain: BTreeMap<String, FieldValue>,
    pub translated: BTreeMap<String, FieldValue>,
    pub content: Option<Vec<String>>,
    pub references: BTreeMap<String, EntityRef>,
}

/// One immutable entry in a record's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: SnapshotId,
    pub owner: EntityRef,
    /// Position at append time (1-based). Informational; the log order is
    /// what lookups traverse.
    pub position: u32,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: SnapshotBody,
}

/// Contract between a domain record and the revision machinery.
pub trait Versioned: Clone {
    fn kind() -> EntityKind;

    fn id(&self) -> EntityId;

    /// Languages currently present on the live record. Empty for records
    /// without translated fields.
    fn known_languages(&self) -> Vec<LanguageCode>;

    /// Capture the full field state for a snapshot, under the record's
    /// currently-active language.
    fn capture(&self) -> SnapshotBody;

    /// Apply plain fields and resolved relations from a capture. `links`
    /// maps reference field names to live identities.
    fn apply_plain(&mut self, body: &SnapshotBody, links: &BTreeMap<String, EntityId>);

    /// Apply the translated fields (and content bodies) a capture carries
    /// onto `language`. An empty translated map removes the partition.
    fn apply_translation(&mut self, language: &LanguageCode, body: &SnapshotBody);

    /// Drop a language partition entirely.
    fn clear_translation(&mut self, language: &LanguageCode);

    /// Minimal record recreated when a referenced entity is gone and has no
    /// history of its own; only kind and identity are recoverable.
    fn resurrected(id: EntityId) -> Self;

    fn entity_ref(&self) -> EntityRef {
        EntityRef {
            kind: Self::kind(),
            id: self.id(),
        }
    }
}
