//! Newsletter signup bookkeeping: confirmation keys, verification flags,
//! and the recipient export consumed by the mailing tooling.

use std::io::Write;

use tracing::info;

use super::domain::{LanguageCode, NewsletterSignup, NewsletterSignupUser};
use super::revisions::{ContentStore, EntityId, RevisionError};

#[derive(Debug, thiserror::Error)]
pub enum NewsletterError {
    #[error("{recipient} is already signed up")]
    DuplicateRecipient { recipient: String },
    #[error("unknown confirmation key")]
    UnknownKey,
    #[error("no signup for {recipient}")]
    UnknownRecipient { recipient: String },
    #[error("unknown signup {0}")]
    UnknownSignup(EntityId),
    #[error("recipient export failed: {0}")]
    Export(#[from] csv::Error),
    #[error("recipient export failed: {0}")]
    ExportIo(#[from] std::io::Error),
    #[error(transparent)]
    Revision(#[from] RevisionError),
}

/// Register a recipient. The signup starts unverified, with a confirmation
/// key derived from the allocated identity and the normalized address.
pub fn sign_up(
    store: &ContentStore,
    recipient: &str,
    language: LanguageCode,
) -> Result<NewsletterSignup, NewsletterError> {
    let recipient = recipient.trim().to_ascii_lowercase();
    if store
        .all::<NewsletterSignup>()
        .iter()
        .any(|signup| signup.recipient == recipient)
    {
        return Err(NewsletterError::DuplicateRecipient { recipient });
    }

    let id = store.add_tracked(|id| {
        let key = confirmation_key(id, &recipient);
        NewsletterSignup::new(id, recipient.clone(), language.clone(), key)
    })?;
    info!(signup = %id, "newsletter signup registered");
    store
        .get::<NewsletterSignup>(id)
        .ok_or(NewsletterError::Revision(RevisionError::Storage(
            "signup vanished after insert".to_string(),
        )))
}

/// Mark the signup holding `key` as verified.
pub fn confirm(store: &ContentStore, key: &str) -> Result<NewsletterSignup, NewsletterError> {
    let signup = store
        .all::<NewsletterSignup>()
        .into_iter()
        .find(|signup| signup.confirmation_key == key)
        .ok_or(NewsletterError::UnknownKey)?;
    store.save_tracked(signup.id, |signup: &mut NewsletterSignup| {
        signup.is_verified = true;
    })?;
    store
        .get::<NewsletterSignup>(signup.id)
        .ok_or(NewsletterError::Revision(RevisionError::Storage(
            "signup vanished after update".to_string(),
        )))
}

/// Stop mailing a recipient without dropping the bookkeeping row.
pub fn disable(store: &ContentStore, recipient: &str) -> Result<NewsletterSignup, NewsletterError> {
    let recipient = recipient.trim().to_ascii_lowercase();
    let signup = store
        .all::<NewsletterSignup>()
        .into_iter()
        .find(|signup| signup.recipient == recipient)
        .ok_or(NewsletterError::UnknownRecipient { recipient })?;
    store.save_tracked(signup.id, |signup: &mut NewsletterSignup| {
        signup.is_disabled = true;
    })?;
    store
        .get::<NewsletterSignup>(signup.id)
        .ok_or(NewsletterError::Revision(RevisionError::Storage(
            "signup vanished after update".to_string(),
        )))
}

/// Attach a platform account to an existing signup.
pub fn link_user(
    store: &ContentStore,
    signup: EntityId,
    user_name: &str,
) -> Result<EntityId, NewsletterError> {
    if store.get::<NewsletterSignup>(signup).is_none() {
        return Err(NewsletterError::UnknownSignup(signup));
    }
    let id = store.add_tracked(|id| NewsletterSignupUser {
        id,
        signup,
        user_name: user_name.to_string(),
    })?;
    Ok(id)
}

/// Write the verified, enabled recipients as CSV. Returns the number of
/// rows written.
pub fn export_recipients<W: Write>(
    store: &ContentStore,
    writer: W,
) -> Result<usize, NewsletterError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["recipient", "language"])?;
    let mut written = 0;
    for signup in store.all::<NewsletterSignup>() {
        if signup.is_verified && !signup.is_disabled {
            csv_writer.write_record([signup.recipient.as_str(), signup.default_language.as_str()])?;
            written += 1;
        }
    }
    csv_writer.flush()?;
    info!(recipients = written, "newsletter export written");
    Ok(written)
}

fn confirmation_key(id: EntityId, recipient: &str) -> String {
    // FNV-1a over the normalized address, salted with the identity.
    let digest = recipient
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x100_0000_01b3)
        });
    format!("signup-{id}-{digest:016x}")
}
