//! Newsletter bookkeeping scenarios: signup lifecycle, recipient export,
//! and revision history on the signup records themselves.

use jobboard::jobs::domain::{LanguageCode, NewsletterSignup, NewsletterSignupUser};
use jobboard::jobs::newsletter::{
    confirm, disable, export_recipients, link_user, sign_up, NewsletterError,
};
use jobboard::jobs::revisions::ContentStore;

fn lang(code: &str) -> LanguageCode {
    LanguageCode::new(code)
}

#[test]
fn signup_allocates_a_confirmation_key_and_first_revision() {
    let store = ContentStore::new();
    let signup = sign_up(&store, "Reader@Example.com", lang("en")).expect("signup");

    assert_eq!(signup.recipient, "reader@example.com");
    assert!(!signup.confirmation_key.is_empty());
    assert!(!signup.is_verified);
    assert_eq!(store.snapshots::<NewsletterSignup>(signup.id).len(), 1);
}

#[test]
fn duplicate_recipients_are_rejected() {
    let store = ContentStore::new();
    sign_up(&store, "reader@example.com", lang("en")).expect("signup");
    let error = sign_up(&store, "READER@example.com ", lang("de"))
        .expect_err("duplicate rejected");
    assert!(matches!(error, NewsletterError::DuplicateRecipient { .. }));
    assert_eq!(store.count::<NewsletterSignup>(), 1);
}

#[test]
fn confirming_a_key_verifies_the_signup() {
    let store = ContentStore::new();
    let signup = sign_up(&store, "reader@example.com", lang("en")).expect("signup");
    let confirmed = confirm(&store, &signup.confirmation_key).expect("confirm");
    assert!(confirmed.is_verified);
    assert_eq!(store.snapshots::<NewsletterSignup>(signup.id).len(), 2);

    let error = confirm(&store, "not-a-key").expect_err("unknown key");
    assert!(matches!(error, NewsletterError::UnknownKey));
}

#[test]
fn export_contains_exactly_the_verified_enabled_recipients() {
    let store = ContentStore::new();
    let first = sign_up(&store, "first@example.com", lang("en")).expect("signup");
    let second = sign_up(&store, "second@example.com", lang("de")).expect("signup");
    sign_up(&store, "third@example.com", lang("en")).expect("signup");

    confirm(&store, &first.confirmation_key).expect("confirm first");
    confirm(&store, &second.confirmation_key).expect("confirm second");
    disable(&store, "second@example.com").expect("disable second");

    let mut buffer = Vec::new();
    let written = export_recipients(&store, &mut buffer).expect("export");
    assert_eq!(written, 1);

    let csv = String::from_utf8(buffer).expect("utf8 csv");
    assert!(csv.contains("first@example.com,en"));
    assert!(!csv.contains("second@example.com"));
    assert!(!csv.contains("third@example.com"));
}

#[test]
fn linked_users_follow_signup_revisions() {
    let store = ContentStore::new();
    let first = sign_up(&store, "first@example.com", lang("en")).expect("signup");
    let second = sign_up(&store, "second@example.com", lang("en")).expect("signup");

    let user = link_user(&store, first.id, "test_user").expect("link");
    store
        .save_tracked(user, |link: &mut NewsletterSignupUser| {
            link.signup = second.id;
        })
        .expect("revision 2");

    store.revert_to::<NewsletterSignupUser>(user, 1).expect("revert");
    let link = store.get::<NewsletterSignupUser>(user).expect("signup user");
    assert_eq!(link.signup, first.id);

    let error = link_user(&store, jobboard::jobs::revisions::EntityId(99), "ghost")
        .expect_err("unknown signup rejected");
    assert!(matches!(error, NewsletterError::UnknownSignup(_)));
}
