use super::common::{lang, seed_category, seed_category_tracked, seed_offer};
use crate::jobs::domain::{
    JobApplication, JobCategory, JobOffer, NewsletterSignup, NewsletterSignupUser,
};
use crate::jobs::revisions::ContentStore;

#[test]
fn revert_relinks_a_relation_that_still_exists() {
    let store = ContentStore::new();
    let first_category = seed_category(&store, "Design");
    let second_category = seed_category(&store, "Sales");
    let id = seed_offer(&store, first_category, "Designer");

    store
        .save_tracked_in(id, lang("en"), |offer: &mut JobOffer| {
            offer.set_title("Designer 1");
        })
        .expect("revision 1");
    store
        .save_tracked_in(id, lang("en"), |offer: &mut JobOffer| {
            offer.category = second_category;
        })
        .expect("revision 2");

    store.revert_to::<JobOffer>(id, 1).expect("revert");

    let offer = store.get::<JobOffer>(id).expect("offer");
    assert_eq!(offer.category, first_category);
    assert_eq!(store.count::<JobCategory>(), 2);
}

#[test]
fn deleted_relation_is_recreated_under_a_new_identity() {
    let store = ContentStore::new();
    let first_category = seed_category_tracked(&store, "Design");
    let id = seed_offer(&store, first_category, "Designer");

    store
        .save_tracked_in(id, lang("en"), |offer: &mut JobOffer| {
            offer.set_title("Designer 1");
        })
        .expect("revision 1");

    let second_category = seed_category(&store, "Sales");
    store
        .save_tracked_in(id, lang("en"), |offer: &mut JobOffer| {
            offer.category = second_category;
        })
        .expect("revision 2");

    store.remove::<JobCategory>(first_category).expect("delete");
    assert_eq!(store.count::<JobCategory>(), 1);

    store.revert_to::<JobOffer>(id, 1).expect("revert");

    assert_eq!(store.count::<JobCategory>(), 2);
    let offer = store.get::<JobOffer>(id).expect("offer");
    assert_ne!(offer.category, second_category);
    assert_ne!(offer.category, first_category);

    let replacement = store.get::<JobCategory>(offer.category).expect("replacement");
    assert_eq!(replacement.name(), "Design");
    assert!(store.snapshots::<JobCategory>(offer.category).is_empty());
}

#[test]
fn resurrection_recurses_through_relation_chains() {
    let store = ContentStore::new();
    let category = seed_category_tracked(&store, "Design");
    let offer = store
        .add_tracked(|id| {
            let mut offer = JobOffer::new(id, "jobs", category, lang("en"));
            offer.set_title("Designer");
            offer
        })
        .expect("tracked offer");
    let application = store.add(|id| {
        let mut application = JobApplication::new(id, offer);
        application.first_name = "Robin".to_string();
        application.email = "robin@example.com".to_string();
        application
    });

    store
        .save_tracked(application, |application: &mut JobApplication| {
            application.cover_letter = "Portfolio attached.".to_string();
        })
        .expect("revision 1");

    store.remove::<JobOffer>(offer).expect("delete offer");
    store.remove::<JobCategory>(category).expect("delete category");

    store
        .revert_to::<JobApplication>(application, 1)
        .expect("revert");

    assert_eq!(store.count::<JobOffer>(), 1);
    assert_eq!(store.count::<JobCategory>(), 1);

    let application = store.get::<JobApplication>(application).expect("application");
    assert_ne!(application.job_offer, offer);

    let restored_offer = store.get::<JobOffer>(application.job_offer).expect("offer");
    assert_eq!(restored_offer.title(), "Designer");
    assert_ne!(restored_offer.category, category);

    let restored_category = store
        .get::<JobCategory>(restored_offer.category)
        .expect("category");
    assert_eq!(restored_category.name(), "Design");
}

#[test]
fn signup_user_relinks_to_a_recreated_signup() {
    let store = ContentStore::new();
    let original = store.add(|id| NewsletterSignup::new(id, "reader@example.com", lang("en"), "key-0"));
    let user = store.add(|id| NewsletterSignupUser {
        id,
        signup: original,
        user_name: "test_user".to_string(),
    });

    let first = store
        .add_tracked(|id| NewsletterSignup::new(id, "first@example.com", lang("en"), "key-1"))
        .expect("tracked signup");
    store
        .save_tracked(user, |user: &mut NewsletterSignupUser| {
            user.signup = first;
        })
        .expect("revision 1");

    let second = store
        .add_tracked(|id| NewsletterSignup::new(id, "second@example.com", lang("en"), "key-2"))
        .expect("tracked signup");
    store
        .save_tracked(user, |user: &mut NewsletterSignupUser| {
            user.signup = second;
        })
        .expect("revision 2");

    store.remove::<NewsletterSignup>(first).expect("delete");
    assert_eq!(store.count::<NewsletterSignup>(), 2);

    store.revert_to::<NewsletterSignupUser>(user, 1).expect("revert");

    assert_eq!(store.count::<NewsletterSignup>(), 3);
    let user = store.get::<NewsletterSignupUser>(user).expect("signup user");
    assert_ne!(user.signup, original);
    assert_ne!(user.signup, second);

    let restored = store.get::<NewsletterSignup>(user.signup).expect("restored");
    assert_eq!(restored.recipient, "first@example.com");
}

#[test]
fn relation_with_no_history_comes_back_blank() {
    let store = ContentStore::new();
    let category = seed_category(&store, "Design");
    let id = seed_offer(&store, category, "Designer");

    store
        .save_tracked_in(id, lang("en"), |offer: &mut JobOffer| {
            offer.set_title("Designer 1");
        })
        .expect("revision 1");

    store.remove::<JobCategory>(category).expect("delete");

    store.revert_to::<JobOffer>(id, 1).expect("revert");

    let offer = store.get::<JobOffer>(id).expect("offer");
    assert_ne!(offer.category, category);

    let replacement = store.get::<JobCategory>(offer.category).expect("replacement");
    assert!(replacement.translations.is_empty());
    assert_eq!(replacement.app_scope, "");
}
