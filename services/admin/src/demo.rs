use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use tracing::info;

use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::jobs::domain::{with_language, JobCategory, JobOffer, LanguageCode};
use jobboard::jobs::forms::{CategoryForm, OfferForm};
use jobboard::jobs::newsletter;
use jobboard::jobs::revisions::ContentStore;

use crate::infra::{require, second_language, write_body};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// History position to revert the demo offer to (defaults to the
    /// revision before the last)
    #[arg(long)]
    pub(crate) revert_to: Option<usize>,
    /// Include the raw snapshot payloads in the output
    #[arg(long)]
    pub(crate) include_snapshots: bool,
    /// Skip the deleted-relation recovery portion of the demo
    #[arg(long)]
    pub(crate) skip_resurrection: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Write the CSV here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    let DemoArgs {
        revert_to,
        include_snapshots,
        skip_resurrection,
    } = args;

    let primary = config.board.default_language.clone();
    let secondary = second_language(config);
    let store = ContentStore::new();

    println!("Job board revision demo");

    let category = CategoryForm {
        app_scope: "jobs".to_string(),
        language: primary.clone(),
        name: "Engineering".to_string(),
        slug: None,
        ordering: 0,
    }
    .save(&store)?;
    let offer = OfferForm {
        category: category.id,
        language: primary.clone(),
        title: "Backend Engineer".to_string(),
        slug: None,
        lead_in: "Ship the boring parts well.".to_string(),
        is_active: true,
        can_apply: true,
    }
    .save(&store)?;
    println!(
        "- Created category '{}' and offer '{}' (revision 1 each)",
        category.name(),
        offer.title()
    );

    // a divergent timeline: two primary-language edits around two
    // secondary-language drafts
    store.save_tracked_in(offer.id, primary.clone(), |offer: &mut JobOffer| {
        offer.set_title("Senior Backend Engineer");
        write_body(offer, "You will own the billing pipeline.");
    })?;
    store.save_tracked_in(offer.id, secondary.clone(), |offer: &mut JobOffer| {
        offer.set_title("Backend-Entwickler");
        write_body(offer, "Du uebernimmst die Billing-Pipeline.");
    })?;
    store.save_tracked_in(offer.id, secondary.clone(), |offer: &mut JobOffer| {
        offer.set_title("Senior Backend-Entwickler");
    })?;
    store.save_tracked_in(offer.id, primary.clone(), |offer: &mut JobOffer| {
        offer.set_title("Staff Backend Engineer");
        write_body(offer, "Rewritten pitch.");
        offer.is_active = false;
    })?;

    let history = store.snapshots::<JobOffer>(offer.id);
    println!("- Offer history ({} revisions):", history.len());
    for snapshot in &history {
        let title = snapshot
            .body
            .translated
            .get("title")
            .and_then(|value| value.as_text())
            .unwrap_or("(no title captured)");
        println!(
            "  {}. [{}] {}",
            snapshot.position, snapshot.body.language, title
        );
        if include_snapshots {
            match serde_json::to_string_pretty(snapshot) {
                Ok(payload) => println!("{payload}"),
                Err(err) => println!("  snapshot payload unavailable: {err}"),
            }
        }
    }

    let target = revert_to.unwrap_or_else(|| history.len().saturating_sub(1).max(1));
    store.revert_to::<JobOffer>(offer.id, target)?;
    info!(offer = %offer.id, position = target, "demo offer reverted");
    println!("- Reverted offer to revision {target}");

    let mut reverted = require::<JobOffer>(&store, offer.id)?;
    let state = json!({
        "is_active": reverted.is_active,
        "can_apply": reverted.can_apply,
        "languages": language_states(&mut reverted, &[primary.clone(), secondary.clone()]),
    });
    match serde_json::to_string_pretty(&state) {
        Ok(payload) => println!("{payload}"),
        Err(err) => println!("  reverted state unavailable: {err}"),
    }

    if skip_resurrection {
        return Ok(());
    }

    println!("\nDeleted-relation recovery");
    let replacement = CategoryForm {
        app_scope: "jobs".to_string(),
        language: primary.clone(),
        name: "Platform".to_string(),
        slug: None,
        ordering: 1,
    }
    .save(&store)?;
    store.save_tracked_in(offer.id, primary, |offer: &mut JobOffer| {
        offer.category = replacement.id;
    })?;
    store.remove::<JobCategory>(category.id)?;
    println!(
        "- Moved the offer to '{}' and deleted '{}' ({} categories left)",
        replacement.name(),
        category.name(),
        store.count::<JobCategory>()
    );

    store.revert_to::<JobOffer>(offer.id, target)?;
    let reverted = require::<JobOffer>(&store, offer.id)?;
    let recreated = require::<JobCategory>(&store, reverted.category)?;
    println!(
        "- Revert recreated '{}' under a new identity ({} categories now)",
        recreated.name(),
        store.count::<JobCategory>()
    );

    Ok(())
}

fn language_states(offer: &mut JobOffer, languages: &[LanguageCode]) -> serde_json::Value {
    let mut states = Vec::new();
    for language in languages {
        let state = with_language(offer, language.clone(), |offer| {
            json!({
                "language": offer.active_language.as_str(),
                "title": offer.title(),
                "bodies": offer
                    .plugins()
                    .iter()
                    .map(|plugin| plugin.body.clone())
                    .collect::<Vec<_>>(),
            })
        });
        states.push(state);
    }
    serde_json::Value::Array(states)
}

pub(crate) fn run_export(args: ExportArgs, config: &AppConfig) -> Result<(), AppError> {
    let store = ContentStore::new();
    let language = config.board.default_language.clone();

    // seeded board: two confirmed readers, one pending, one opted out
    let first = newsletter::sign_up(&store, "ada@example.com", language.clone())?;
    let second = newsletter::sign_up(&store, "grace@example.com", language.clone())?;
    newsletter::sign_up(&store, "pending@example.com", language)?;
    newsletter::confirm(&store, &first.confirmation_key)?;
    newsletter::confirm(&store, &second.confirmation_key)?;
    newsletter::disable(&store, "grace@example.com")?;

    let written = match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            let written = newsletter::export_recipients(&store, file)?;
            println!("Wrote {} recipients to {}", written, path.display());
            written
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let written = newsletter::export_recipients(&store, &mut handle)?;
            handle.flush()?;
            written
        }
    };
    info!(recipients = written, "demo export finished");
    Ok(())
}
