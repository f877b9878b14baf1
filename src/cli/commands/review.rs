//! Interactive review session.
//!
//! The terminal analogue of the review page: one session per processed
//! image, edits and reverts go through the resolver, and session state is
//! only mutated after the backend acknowledges a save.

use console::style;

use tabledit::client::ReviewClient;
use tabledit::config::Settings;
use tabledit::models::{ArtifactRef, ItemKind, PendingChange, SessionState};
use tabledit::resolver::EditResolver;

use super::documents::publish_session;
use super::show::{load_session, render_results};
use crate::cli::helpers::{confirm, prompt_line};
use crate::cli::notice::{self, SaveIndicator};

/// Start an interactive review of a processed image.
pub async fn cmd_review(
    settings: &Settings,
    artifact: &str,
    original: Option<String>,
) -> anyhow::Result<()> {
    let client = ReviewClient::new(settings)?;
    let session = load_session(&client, ArtifactRef::new(artifact)).await?;
    run_review_loop(&client, session, original).await
}

/// The review prompt loop. Owns the session for its whole lifetime.
pub async fn run_review_loop(
    client: &ReviewClient,
    mut session: SessionState,
    original_path: Option<String>,
) -> anyhow::Result<()> {
    println!(
        "Reviewing {} ({} items). Type {} for commands.",
        style(session.artifact.filename()).bold(),
        session.items().len(),
        style("help").bold()
    );

    loop {
        let line = prompt_line("review")?;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            [] => continue,
            ["list"] | ["l"] => render_results(&session, None),
            ["edit", kind, id] | ["e", kind, id] => {
                let Some((kind, id)) = parse_target(kind, id) else {
                    notice::warn("Usage: edit <cell|text> <id>");
                    continue;
                };
                handle_edit(client, &mut session, kind, id).await?;
            }
            ["revert", kind, id] | ["r", kind, id] => {
                let Some((kind, id)) = parse_target(kind, id) else {
                    notice::warn("Usage: revert <cell|text> <id>");
                    continue;
                };
                handle_revert(client, &mut session, kind, id).await?;
            }
            ["publish", rest @ ..] | ["p", rest @ ..] => {
                let name = if rest.is_empty() {
                    None
                } else {
                    Some(rest.join(" "))
                };
                if let Err(e) =
                    publish_session(client, &session, name, original_path.clone()).await
                {
                    notice::warn(&format!("Error saving document: {}", e));
                }
            }
            ["help"] | ["h"] | ["?"] => print_help(),
            ["quit"] | ["q"] | ["exit"] => break,
            _ => notice::warn("Unknown command; type help"),
        }
    }
    Ok(())
}

fn parse_target(kind: &str, id: &str) -> Option<(ItemKind, i64)> {
    let kind = match kind {
        "cell" | "c" => ItemKind::Cell,
        "text" | "t" => ItemKind::UnassignedText,
        _ => return None,
    };
    Some((kind, id.parse().ok()?))
}

async fn handle_edit(
    client: &ReviewClient,
    session: &mut SessionState,
    kind: ItemKind,
    id: i64,
) -> anyhow::Result<()> {
    let Some(item) = session.item(kind, id) else {
        notice::warn(&format!("No {} with id {}", kind, id));
        return Ok(());
    };
    println!("Current text: {}", style(&item.current_text).bold());

    let text = prompt_line("New text")?;
    if text.is_empty() {
        notice::info("Edit cancelled");
        return Ok(());
    }

    let change = PendingChange { kind, id, text };
    let artifact = session.artifact.clone();
    let resolver = EditResolver::new(client);

    let indicator = SaveIndicator::start();
    match resolver.resolve_and_save(&change, &artifact, &indicator).await {
        Ok(outcome) => {
            // The item transitions to edited only now, after the ack.
            session.apply_saved(&change);
            indicator.success(&format!("Changes saved to {}", outcome.filename));
        }
        Err(e) => {
            indicator.error(&format!("Error: {}", e));
        }
    }
    Ok(())
}

async fn handle_revert(
    client: &ReviewClient,
    session: &mut SessionState,
    kind: ItemKind,
    id: i64,
) -> anyhow::Result<()> {
    let Some(item) = session.item(kind, id) else {
        notice::warn(&format!("No {} with id {}", kind, id));
        return Ok(());
    };

    if !confirm("Are you sure you want to revert this text to its original value?")? {
        notice::info("Revert cancelled");
        return Ok(());
    }

    if !item.edited {
        // Nothing to undo; the text already matches the original.
        notice::info("Text is unchanged from the original");
        return Ok(());
    }

    let item = item.clone();
    let artifact = session.artifact.clone();
    let resolver = EditResolver::new(client);

    let indicator = SaveIndicator::start();
    match resolver.revert(&item, &artifact, &indicator).await {
        Ok(outcome) => {
            session.apply_reverted(kind, id);
            indicator.success(&format!(
                "Reverted; original text restored in {}",
                outcome.filename
            ));
        }
        Err(e) => {
            indicator.error(&format!("Error: {}", e));
        }
    }
    Ok(())
}

fn print_help() {
    println!("  list                 show all detected items");
    println!("  edit <cell|text> <id>    correct an item's text");
    println!("  revert <cell|text> <id>  restore an item's original text");
    println!("  publish [name]       save the session as a named document");
    println!("  quit                 leave the review session");
}
