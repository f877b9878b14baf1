//! One-shot edit commands: resolve and save.

use anyhow::bail;
use console::style;

use tabledit::client::ReviewClient;
use tabledit::config::Settings;
use tabledit::models::{ArtifactRef, ItemKind, PendingChange};
use tabledit::resolver::{base_prefix, EditResolver, SaveError};

use crate::cli::notice::SaveIndicator;

/// Show how an artifact resolves to a result file, without saving anything.
pub async fn cmd_resolve(settings: &Settings, artifact: &str) -> anyhow::Result<()> {
    let client = ReviewClient::new(settings)?;
    let artifact = ArtifactRef::new(artifact);
    let prefix = base_prefix(&artifact);

    println!("Artifact:    {}", artifact.filename());
    println!("Base prefix: {}", style(&prefix).bold());

    let resolver = EditResolver::new(&client);
    match resolver.resolve_filename(&artifact).await {
        Ok(filename) => {
            println!("Resolves to: {}", style(&filename).green());
        }
        Err(SaveError::NoMatch) => {
            println!(
                "Resolves to: {} (a save would fall back to well-known filenames)",
                style("no match").yellow()
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Save one correction against the resolved result file.
pub async fn cmd_save(
    settings: &Settings,
    artifact: &str,
    cell: Option<i64>,
    text_id: Option<i64>,
    text: &str,
) -> anyhow::Result<()> {
    let change = match (cell, text_id) {
        (Some(id), None) => PendingChange {
            kind: ItemKind::Cell,
            id,
            text: text.to_string(),
        },
        (None, Some(id)) => PendingChange {
            kind: ItemKind::UnassignedText,
            id,
            text: text.to_string(),
        },
        _ => bail!("Specify exactly one of --cell or --text-id"),
    };

    let client = ReviewClient::new(settings)?;
    let resolver = EditResolver::new(&client);
    let artifact = ArtifactRef::new(artifact);

    let indicator = SaveIndicator::start();
    match resolver.resolve_and_save(&change, &artifact, &indicator).await {
        Ok(outcome) => {
            indicator.success(&format!(
                "Changes saved to {}{}",
                outcome.filename,
                if outcome.via_fallback { " (fallback)" } else { "" }
            ));
            Ok(())
        }
        Err(e) => {
            indicator.error(&format!("Error: {}", e));
            bail!("Save failed");
        }
    }
}
