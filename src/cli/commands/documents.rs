//! Saved-document commands.

use console::style;

use tabledit::client::{ReviewClient, SaveResultsRequest};
use tabledit::config::Settings;
use tabledit::models::{ArtifactRef, SessionState};

use super::show::load_session;
use crate::cli::helpers::{prompt_line, truncate};
use crate::cli::notice;

/// Fallback document name, matching the backend's default.
const UNNAMED_DOCUMENT: &str = "Unnamed Document";

/// Persist a session as a named document via `/save_results`.
pub async fn publish_session(
    client: &ReviewClient,
    session: &SessionState,
    name: Option<String>,
    original_path: Option<String>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => {
            let entered = prompt_line("Document name")?;
            let entered = entered.trim().to_string();
            if entered.is_empty() {
                UNNAMED_DOCUMENT.to_string()
            } else {
                entered
            }
        }
    };

    let request = SaveResultsRequest {
        document_name: name.clone(),
        original_image_path: original_path.unwrap_or_default(),
        output_image_path: session.artifact.to_string(),
        json_data: session.results.clone(),
        edited_items: session.edited_keys(),
    };

    client.save_results(&request).await?;
    println!(
        "{} Document \"{}\" saved",
        style("✓").green().bold(),
        name
    );
    Ok(())
}

/// One-shot publish of the current results for an artifact.
pub async fn cmd_publish(
    settings: &Settings,
    artifact: &str,
    name: Option<String>,
    original: Option<String>,
) -> anyhow::Result<()> {
    let client = ReviewClient::new(settings)?;
    let session = load_session(&client, ArtifactRef::new(artifact)).await?;
    publish_session(&client, &session, name, original).await
}

/// List saved documents.
pub async fn cmd_documents_list(settings: &Settings) -> anyhow::Result<()> {
    let client = ReviewClient::new(settings)?;
    let documents = client.get_documents().await?;

    if documents.is_empty() {
        notice::info("No documents found");
        return Ok(());
    }

    println!(
        "{:<38} {:<28} {:>6}  {}",
        style("ID").bold(),
        style("Name").bold(),
        style("Items").bold(),
        style("Created").bold()
    );
    for doc in documents {
        println!(
            "{:<38} {:<28} {:>6}  {}",
            doc.id,
            truncate(&doc.document_name, 28),
            doc.text_count.unwrap_or(0),
            doc.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Show one saved document with its text items.
pub async fn cmd_document_show(settings: &Settings, id: &str) -> anyhow::Result<()> {
    let client = ReviewClient::new(settings)?;
    let doc = client.get_document(id).await?;

    println!("{}", style(&doc.document_name).bold().underlined());
    println!("  Id:       {}", doc.id);
    println!("  Created:  {}", doc.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(filename) = &doc.filename {
        println!("  Filename: {}", filename);
    }
    if let Some(path) = &doc.original_image_path {
        println!("  Original: {}", path);
    }

    if doc.text_items.is_empty() {
        println!();
        notice::info("No text items found");
        return Ok(());
    }

    println!();
    println!(
        "{:<6} {:<12} {:>6}  {:<8} {}",
        style("Id").bold(),
        style("Region").bold(),
        style("Conf").bold(),
        style("Edited").bold(),
        style("Text").bold()
    );
    for item in &doc.text_items {
        let confidence = item
            .confidence
            .map(|c| format!("{:3.0}%", c * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        let edited = if item.edited {
            style("yes").green().to_string()
        } else {
            style("no").dim().to_string()
        };
        println!(
            "{:<6} {:<12} {:>6}  {:<8} {}",
            item.id,
            item.region().to_string(),
            confidence,
            edited,
            truncate(&item.text, 48)
        );
    }
    Ok(())
}
