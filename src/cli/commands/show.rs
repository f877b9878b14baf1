//! Result rendering.

use console::style;

use tabledit::client::ReviewClient;
use tabledit::config::Settings;
use tabledit::models::{ArtifactRef, ItemKind, SessionState};
use tabledit::resolver::EditResolver;

use crate::cli::helpers::{confidence_badge, truncate};

/// Resolve the result file for an artifact and load it into a session.
pub async fn load_session(
    client: &ReviewClient,
    artifact: ArtifactRef,
) -> anyhow::Result<SessionState> {
    let resolver = EditResolver::new(client);
    let filename = resolver.resolve_filename(&artifact).await?;
    let results = client.fetch_results(&filename).await?;
    Ok(SessionState::new(artifact, results))
}

/// Show the detections for a processed image.
///
/// With `below`, only items whose confidence is under the threshold are
/// listed - the ones worth reviewing.
pub async fn cmd_show(
    settings: &Settings,
    artifact: &str,
    below: Option<u8>,
) -> anyhow::Result<()> {
    let client = ReviewClient::new(settings)?;
    let session = load_session(&client, ArtifactRef::new(artifact)).await?;
    let threshold = below.map(|p| f64::from(p) / 100.0);
    render_results(&session, threshold);
    Ok(())
}

/// Render a session's results to the terminal.
pub fn render_results(session: &SessionState, below: Option<f64>) {
    if !session.results.metadata.is_empty() {
        println!("{}", style("Document statistics").bold().underlined());
        for (key, value) in &session.results.metadata {
            println!("  {:<24} {}", key, metadata_value(value));
        }
        println!();
    }

    let visible = |confidence: f64| below.map_or(true, |t| confidence < t);

    println!("{}", style("Cells with text").bold().underlined());
    let mut shown = 0;
    for item in session.items().iter().filter(|i| i.kind == ItemKind::Cell) {
        if !visible(item.confidence) {
            continue;
        }
        shown += 1;
        print_item("Cell", item.id, &item.current_text, item.confidence, item.edited);
    }
    if shown == 0 {
        println!("  {}", style("(none)").dim());
    }

    println!();
    println!("{}", style("Unassigned text").bold().underlined());
    shown = 0;
    for item in session
        .items()
        .iter()
        .filter(|i| i.kind == ItemKind::UnassignedText)
    {
        if !visible(item.confidence) {
            continue;
        }
        shown += 1;
        print_item("Text", item.id, &item.current_text, item.confidence, item.edited);
    }
    if shown == 0 {
        println!("  {}", style("(none)").dim());
    }
}

fn print_item(label: &str, id: i64, text: &str, confidence: f64, edited: bool) {
    let edited_mark = if edited {
        style(" [edited]").green().to_string()
    } else {
        String::new()
    };
    println!(
        "  {} #{:<4} {}  {}{}",
        label,
        id,
        confidence_badge(confidence),
        truncate(text, 60),
        edited_mark
    );
}

fn metadata_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
