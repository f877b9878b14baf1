//! Image upload command.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use tabledit::client::ReviewClient;
use tabledit::config::Settings;
use tabledit::models::{ArtifactRef, SessionState};

use super::review::run_review_loop;
use super::show::{load_session, render_results};

/// Upload an image, print the detection summary, optionally start a review.
pub async fn cmd_process(
    settings: &Settings,
    image: &Path,
    start_review: bool,
) -> anyhow::Result<()> {
    let client = ReviewClient::new(settings)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Processing {}...", image.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let response = match client.process_image(image).await {
        Ok(response) => {
            spinner.finish_and_clear();
            response
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };

    let original_path = response.original_path.unwrap_or_default();
    let output_image = response.output_image.unwrap_or_default();
    println!("{} Image processed", style("✓").green().bold());
    println!("  Original:  {}", original_path);
    println!("  Processed: {}", style(&output_image).bold());

    let artifact = ArtifactRef::new(output_image.clone());

    // Newer backends inline the result document; otherwise resolve and
    // fetch it from the output directory.
    let session = match response.json_data {
        Some(results) => SessionState::new(artifact, results),
        None => load_session(&client, artifact).await?,
    };

    println!();
    render_results(&session, None);

    if start_review {
        println!();
        run_review_loop(&client, session, Some(original_path)).await
    } else {
        println!();
        println!(
            "Run {} to correct the detected text.",
            style(format!("tabledit review {}", output_image)).bold()
        );
        Ok(())
    }
}
