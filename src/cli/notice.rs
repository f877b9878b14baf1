//! Transient save notices.
//!
//! Mirrors the two-tier feedback of the review UI: an informational
//! indicator while a save or fallback attempt is in flight, and a styled
//! terminal line once the attempt resolves. The spinner clears itself so
//! informational notices never outlive the operation they describe.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use tabledit::resolver::SaveProgress;

/// Spinner shown while a save action is in flight.
pub struct SaveIndicator {
    bar: ProgressBar,
}

impl SaveIndicator {
    /// Start the in-flight indicator.
    pub fn start() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        bar.set_message("Saving...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Clear the indicator and print a success line.
    pub fn success(self, message: &str) {
        self.bar.finish_and_clear();
        println!("{} {}", style("✓").green().bold(), message);
    }

    /// Clear the indicator and print a terminal error line.
    pub fn error(self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", style("✗").red().bold(), style(message).red());
    }
}

impl SaveProgress for SaveIndicator {
    fn saving(&self) {
        self.bar.set_message("Saving...");
    }

    fn retrying(&self, candidate: &str) {
        self.bar.set_message(format!("Retrying with {}...", candidate));
    }
}

/// Print a standalone informational notice.
pub fn info(message: &str) {
    println!("{} {}", style("·").dim(), message);
}

/// Print a standalone warning notice.
pub fn warn(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}
