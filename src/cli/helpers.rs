//! Shared helper functions for CLI commands.

use std::io::Write;

use console::{style, Term};

use tabledit::models::{confidence_tier, ConfidenceTier};

/// Ask a blocking yes/no question on the terminal. Defaults to no.
pub fn confirm(prompt: &str) -> std::io::Result<bool> {
    let term = Term::stdout();
    write!(&term, "{} {} [y/N] ", style("?").cyan().bold(), prompt)?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prompt for a line of input with a styled label.
pub fn prompt_line(label: &str) -> std::io::Result<String> {
    let term = Term::stdout();
    write!(&term, "{} {}: ", style(">").cyan().bold(), label)?;
    term.read_line()
}

/// Render a confidence score as a colored percentage badge.
pub fn confidence_badge(confidence: f64) -> String {
    let percent = format!("{:3.0}%", confidence * 100.0);
    match confidence_tier(confidence) {
        ConfidenceTier::Good => style(percent).green().to_string(),
        ConfidenceTier::Warn => style(percent).yellow().to_string(),
        ConfidenceTier::Bad => style(percent).red().to_string(),
    }
}

/// Truncate a string for table display, appending an ellipsis when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("Total", 10), "Total");
    }

    #[test]
    fn truncate_cuts_on_char_boundaries() {
        assert_eq!(truncate("Grand total amount", 8), "Grand t…");
        assert_eq!(truncate("äöüäöüäöü", 4), "äöü…");
    }
}
