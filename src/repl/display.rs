//! Terminal rendering for pages and outcomes

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::time::Duration;

use crate::pages::{Page, Severity, DISCLAIMER};

/// Spinner message while the text page works
pub const TEXT_SPINNER: &str = "Analyzing your query...";
/// Spinner message while the image page works
pub const IMAGE_SPINNER: &str = "Analyzing image...";

pub struct DisplayManager {
    show_progress: bool,
    update_interval: Duration,
}

impl DisplayManager {
    pub fn new(show_progress: bool) -> Self {
        DisplayManager {
            show_progress,
            update_interval: Duration::from_millis(100),
        }
    }

    /// Banner with the sidebar content: navigation and disclaimer
    pub fn show_banner(&self, version: &str, page: Page) {
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", format!("  MedQuery AI {} - Medical Insights", version).bold().cyan());
        println!("{}", format!("  Navigation: Text Query | Image Analysis (current: {})", page.title()).dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        self.show_disclaimer();
        println!(
            "\nType your input (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    pub fn show_page_header(&self, page: Page) {
        println!("\n{}", page.header().bold().cyan());
        println!("{}", "-".repeat(60).cyan());
        if page == Page::ImageAnalysis {
            println!("{}", "Enter the path of a PNG or JPEG image, optionally followed by a question.".dimmed());
        }
    }

    pub fn show_disclaimer(&self) {
        println!("{} {}", "Disclaimer:".yellow().bold(), DISCLAIMER.dimmed());
    }

    /// Start a spinner; hidden when progress output is disabled
    pub fn start_spinner(&self, message: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(self.update_interval);
        pb
    }

    /// Print rendered page output colored by severity
    pub fn show_outcome(&self, text: &str, severity: Severity) {
        match severity {
            Severity::Info => println!("\n{}", text),
            Severity::Warning => println!("{} {}", "Warning:".yellow().bold(), text.yellow()),
            Severity::Error => println!("{} {}", "Error:".red().bold(), text.red()),
        }
    }

    pub fn show_error(&self, error: &str) {
        self.show_outcome(error, Severity::Error);
    }

    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_spinner_when_progress_disabled() {
        let manager = DisplayManager::new(false);
        let pb = manager.start_spinner(TEXT_SPINNER);
        assert!(pb.is_hidden());
        pb.finish_and_clear();
    }

    #[test]
    fn test_spinner_carries_message() {
        let manager = DisplayManager::default();
        let pb = manager.start_spinner(IMAGE_SPINNER);
        assert_eq!(pb.message(), "Analyzing image...");
        pb.finish_and_clear();
    }

    #[test]
    fn test_update_interval() {
        let manager = DisplayManager::default();
        assert_eq!(manager.update_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_show_outcomes() {
        let manager = DisplayManager::default();
        manager.show_outcome("### Medical Insights\nanswer", Severity::Info);
        manager.show_outcome("Please enter a medical query", Severity::Warning);
        manager.show_error("An error occurred: boom");
    }
}
