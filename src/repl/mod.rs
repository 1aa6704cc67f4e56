//! Interactive two-page session
//!
//! The terminal stand-in for the web UI: a banner with navigation and the
//! disclaimer, a prompt per page, and `/` commands to switch pages or
//! expand the sources of the last answer.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;

pub use crate::repl::commands::{parse_command, parse_image_input, parse_page_command, Command};
pub use crate::repl::display::{DisplayManager, IMAGE_SPINNER, TEXT_SPINNER};
use crate::repl::input::InputHandler;

use crate::pages::{run_image_analysis, run_text_query, AppContext, Page, TextQueryOutcome};

pub struct ReplSession {
    input_handler: InputHandler,
    display_manager: DisplayManager,
    page: Page,
    last_answer: Option<TextQueryOutcome>,
}

impl ReplSession {
    pub fn new(show_progress: bool) -> Result<Self> {
        Ok(ReplSession {
            input_handler: InputHandler::new()?,
            display_manager: DisplayManager::new(show_progress),
            page: Page::default(),
            last_answer: None,
        })
    }

    pub fn with_history(history_path: PathBuf, show_progress: bool) -> Result<Self> {
        Ok(ReplSession {
            input_handler: InputHandler::with_history(history_path)?,
            display_manager: DisplayManager::new(show_progress),
            page: Page::default(),
            last_answer: None,
        })
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn set_page(&mut self, page: Page) {
        self.page = page;
        self.input_handler.set_page(page);
    }

    /// Run until `/exit` or Ctrl-D
    pub async fn run(&mut self, ctx: &AppContext) -> Result<()> {
        self.display_manager
            .show_banner(env!("CARGO_PKG_VERSION"), self.page);
        if let Some(banner) = ctx.pipeline.error_banner() {
            self.display_manager.show_error(&banner);
        }
        self.display_manager.show_page_header(self.page);

        loop {
            let line = match self.input_handler.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "input cancelled");
                    continue;
                }
            };

            if !self.handle_input(ctx, &line).await? {
                break;
            }
        }

        self.input_handler.save_history()?;
        println!("Goodbye!");
        Ok(())
    }

    /// Handle one line. Returns false when the session should end.
    pub async fn handle_input(&mut self, ctx: &AppContext, input: &str) -> Result<bool> {
        if let Some(command) = parse_page_command(input, self.page) {
            return self.execute(ctx, command);
        }

        match self.page {
            Page::TextQuery => self.submit_text(ctx, input).await,
            Page::ImageAnalysis => self.submit_image(ctx, input).await,
        }
        Ok(true)
    }

    fn execute(&mut self, ctx: &AppContext, command: Command) -> Result<bool> {
        match command {
            Command::Help => commands::show_help(),
            Command::Exit => return Ok(false),
            Command::Clear => self.display_manager.clear_screen()?,
            Command::Page(page) => {
                self.set_page(page);
                self.display_manager.show_page_header(page);
            }
            Command::Sources => match &self.last_answer {
                Some(outcome @ TextQueryOutcome::Answered(_)) => {
                    let text = outcome.render(ctx.config.retrieval.preview_chars, true);
                    self.display_manager.show_outcome(&text, outcome.severity());
                }
                _ => self.display_manager.show_info("No answer to show sources for yet"),
            },
            Command::Unknown { input } => {
                self.display_manager
                    .show_error(&format!("Unknown command: {} (try /help)", input));
            }
        }
        Ok(true)
    }

    async fn submit_text(&mut self, ctx: &AppContext, query: &str) {
        let spinner = (!query.trim().is_empty()).then(|| self.display_manager.start_spinner(TEXT_SPINNER));
        let outcome = run_text_query(ctx, query).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let text = outcome.render(ctx.config.retrieval.preview_chars, false);
        self.display_manager.show_outcome(&text, outcome.severity());
        // `/sources` only ever refers to the latest submission
        self.last_answer = match outcome {
            TextQueryOutcome::Answered(_) => Some(outcome),
            _ => None,
        };
    }

    async fn submit_image(&mut self, ctx: &AppContext, input: &str) {
        let parsed = parse_image_input(input);
        let spinner = parsed
            .as_ref()
            .map(|_| self.display_manager.start_spinner(IMAGE_SPINNER));

        let outcome = match parsed {
            Some((path, question)) => run_image_analysis(ctx, Some(&path), question).await,
            None => run_image_analysis(ctx, None, None).await,
        };
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        self.display_manager.show_outcome(&outcome.render(), outcome.severity());
    }

    pub fn has_answer(&self) -> bool {
        self.last_answer.is_some()
    }
}
