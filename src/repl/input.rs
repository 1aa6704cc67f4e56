//! Line input for the interactive session
//!
//! Wraps rustyline with persistent history. The prompt shows the active page.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::pages::Page;

/// Readline interface with optional on-disk history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(InputHandler {
            editor: DefaultEditor::new()?,
            history_path: None,
            prompt: prompt_for(Page::default()),
        })
    }

    /// Create with history loaded from (and later saved to) `history_file`
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: prompt_for(Page::default()),
        })
    }

    pub fn set_page(&mut self, page: Page) {
        self.prompt = prompt_for(page);
    }

    /// Read one line.
    ///
    /// Returns `Ok(None)` on Ctrl-D; Ctrl-C is an error the caller treats
    /// as a cancelled line.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return Ok(Some(String::new()));
                }
                let _ = self.editor.add_history_entry(trimmed);
                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Err(anyhow::anyhow!("Interrupted")),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}

fn prompt_for(page: Page) -> String {
    match page {
        Page::TextQuery => "medquery[text]> ".to_string(),
        Page::ImageAnalysis => "medquery[image]> ".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prompt_follows_page() {
        let mut handler = InputHandler::new().unwrap();
        assert_eq!(handler.prompt, "medquery[text]> ");
        handler.set_page(Page::ImageAnalysis);
        assert_eq!(handler.prompt, "medquery[image]> ");
    }

    #[test]
    fn test_history_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let history_path = temp_dir.path().join("state").join("history");

        {
            let mut handler = InputHandler::with_history(history_path.clone()).unwrap();
            let _ = handler.editor.add_history_entry("What causes a migraine?");
            let _ = handler.editor.add_history_entry("/page image");
            handler.save_history().unwrap();
        }

        assert!(history_path.exists());
        let handler = InputHandler::with_history(history_path).unwrap();
        assert_eq!(handler.history_len(), 2);
    }

    #[test]
    fn test_no_history_path_saves_nothing() {
        let mut handler = InputHandler::new().unwrap();
        assert!(handler.history_path.is_none());
        assert!(handler.save_history().is_ok());
    }
}
