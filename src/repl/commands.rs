//! Built-in session commands and page input parsing

use colored::*;
use std::path::{Path, PathBuf};

use crate::pages::Page;

/// Slash commands understood by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Page(Page),
    Sources,
    Clear,
    Exit,
    Unknown { input: String },
}

/// Parse a line as a command. Lines without a leading `/` are page input.
pub fn parse_command(input: &str) -> Option<Command> {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix('/')?;

    let parts: Vec<&str> = rest.split_whitespace().collect();
    let Some(name) = parts.first() else {
        return Some(Command::Unknown {
            input: trimmed.to_string(),
        });
    };

    let command = match name.to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        "clear" | "cls" => Command::Clear,
        "sources" | "src" => Command::Sources,
        "page" | "p" => match Page::parse(&parts[1..].join(" ")) {
            Some(page) => Command::Page(page),
            None => Command::Unknown {
                input: trimmed.to_string(),
            },
        },
        "text" => Command::Page(Page::TextQuery),
        "image" => Command::Page(Page::ImageAnalysis),
        _ => Command::Unknown {
            input: trimmed.to_string(),
        },
    };
    Some(command)
}

/// Parse a line in the context of the current page.
///
/// On the Image Analysis page an absolute path such as `/tmp/scan.png` also
/// starts with `/`. An unknown command whose first word is a path (it has a
/// further `/`, or names an existing file) is page input.
pub fn parse_page_command(input: &str, page: Page) -> Option<Command> {
    let command = parse_command(input)?;
    if page != Page::ImageAnalysis || !matches!(command, Command::Unknown { .. }) {
        return Some(command);
    }

    match parse_image_input(input) {
        Some((path, _)) if looks_like_path(&path) => None,
        _ => Some(command),
    }
}

fn looks_like_path(path: &Path) -> bool {
    let text = path.to_string_lossy();
    text.trim_start_matches('/').contains('/') || path.is_file()
}

/// Split image page input into a path and an optional question.
///
/// The path may be quoted to allow spaces: `"my scan.png" is this a fracture?`
pub fn parse_image_input(input: &str) -> Option<(PathBuf, Option<String>)> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (path, rest) = match trimmed.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &trimmed[1..];
            match body.find(quote) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            }
        }
        _ => match trimmed.split_once(char::is_whitespace) {
            Some((path, rest)) => (path, rest),
            None => (trimmed, ""),
        },
    };

    if path.is_empty() {
        return None;
    }
    let question = Some(rest.trim().to_string()).filter(|q| !q.is_empty());
    Some((PathBuf::from(path), question))
}

pub fn show_help() {
    println!("\n{}", "Available Commands:".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    let commands = [
        ("/page text|image", "Switch between Text Query and Image Analysis"),
        ("/text, /image", "Shortcuts for /page"),
        ("/sources", "Expand the supporting sources of the last answer"),
        ("/clear, /cls", "Clear screen"),
        ("/help, /h", "Show this help message"),
        ("/exit, /quit, /q", "Exit"),
    ];
    for (cmd, desc) in commands {
        println!("  {:<20} {}", cmd.green(), desc);
    }

    println!("\n{}", "Usage:".bold());
    println!("  - Text Query page: type a medical question");
    println!("  - Image Analysis page: type a PNG/JPEG path, optionally followed by a question");
    println!("  - Press {} or {} to exit\n", "Ctrl-D".cyan(), "/exit".cyan());
}
