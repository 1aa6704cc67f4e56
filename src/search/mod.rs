//! Domain-restricted web search
//!
//! Queries are limited to a fixed list of reputable medical sites. The
//! production adapter scrapes DuckDuckGo's HTML endpoint; [`format`] turns
//! results into the text block that is appended to the question.

pub mod duckduckgo;
pub mod format;

pub use duckduckgo::DuckDuckGoSearch;
pub use format::{format_web_sources, NO_SOURCES_SENTINEL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Sites every web query is restricted to
pub const MEDICAL_DOMAINS: &[&str] = &[
    "mayoclinic.org",
    "healthline.com",
    "webmd.com",
    "medlineplus.gov",
    "nih.gov",
    "who.int",
    "cdc.gov",
    "nhs.uk",
    "wikipedia.org",
];

pub const DEFAULT_TITLE: &str = "Untitled Medical Source";
pub const DEFAULT_SNIPPET: &str = "No excerpt available";

/// One web search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl WebResult {
    /// Build a result, substituting defaults for missing fields
    pub fn new(title: Option<String>, link: Option<String>, snippet: Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            title: non_empty(title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            link: link.unwrap_or_default(),
            snippet: non_empty(snippet).unwrap_or_else(|| DEFAULT_SNIPPET.to_string()),
        }
    }
}

/// A web search provider
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the medical domains for `query`, returning at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>>;
}

/// `site:(d1 OR d2 ...) {query}`
pub fn build_site_query<S: AsRef<str>>(domains: &[S], query: &str) -> String {
    let sites: Vec<&str> = domains.iter().map(|d| d.as_ref()).collect();
    format!("site:({}) {}", sites.join(" OR "), query)
}
