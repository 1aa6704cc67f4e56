//! DuckDuckGo HTML search adapter
//!
//! Posts the query to the no-JavaScript HTML endpoint and scrapes result
//! titles, links and snippets out of the page. Result links come back as
//! `//duckduckgo.com/l/?uddg=<encoded target>` redirects and are unwrapped.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;

use super::{build_site_query, WebResult, WebSearch};
use crate::config::SearchConfig;
use crate::errors::{MedQueryError, Result};

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a([^>]*class="result__a"[^>]*)>(.*?)</a>"#).unwrap()
});

static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<(?:a|div|td)[^>]*class="result__snippet"[^>]*>(.*?)</(?:a|div|td)>"#).unwrap()
});

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]*)""#).unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap());

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Web search backed by html.duckduckgo.com
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
    domains: Vec<String>,
    timeout: Duration,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            domains: config.domains.clone(),
            timeout,
        })
    }

    fn map_send_error(&self, err: reqwest::Error) -> MedQueryError {
        if err.is_timeout() {
            MedQueryError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else {
            MedQueryError::WebSearchError(err.to_string())
        }
    }

    /// Quick reachability probe used by `medquery doctor`
    pub async fn is_available(&self) -> bool {
        self.client
            .get(&self.endpoint)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>> {
        let site_query = build_site_query(&self.domains, query);
        tracing::debug!(query = %site_query, max_results, "web search");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", site_query.as_str())])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MedQueryError::WebSearchError(format!(
                "DuckDuckGo returned {}",
                status
            )));
        }

        let html = response.text().await.map_err(|e| self.map_send_error(e))?;
        let mut results = parse_results(&html);
        results.truncate(max_results);

        tracing::debug!(count = results.len(), "web search results");
        Ok(results)
    }
}

/// Extract results from a DuckDuckGo HTML results page
pub fn parse_results(html: &str) -> Vec<WebResult> {
    let titles: Vec<_> = TITLE_RE.captures_iter(html).collect();
    let snippets: Vec<_> = SNIPPET_RE.captures_iter(html).collect();

    let mut results = Vec::new();
    for (i, caps) in titles.iter().enumerate() {
        let (Some(whole), Some(attrs), Some(inner)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        let Some(link) = HREF_RE
            .captures(attrs.as_str())
            .and_then(|c| c.get(1))
            .map(|m| resolve_link(&decode_entities(m.as_str())))
        else {
            continue;
        };
        if link.contains("duckduckgo.com/y.js") {
            continue;
        }

        // Snippets belong to the closest preceding title.
        let next_title_start = titles
            .get(i + 1)
            .and_then(|c| c.get(0))
            .map(|m| m.start())
            .unwrap_or(html.len());
        let snippet = snippets
            .iter()
            .filter_map(|c| c.get(1))
            .find(|m| m.start() > whole.end() && m.start() < next_title_start)
            .map(|m| clean_text(m.as_str()));

        results.push(WebResult::new(
            Some(clean_text(inner.as_str())),
            Some(link),
            snippet,
        ));
    }
    results
}

/// Unwrap DuckDuckGo redirect links and make protocol-relative links absolute
fn resolve_link(raw: &str) -> String {
    if let Some(start) = raw.find("uddg=") {
        let encoded = &raw[start + 5..];
        let encoded = encoded.split('&').next().unwrap_or(encoded);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    if raw.starts_with("//") {
        return format!("https:{}", raw);
    }
    raw.to_string()
}

fn clean_text(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, "");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    // Last, so "&amp;lt;" decodes to "&lt;" rather than "<".
    numeric.replace("&amp;", "&")
}
