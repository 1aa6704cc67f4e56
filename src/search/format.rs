// Web results -> prompt context block
use super::WebResult;

/// Context block used when a search returns nothing
pub const NO_SOURCES_SENTINEL: &str = "No external sources found.";

const EXCERPT_CHARS: usize = 200;

/// Render search results as the numbered "Supporting Medical Sources" block
pub fn format_web_sources(results: &[WebResult]) -> String {
    if results.is_empty() {
        return NO_SOURCES_SENTINEL.to_string();
    }

    let mut block = String::from("Supporting Medical Sources:\n");
    for (i, source) in results.iter().enumerate() {
        let excerpt: String = source.snippet.chars().take(EXCERPT_CHARS).collect();
        block.push_str(&format!("{}. {}\n", i + 1, source.title));
        block.push_str(&format!("   Link: {}\n", source.link));
        block.push_str(&format!("   Excerpt: {}...\n\n", excerpt));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, link: &str, snippet: &str) -> WebResult {
        WebResult {
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn test_empty_results_sentinel() {
        assert_eq!(format_web_sources(&[]), "No external sources found.");
    }

    #[test]
    fn test_block_layout() {
        let block = format_web_sources(&[
            result("Migraine - Mayo Clinic", "https://www.mayoclinic.org/migraine", "A migraine can cause severe throbbing pain."),
            result("Migraine | NHS", "https://www.nhs.uk/conditions/migraine/", "Migraines are usually a moderate or severe headache."),
        ]);
        let expected = "Supporting Medical Sources:\n\
            1. Migraine - Mayo Clinic\n   Link: https://www.mayoclinic.org/migraine\n   Excerpt: A migraine can cause severe throbbing pain....\n\n\
            2. Migraine | NHS\n   Link: https://www.nhs.uk/conditions/migraine/\n   Excerpt: Migraines are usually a moderate or severe headache....\n\n";
        assert_eq!(block, expected);
    }

    #[test]
    fn test_excerpt_truncated_to_200_chars() {
        let long = "x".repeat(450);
        let block = format_web_sources(&[result("t", "l", &long)]);
        let excerpt_line = block.lines().find(|l| l.contains("Excerpt:")).unwrap();
        assert_eq!(excerpt_line, format!("   Excerpt: {}...", "x".repeat(200)));
    }
}
