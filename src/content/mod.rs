//! Content normalization
//!
//! Takes the rendered DOM of a page, promotes its main content region,
//! strips boilerplate, and converts the remainder to Markdown with notation
//! blocks preserved verbatim.

mod markdown;
mod readability;

pub use markdown::to_markdown;
pub use readability::{is_noise, readable_root};

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};

/// The normalized capture of one page visit. Read-only after creation;
/// never persisted directly, only the knowledge derived from it is.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub markdown: String,
    pub scraped_at: DateTime<Utc>,
}

/// Title and Markdown text produced from one rendered DOM
#[derive(Debug, Clone)]
pub struct NormalizedPage {
    pub title: Option<String>,
    pub markdown: String,
}

/// Normalizes a rendered document: readable region to Markdown, plus the
/// document title as a fallback when the browser reported none
pub fn normalize_html(html: &str) -> NormalizedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let markdown = readable_root(&document)
        .map(to_markdown)
        .unwrap_or_default();

    NormalizedPage { title, markdown }
}

/// Extracts the page title from the `<title>` tag
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extracts_title_and_markdown() {
        let html = r#"<html><head><title>Rook Endgames</title></head>
            <body><article><h1>Lucena Position</h1><p>Build a bridge.</p></article></body></html>"#;

        let page = normalize_html(html);
        assert_eq!(page.title, Some("Rook Endgames".to_string()));
        assert!(page.markdown.contains("# Lucena Position"));
        assert!(page.markdown.contains("Build a bridge."));
    }

    #[test]
    fn test_normalize_without_title() {
        let page = normalize_html("<html><body><p>text</p></body></html>");
        assert_eq!(page.title, None);
    }

    #[test]
    fn test_normalize_empty_document() {
        let page = normalize_html("<html><body></body></html>");
        assert!(page.markdown.is_empty());
    }
}
