//! Readability pruning
//!
//! Picks the main content region of a rendered document and decides which
//! subtrees are navigation/advertising noise. The noise test is shared with
//! the Markdown renderer, which skips flagged subtrees during conversion.

use scraper::{ElementRef, Html, Selector};

/// Elements that never carry article content
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "footer", "header", "aside", "form",
    "iframe", "svg", "button", "select", "input",
];

/// ARIA roles marking chrome rather than content
const NOISE_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "contentinfo",
    "complementary",
    "search",
];

/// Substrings in class/id attributes that mark boilerplate regions
const NOISE_HINTS: &[&str] = &[
    "nav",
    "menu",
    "footer",
    "sidebar",
    "banner",
    "cookie",
    "advert",
    "promo",
    "share",
    "comment",
    "breadcrumb",
];

/// Short tokens checked word-wise so that "ad" does not match "adjacent"
const NOISE_TOKENS: &[&str] = &["ad", "ads", "adsense", "sponsor", "sponsored"];

/// Selects the main content region of a document
///
/// Prefers an `article` element, then `main`, then the whole `body`.
pub fn readable_root(document: &Html) -> Option<ElementRef<'_>> {
    for selector in ["article", "main", "body"] {
        let selector = Selector::parse(selector).ok()?;
        if let Some(element) = document.select(&selector).next() {
            return Some(element);
        }
    }
    Some(document.root_element())
}

/// Returns true if the element's subtree should be dropped entirely
pub fn is_noise(element: &ElementRef<'_>) -> bool {
    let value = element.value();

    if NOISE_TAGS.contains(&value.name()) {
        return true;
    }

    if let Some(role) = value.attr("role") {
        if NOISE_ROLES.contains(&role.to_ascii_lowercase().as_str()) {
            return true;
        }
    }

    for attr in ["class", "id"] {
        if let Some(attr_value) = value.attr(attr) {
            if attr_marks_noise(attr_value) {
                return true;
            }
        }
    }

    false
}

fn attr_marks_noise(value: &str) -> bool {
    let lowered = value.to_ascii_lowercase();

    if NOISE_HINTS.iter().any(|hint| lowered.contains(hint)) {
        return true;
    }

    lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| NOISE_TOKENS.contains(&token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_element<'a>(document: &'a Html, selector: &str) -> ElementRef<'a> {
        let selector = Selector::parse(selector).unwrap();
        document.select(&selector).next().unwrap()
    }

    #[test]
    fn test_prefers_article_over_body() {
        let html = r#"<html><body><div>outer</div><article><p>inner</p></article></body></html>"#;
        let document = Html::parse_document(html);
        let root = readable_root(&document).unwrap();
        assert_eq!(root.value().name(), "article");
    }

    #[test]
    fn test_prefers_main_when_no_article() {
        let html = r#"<html><body><main><p>inner</p></main></body></html>"#;
        let document = Html::parse_document(html);
        let root = readable_root(&document).unwrap();
        assert_eq!(root.value().name(), "main");
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = r#"<html><body><p>inner</p></body></html>"#;
        let document = Html::parse_document(html);
        let root = readable_root(&document).unwrap();
        assert_eq!(root.value().name(), "body");
    }

    #[test]
    fn test_noise_tags() {
        let html = r#"<html><body><nav>links</nav><script>code</script><p>text</p></body></html>"#;
        let document = Html::parse_document(html);
        assert!(is_noise(&first_element(&document, "nav")));
        assert!(is_noise(&first_element(&document, "script")));
        assert!(!is_noise(&first_element(&document, "p")));
    }

    #[test]
    fn test_noise_role() {
        let html = r#"<html><body><div role="navigation">links</div></body></html>"#;
        let document = Html::parse_document(html);
        assert!(is_noise(&first_element(&document, "div")));
    }

    #[test]
    fn test_noise_class_hints() {
        let html = r#"<html><body>
            <div class="sidebar">x</div>
            <div class="ad-container">x</div>
            <div class="board-diagram">x</div>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert!(is_noise(&first_element(&document, ".sidebar")));
        assert!(is_noise(&first_element(&document, ".ad-container")));
        assert!(!is_noise(&first_element(&document, ".board-diagram")));
    }

    #[test]
    fn test_short_tokens_match_word_wise() {
        let html = r#"<html><body>
            <div id="adjacent-moves">x</div>
            <div id="ads">x</div>
        </body></html>"#;
        let document = Html::parse_document(html);
        assert!(!is_noise(&first_element(&document, "#adjacent-moves")));
        assert!(is_noise(&first_element(&document, "#ads")));
    }
}
