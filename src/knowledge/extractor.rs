//! Extraction service client
//!
//! Sends normalized page text to a schema-constrained language model and
//! parses the response into an [`ExtractionBundle`]. Two modes: fresh (no
//! prior knowledge for the URL) and merge (existing item bodies supplied as
//! context, with instructions to enhance rather than replace).

use crate::config::ExtractionConfig;
use crate::content::PageContent;
use crate::knowledge::schema::bundle_schema;
use crate::knowledge::{ExistingItem, ExtractionBundle};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Page text ceiling for fresh-mode extraction (characters)
const FRESH_TEXT_LIMIT: usize = 32_000;

/// Smaller ceiling when existing items accompany the page, leaving room
/// for the merge context
const MERGE_TEXT_LIMIT: usize = 20_000;

const SCHEMA_NAME: &str = "chess_knowledge_bundle";

const SYSTEM_PROMPT: &str = "You are a chess knowledge archivist. You read one web page at a time \
and extract durable chess knowledge into a fixed six-category structure: openings, middlegame \
concepts, endgame themes, tactical patterns, annotated games, and general principles. Classify \
only what the page actually contains; return an empty array for every category the page says \
nothing about. Prefer canonical names for openings and variations, with ECO codes where known. \
Deduplicate items by name or title within your response. Reproduce move sequences exactly as \
the page gives them.";

const MERGE_PROMPT: &str = "Previously extracted knowledge for this exact source is provided \
under EXISTING KNOWLEDGE. Merge and enhance rather than discard: add new detail from the page, \
correct errors, and keep the existing content wherever it is better than what the page offers. \
Emit all six category arrays even when empty.";

/// The seam the orchestrator drives extraction through
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts a knowledge bundle from one normalized page
    ///
    /// `existing` switches the call into merge mode when non-empty.
    async fn extract(
        &self,
        page: &PageContent,
        existing: &[ExistingItem],
    ) -> Result<ExtractionBundle>;
}

/// HTTP client for an OpenAI-compatible extraction endpoint
pub struct ExtractionClient {
    http: Client,
    config: ExtractionConfig,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ExtractionClient {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(180))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn build_request(&self, page: &PageContent, existing: &[ExistingItem]) -> ChatRequest {
        let system = if existing.is_empty() {
            SYSTEM_PROMPT.to_string()
        } else {
            format!("{}\n\n{}", SYSTEM_PROMPT, MERGE_PROMPT)
        };

        ChatRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_output_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: build_user_content(page, existing),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: SCHEMA_NAME,
                    strict: true,
                    schema: bundle_schema(),
                },
            },
        }
    }
}

#[async_trait]
impl Extractor for ExtractionClient {
    async fn extract(
        &self,
        page: &PageContent,
        existing: &[ExistingItem],
    ) -> Result<ExtractionBundle> {
        tracing::debug!(
            "Requesting extraction for {} ({} existing items)",
            page.url,
            existing.len()
        );

        let request = self.build_request(page, existing);

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::ExtractionSchema(format!("unreadable response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| HarvestError::ExtractionSchema("empty response".to_string()))?;

        let bundle = parse_bundle(&content)?;
        if bundle.is_empty() {
            // All six arrays empty is never accepted: a merge-mode response
            // like this would retire every existing item for the URL
            return Err(HarvestError::ExtractionSchema(
                "bundle contains no knowledge items".to_string(),
            ));
        }

        Ok(bundle)
    }
}

/// Parses one response body against the bundle schema; any deviation is a
/// hard failure, never a partial acceptance
pub fn parse_bundle(content: &str) -> Result<ExtractionBundle> {
    serde_json::from_str(content).map_err(|e| HarvestError::ExtractionSchema(e.to_string()))
}

/// Assembles the user message: source header, bounded page text, and the
/// existing-knowledge context in merge mode
fn build_user_content(page: &PageContent, existing: &[ExistingItem]) -> String {
    let limit = if existing.is_empty() {
        FRESH_TEXT_LIMIT
    } else {
        MERGE_TEXT_LIMIT
    };

    let mut content = format!(
        "SOURCE URL: {}\nPAGE TITLE: {}\nCAPTURED AT: {}\n\nPAGE CONTENT (Markdown):\n{}",
        page.url,
        page.title,
        page.scraped_at.to_rfc3339(),
        truncate_chars(&page.markdown, limit),
    );

    if !existing.is_empty() {
        content.push_str("\n\nEXISTING KNOWLEDGE (same source):\n");
        for item in existing {
            content.push_str(&format!(
                "\n[{}] {}\n{}\n",
                item.category, item.title, item.body
            ));
        }
    }

    content
}

/// Truncates to at most `limit` bytes without splitting a UTF-8 character
fn truncate_chars(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Category;
    use chrono::Utc;
    use std::path::PathBuf;

    fn test_page(markdown: &str) -> PageContent {
        PageContent {
            url: "https://example.com/sicilian".to_string(),
            title: "Sicilian Defense".to_string(),
            markdown: markdown.to_string(),
            scraped_at: Utc::now(),
        }
    }

    fn minimal_bundle_json() -> String {
        r#"{
            "source": {"url": "https://example.com/sicilian", "title": "Sicilian Defense", "scraped_at": "2026-01-01T00:00:00Z"},
            "opening": [{
                "name": "Sicilian Defense", "eco": "B20", "side": "black",
                "overview": "Black's sharpest reply to 1.e4.", "main_line": "1. e4 c5",
                "variations": [], "ideas": [], "traps": [], "model_games": [], "tags": ["sicilian"]
            }],
            "middlegame": [], "endgame": [], "tactics": [], "games": [], "principles": []
        }"#
        .to_string()
    }

    #[test]
    fn test_parse_valid_bundle() {
        let bundle = parse_bundle(&minimal_bundle_json()).unwrap();
        assert_eq!(bundle.opening.len(), 1);
        assert_eq!(bundle.opening[0].eco.as_deref(), Some("B20"));
        assert!(bundle.games.is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_category_array() {
        // No "principles" array: schema violation, not a partial acceptance
        let json = r#"{
            "source": {"url": "u", "title": "t", "scraped_at": "2026-01-01T00:00:00Z"},
            "opening": [], "middlegame": [], "endgame": [], "tactics": [], "games": []
        }"#;
        assert!(matches!(
            parse_bundle(json),
            Err(HarvestError::ExtractionSchema(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_bundle("The page discusses the Sicilian Defense."),
            Err(HarvestError::ExtractionSchema(_))
        ));
    }

    #[test]
    fn test_fresh_content_has_no_existing_section() {
        let content = build_user_content(&test_page("# Sicilian"), &[]);
        assert!(content.contains("SOURCE URL: https://example.com/sicilian"));
        assert!(content.contains("# Sicilian"));
        assert!(!content.contains("EXISTING KNOWLEDGE"));
    }

    #[test]
    fn test_merge_content_includes_existing_bodies() {
        let existing = vec![ExistingItem {
            category: Category::Opening,
            title: "Sicilian Defense".to_string(),
            body: "## Overview\nA fighting defense.".to_string(),
            path: PathBuf::from("openings/sicilian-defense.md"),
        }];

        let content = build_user_content(&test_page("# Sicilian"), &existing);
        assert!(content.contains("EXISTING KNOWLEDGE"));
        assert!(content.contains("[opening] Sicilian Defense"));
        assert!(content.contains("A fighting defense."));
    }

    #[test]
    fn test_merge_mode_uses_smaller_limit() {
        // 'z' never occurs in the message scaffolding, so counting it
        // measures exactly how much page text survived truncation
        let long = "z".repeat(FRESH_TEXT_LIMIT + 1000);
        let existing = vec![ExistingItem {
            category: Category::Principle,
            title: "Develop first".to_string(),
            body: String::new(),
            path: PathBuf::from("principles/develop-first.md"),
        }];

        let fresh = build_user_content(&test_page(&long), &[]);
        let merged = build_user_content(&test_page(&long), &existing);

        assert_eq!(fresh.matches('z').count(), FRESH_TEXT_LIMIT);
        assert_eq!(merged.matches('z').count(), MERGE_TEXT_LIMIT);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // '♞' is three bytes in UTF-8
        let text = "♞♞♞♞";
        let cut = truncate_chars(text, 7);
        assert_eq!(cut, "♞♞");
        assert_eq!(truncate_chars(text, 100), text);
    }
}
