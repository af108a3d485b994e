//! Knowledge store reader
//!
//! Looks up previously persisted items whose source URL matches the page
//! being processed, supplying merge-mode extraction with their current
//! bodies. Every failure here degrades to "no existing content": a bad
//! manifest or unreadable file must never cost us the page.

use crate::knowledge::ExistingItem;
use crate::store::index::load_manifest;
use std::path::Path;

/// Returns all persisted items extracted from `url`, with bodies
pub fn find_existing(root: &Path, url: &str) -> Vec<ExistingItem> {
    let manifest = load_manifest(root);

    let mut existing = Vec::new();
    for entry in manifest.items {
        if entry.source != url {
            continue;
        }

        let path = root.join(&entry.path);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Indexed file missing or unreadable {}: {}", path.display(), e);
                continue;
            }
        };

        existing.push(ExistingItem {
            category: entry.class,
            title: entry.title,
            body: body_after_front_matter(&content).to_string(),
            path: path.clone(),
        });
    }

    existing
}

/// Returns the part of a knowledge file after its front-matter block
pub(crate) fn body_after_front_matter(content: &str) -> &str {
    if let Some(rest) = content.strip_prefix("---\n") {
        if let Some(end) = rest.find("\n---\n") {
            return rest[end + 5..].trim_start();
        }
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{Category, KnowledgeItem, PrincipleRecord, SourceDescriptor};
    use crate::store::{index, writer};
    use chrono::Utc;
    use tempfile::TempDir;

    fn principle(name: &str) -> KnowledgeItem {
        KnowledgeItem::Principle(PrincipleRecord {
            name: name.to_string(),
            statement: Some("Put rooks behind passed pawns.".to_string()),
            rationale: None,
            examples: vec![],
            exceptions: vec![],
            tags: vec![],
        })
    }

    fn source(url: &str) -> SourceDescriptor {
        SourceDescriptor {
            url: url.to_string(),
            title: "Endgame advice".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_body_after_front_matter() {
        let content = "---\ntitle: X\nmeta:\n  eco: null\n---\n\n# X\n\n## Statement\nBody text\n";
        let body = body_after_front_matter(content);
        assert!(body.starts_with("# X"));
        assert!(body.contains("Body text"));
        assert!(!body.contains("eco:"));
    }

    #[test]
    fn test_content_without_front_matter_returned_whole() {
        assert_eq!(body_after_front_matter("plain text"), "plain text");
    }

    #[test]
    fn test_find_existing_filters_by_source() {
        let dir = TempDir::new().unwrap();
        let src_a = source("https://a.example/endgames");
        let src_b = source("https://b.example/other");

        let e1 = writer::write_item(dir.path(), &principle("Rooks Behind Pawns"), &src_a).unwrap();
        let e2 = writer::write_item(dir.path(), &principle("King Activity"), &src_b).unwrap();
        index::apply(dir.path(), &[e1, e2], &[]).unwrap();

        let existing = find_existing(dir.path(), "https://a.example/endgames");
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].title, "Rooks Behind Pawns");
        assert_eq!(existing[0].category, Category::Principle);
        assert!(existing[0].body.contains("Put rooks behind passed pawns."));
        assert!(!existing[0].body.contains("scraped_at"));
    }

    #[test]
    fn test_missing_manifest_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        assert!(find_existing(dir.path(), "https://a.example").is_empty());
    }

    #[test]
    fn test_indexed_but_deleted_file_skipped() {
        let dir = TempDir::new().unwrap();
        let src = source("https://a.example/endgames");
        let entry = writer::write_item(dir.path(), &principle("Rooks Behind Pawns"), &src).unwrap();
        index::apply(dir.path(), &[entry.clone()], &[]).unwrap();

        std::fs::remove_file(dir.path().join(&entry.path)).unwrap();

        assert!(find_existing(dir.path(), "https://a.example/endgames").is_empty());
    }
}
