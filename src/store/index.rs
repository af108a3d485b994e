//! Index manifest management
//!
//! The manifest (`index.json`) is the single source of truth for what was
//! extracted from where: one entry per distinct (class, title, source) key,
//! sorted by title. [`apply`] is the only mutation path; it loads, merges,
//! retires, and persists in one pass, and a missing or corrupt manifest
//! degrades to empty rather than failing the run.

use crate::knowledge::Category;
use crate::PersistenceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Manifest file name inside the knowledge directory
pub const INDEX_FILE: &str = "index.json";

/// Dedup key identifying a unique persisted knowledge item
pub type ItemKey = (Category, String, String);

/// The persisted projection of one knowledge item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub path: String,
    pub title: String,
    pub class: Category,
    pub source: String,
    pub scraped_at: String,
    pub tags: Vec<String>,
}

impl IndexEntry {
    pub fn key(&self) -> ItemKey {
        (self.class, self.title.clone(), self.source.clone())
    }
}

/// The manifest document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexManifest {
    pub items: Vec<IndexEntry>,
}

/// Loads the current manifest, degrading to empty on absence or corruption
pub fn load_manifest(root: &Path) -> IndexManifest {
    let path = root.join(INDEX_FILE);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return IndexManifest::default(),
    };

    match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!("Corrupt index manifest at {}: {}", path.display(), e);
            IndexManifest::default()
        }
    }
}

/// Merges a write batch into the manifest and persists it
///
/// New entries insert or overwrite by key; `retired` keys (superseded by a
/// merge re-extraction) are dropped. The result is written title-sorted,
/// via a temp file and rename.
pub fn apply(
    root: &Path,
    new_entries: &[IndexEntry],
    retired: &[ItemKey],
) -> Result<(), PersistenceError> {
    let manifest = load_manifest(root);

    let mut by_key: BTreeMap<ItemKey, IndexEntry> = manifest
        .items
        .into_iter()
        .map(|entry| (entry.key(), entry))
        .collect();

    for key in retired {
        by_key.remove(key);
    }

    for entry in new_entries {
        by_key.insert(entry.key(), entry.clone());
    }

    let mut items: Vec<IndexEntry> = by_key.into_values().collect();
    items.sort_by(|a, b| a.title.cmp(&b.title));

    let manifest = IndexManifest { items };
    let encoded = serde_json::to_string_pretty(&manifest)?;

    crate::store::write_atomic(&root.join(INDEX_FILE), &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(class: Category, title: &str, source: &str) -> IndexEntry {
        IndexEntry {
            path: format!("{}/{}.md", class.dir_name(), title.to_lowercase()),
            title: title.to_string(),
            class,
            source: source.to_string(),
            scraped_at: "2026-01-01T00:00:00+00:00".to_string(),
            tags: vec!["test".to_string()],
        }
    }

    #[test]
    fn test_missing_manifest_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let manifest = load_manifest(dir.path());
        assert!(manifest.items.is_empty());
    }

    #[test]
    fn test_corrupt_manifest_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), "{ not json").unwrap();
        let manifest = load_manifest(dir.path());
        assert!(manifest.items.is_empty());
    }

    #[test]
    fn test_apply_inserts_and_persists_sorted() {
        let dir = TempDir::new().unwrap();
        let entries = vec![
            entry(Category::Opening, "Sicilian Defense", "https://a.example"),
            entry(Category::Principle, "Activity", "https://a.example"),
        ];

        apply(dir.path(), &entries, &[]).unwrap();

        let manifest = load_manifest(dir.path());
        assert_eq!(manifest.items.len(), 2);
        assert_eq!(manifest.items[0].title, "Activity");
        assert_eq!(manifest.items[1].title, "Sicilian Defense");
    }

    #[test]
    fn test_same_key_overwrites_latest_wins() {
        let dir = TempDir::new().unwrap();
        let first = entry(Category::Opening, "Sicilian Defense", "https://a.example");
        apply(dir.path(), &[first], &[]).unwrap();

        let mut second = entry(Category::Opening, "Sicilian Defense", "https://a.example");
        second.scraped_at = "2026-02-01T00:00:00+00:00".to_string();
        apply(dir.path(), &[second.clone()], &[]).unwrap();

        let manifest = load_manifest(dir.path());
        assert_eq!(manifest.items.len(), 1);
        assert_eq!(manifest.items[0], second);
    }

    #[test]
    fn test_same_title_different_source_both_kept() {
        let dir = TempDir::new().unwrap();
        let entries = vec![
            entry(Category::Opening, "Sicilian Defense", "https://a.example"),
            entry(Category::Opening, "Sicilian Defense", "https://b.example"),
        ];

        apply(dir.path(), &entries, &[]).unwrap();
        assert_eq!(load_manifest(dir.path()).items.len(), 2);
    }

    #[test]
    fn test_no_duplicate_keys_across_batches() {
        let dir = TempDir::new().unwrap();
        let e = entry(Category::TacticalPattern, "Fork", "https://a.example");

        apply(dir.path(), &[e.clone()], &[]).unwrap();
        apply(dir.path(), &[e.clone()], &[]).unwrap();
        apply(dir.path(), &[e], &[]).unwrap();

        assert_eq!(load_manifest(dir.path()).items.len(), 1);
    }

    #[test]
    fn test_retired_keys_removed() {
        let dir = TempDir::new().unwrap();
        let old = entry(Category::EndgameTheme, "Lucena", "https://a.example");
        let kept = entry(Category::EndgameTheme, "Philidor", "https://a.example");
        apply(dir.path(), &[old.clone(), kept.clone()], &[]).unwrap();

        apply(dir.path(), &[], &[old.key()]).unwrap();

        let manifest = load_manifest(dir.path());
        assert_eq!(manifest.items.len(), 1);
        assert_eq!(manifest.items[0].title, "Philidor");
    }
}
