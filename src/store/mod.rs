//! Knowledge base persistence
//!
//! The knowledge base is a directory tree of front-matter Markdown files
//! (one per item, under a per-category directory) plus a single `index.json`
//! manifest. Files are derived renderings; the manifest is the source of
//! truth for what was extracted from where.

pub mod index;
pub mod reader;
pub mod writer;

pub use index::{IndexEntry, IndexManifest, ItemKey, INDEX_FILE};
pub use writer::slugify;

use crate::knowledge::{ExistingItem, KnowledgeItem, SourceDescriptor};
use crate::PersistenceError;
use std::path::{Path, PathBuf};

/// Handle on one knowledge base directory
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    root: PathBuf,
}

impl KnowledgeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes one item, returning its index projection
    pub fn write_item(
        &self,
        item: &KnowledgeItem,
        source: &SourceDescriptor,
    ) -> Result<IndexEntry, PersistenceError> {
        writer::write_item(&self.root, item, source)
    }

    /// Merges a write batch into the manifest; the only manifest mutation path
    pub fn update_index(
        &self,
        entries: &[IndexEntry],
        retired: &[ItemKey],
    ) -> Result<(), PersistenceError> {
        index::apply(&self.root, entries, retired)
    }

    /// Previously persisted items for a source URL, for merge-mode extraction
    pub fn find_existing(&self, url: &str) -> Vec<ExistingItem> {
        reader::find_existing(&self.root, url)
    }

    pub fn load_manifest(&self) -> IndexManifest {
        index::load_manifest(&self.root)
    }

    /// Removes a retired item file; an already-absent file is not an error
    pub fn remove_item_file(&self, path: &Path) -> Result<(), PersistenceError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }
}

/// Writes content to a temp file beside the target, then renames over it
pub(crate) fn write_atomic(path: &Path, content: &str) -> Result<(), PersistenceError> {
    let tmp = path.with_extension("tmp");

    std::fs::write(&tmp, content).map_err(|e| PersistenceError::Io {
        path: tmp.display().to_string(),
        source: e,
    })?;

    std::fs::rename(&tmp, path).map_err(|e| PersistenceError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
