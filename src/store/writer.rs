//! Knowledge file writer
//!
//! Renders one knowledge item into its canonical file: a front-matter block
//! (title, type, source, capture time, tags, nullable meta fields) followed
//! by an H1 title and category-specific Markdown sections. The path is
//! derived deterministically from the title, so re-extraction of the same
//! logical item replaces its file; writes go through a temp file and rename
//! so no reader ever observes a half-written or deleted state.

use crate::knowledge::{
    EndgameRecord, GameRecord, KnowledgeItem, MiddlegameRecord, OpeningRecord, PrincipleRecord,
    SourceDescriptor, TacticsRecord,
};
use crate::store::index::IndexEntry;
use crate::PersistenceError;
use std::path::Path;

/// Slug length ceiling, keeping paths filesystem-safe everywhere
const MAX_SLUG_LEN: usize = 80;

/// Derives a filesystem-safe slug from an item title
///
/// Lowercases, maps every non-alphanumeric run to a single hyphen, trims,
/// and bounds the length. An unusable title degrades to "untitled".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_hyphen = true;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }

    while slug.len() > MAX_SLUG_LEN {
        // Cut at a hyphen when possible so truncation stays readable
        match slug[..MAX_SLUG_LEN].rfind('-') {
            Some(idx) => slug.truncate(idx),
            None => slug.truncate(MAX_SLUG_LEN),
        }
    }

    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// The manifest-relative path an item persists to
pub fn item_rel_path(item: &KnowledgeItem) -> String {
    format!("{}/{}.md", item.category().dir_name(), slugify(&item.title()))
}

/// Writes one item under the knowledge root, overwriting any prior file for
/// the same (category, title), and returns its index projection
pub fn write_item(
    root: &Path,
    item: &KnowledgeItem,
    source: &SourceDescriptor,
) -> Result<IndexEntry, PersistenceError> {
    let rel_path = item_rel_path(item);
    let path = root.join(&rel_path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let rendered = render_item(item, source);
    crate::store::write_atomic(&path, &rendered)?;

    Ok(IndexEntry {
        path: rel_path,
        title: item.title(),
        class: item.category(),
        source: source.url.clone(),
        scraped_at: source.scraped_at.to_rfc3339(),
        tags: item.tags().to_vec(),
    })
}

/// Renders the complete file content for one item
pub fn render_item(item: &KnowledgeItem, source: &SourceDescriptor) -> String {
    let mut out = String::new();

    render_front_matter(item, source, &mut out);

    out.push_str(&format!("\n# {}\n", item.title()));

    match item {
        KnowledgeItem::Opening(r) => render_opening(r, &mut out),
        KnowledgeItem::Middlegame(r) => render_middlegame(r, &mut out),
        KnowledgeItem::Endgame(r) => render_endgame(r, &mut out),
        KnowledgeItem::Tactics(r) => render_tactics(r, &mut out),
        KnowledgeItem::Game(r) => render_game(r, &mut out),
        KnowledgeItem::Principle(r) => render_principle(r, &mut out),
    }

    out
}

fn render_front_matter(item: &KnowledgeItem, source: &SourceDescriptor, out: &mut String) {
    let (eco, side) = match item {
        KnowledgeItem::Opening(r) => (r.eco.as_deref(), r.side.as_deref()),
        _ => (None, None),
    };
    let (year, event, result) = match item {
        KnowledgeItem::Game(r) => (r.year, r.event.as_deref(), r.result.as_deref()),
        _ => (None, None, None),
    };

    out.push_str("---\n");
    out.push_str(&format!("title: {}\n", item.title()));
    out.push_str(&format!("type: {}\n", item.category()));
    out.push_str(&format!("source_url: {}\n", source.url));
    out.push_str(&format!("scraped_at: {}\n", source.scraped_at.to_rfc3339()));
    out.push_str(&format!("tags: [{}]\n", item.tags().join(", ")));
    out.push_str("meta:\n");
    out.push_str(&format!("  eco: {}\n", eco.unwrap_or("null")));
    out.push_str(&format!("  side: {}\n", side.unwrap_or("null")));
    out.push_str(&format!(
        "  year: {}\n",
        year.map(|y| y.to_string()).unwrap_or_else(|| "null".to_string())
    ));
    out.push_str(&format!("  event: {}\n", event.unwrap_or("null")));
    out.push_str(&format!("  result: {}\n", result.unwrap_or("null")));
    out.push_str("---\n");
}

fn render_opening(r: &OpeningRecord, out: &mut String) {
    text_section(out, "Overview", r.overview.as_deref());
    fenced_section(out, "Main Line", r.main_line.as_deref());

    if !r.variations.is_empty() {
        out.push_str("\n## Key Variations\n");
        for variation in &r.variations {
            out.push_str(&format!("- **{}**: {}\n", variation.name, variation.moves));
        }
    }

    bullet_section(out, "Ideas", &r.ideas);
    bullet_section(out, "Traps", &r.traps);
    bullet_section(out, "Model Games", &r.model_games);
}

fn render_middlegame(r: &MiddlegameRecord, out: &mut String) {
    text_section(out, "Overview", r.overview.as_deref());
    bullet_section(out, "Key Ideas", &r.key_ideas);
    bullet_section(out, "Plans", &r.plans);
    bullet_section(out, "Examples", &r.examples);
}

fn render_endgame(r: &EndgameRecord, out: &mut String) {
    text_section(out, "Technique", r.technique.as_deref());
    bullet_section(out, "Key Positions", &r.key_positions);
    numbered_section(out, "Steps", &r.steps);
}

fn render_tactics(r: &TacticsRecord, out: &mut String) {
    text_section(out, "Description", r.description.as_deref());
    bullet_section(out, "Recognition", &r.recognition);
    bullet_section(out, "Examples", &r.examples);
}

fn render_game(r: &GameRecord, out: &mut String) {
    text_section(out, "Summary", r.summary.as_deref());
    fenced_section(out, "Moves", r.moves.as_deref());
    bullet_section(out, "Lessons", &r.lessons);
}

fn render_principle(r: &PrincipleRecord, out: &mut String) {
    text_section(out, "Statement", r.statement.as_deref());
    text_section(out, "Rationale", r.rationale.as_deref());
    bullet_section(out, "Examples", &r.examples);
    bullet_section(out, "Exceptions", &r.exceptions);
}

fn text_section(out: &mut String, heading: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        out.push_str(&format!("\n## {}\n{}\n", heading, text.trim()));
    }
}

/// Movetext sections are fenced so notation is never reflowed
fn fenced_section(out: &mut String, heading: &str, text: Option<&str>) {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        out.push_str(&format!("\n## {}\n```\n{}\n```\n", heading, text.trim()));
    }
}

fn bullet_section(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {}\n", heading));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
}

fn numbered_section(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n## {}\n", heading));
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, item));
    }
}
