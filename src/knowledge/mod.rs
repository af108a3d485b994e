//! Knowledge data model
//!
//! One typed record per extracted fact, in one of six fixed categories. The
//! category set is closed: extraction, persistence, and the index all
//! dispatch over [`KnowledgeItem`] variants, so an unknown category is
//! unrepresentable.

mod extractor;
mod schema;

pub use extractor::{parse_bundle, ExtractionClient, Extractor};
pub use schema::bundle_schema;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The six knowledge categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Opening,
    MiddlegameConcept,
    EndgameTheme,
    TacticalPattern,
    AnnotatedGame,
    Principle,
}

impl Category {
    /// All categories, in the order bundles and files are processed
    pub const ALL: [Category; 6] = [
        Category::Opening,
        Category::MiddlegameConcept,
        Category::EndgameTheme,
        Category::TacticalPattern,
        Category::AnnotatedGame,
        Category::Principle,
    ];

    /// The category name used in front matter and the index manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Opening => "opening",
            Category::MiddlegameConcept => "middlegame-concept",
            Category::EndgameTheme => "endgame-theme",
            Category::TacticalPattern => "tactical-pattern",
            Category::AnnotatedGame => "annotated-game",
            Category::Principle => "principle",
        }
    }

    /// The directory a category's files live under
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Opening => "openings",
            Category::MiddlegameConcept => "middlegame",
            Category::EndgameTheme => "endgame",
            Category::TacticalPattern => "tactics",
            Category::AnnotatedGame => "games",
            Category::Principle => "principles",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a page's knowledge came from: captured url, title, and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub url: String,
    pub title: String,
    pub scraped_at: DateTime<Utc>,
}

/// A named sub-variation of an opening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    pub name: String,
    pub moves: String,
}

/// An opening: name, ECO code, side bias, main line, variations, ideas, traps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningRecord {
    pub name: String,
    pub eco: Option<String>,
    pub side: Option<String>,
    pub overview: Option<String>,
    pub main_line: Option<String>,
    pub variations: Vec<Variation>,
    pub ideas: Vec<String>,
    pub traps: Vec<String>,
    pub model_games: Vec<String>,
    pub tags: Vec<String>,
}

/// A middlegame concept: pawn structures, piece placement, planning themes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlegameRecord {
    pub name: String,
    pub overview: Option<String>,
    pub key_ideas: Vec<String>,
    pub plans: Vec<String>,
    pub examples: Vec<String>,
    pub tags: Vec<String>,
}

/// An endgame theme: the winning or drawing technique and its steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndgameRecord {
    pub name: String,
    pub technique: Option<String>,
    pub key_positions: Vec<String>,
    pub steps: Vec<String>,
    pub tags: Vec<String>,
}

/// A tactical pattern: motif, how to recognize it, example positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacticsRecord {
    pub name: String,
    pub description: Option<String>,
    pub recognition: Vec<String>,
    pub examples: Vec<String>,
    pub tags: Vec<String>,
}

/// An annotated game: players, occasion, movetext, lessons drawn from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub title: Option<String>,
    pub white: String,
    pub black: String,
    pub year: Option<i32>,
    pub event: Option<String>,
    pub result: Option<String>,
    pub summary: Option<String>,
    pub moves: Option<String>,
    pub lessons: Vec<String>,
    pub tags: Vec<String>,
}

/// A general principle: statement, rationale, examples, exceptions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipleRecord {
    pub name: String,
    pub statement: Option<String>,
    pub rationale: Option<String>,
    pub examples: Vec<String>,
    pub exceptions: Vec<String>,
    pub tags: Vec<String>,
}

/// One typed knowledge record
#[derive(Debug, Clone)]
pub enum KnowledgeItem {
    Opening(OpeningRecord),
    Middlegame(MiddlegameRecord),
    Endgame(EndgameRecord),
    Tactics(TacticsRecord),
    Game(GameRecord),
    Principle(PrincipleRecord),
}

impl KnowledgeItem {
    pub fn category(&self) -> Category {
        match self {
            KnowledgeItem::Opening(_) => Category::Opening,
            KnowledgeItem::Middlegame(_) => Category::MiddlegameConcept,
            KnowledgeItem::Endgame(_) => Category::EndgameTheme,
            KnowledgeItem::Tactics(_) => Category::TacticalPattern,
            KnowledgeItem::Game(_) => Category::AnnotatedGame,
            KnowledgeItem::Principle(_) => Category::Principle,
        }
    }

    /// The canonical title of the item
    ///
    /// Games without an explicit title fall back to "White vs Black".
    pub fn title(&self) -> String {
        let title = match self {
            KnowledgeItem::Opening(r) => r.name.clone(),
            KnowledgeItem::Middlegame(r) => r.name.clone(),
            KnowledgeItem::Endgame(r) => r.name.clone(),
            KnowledgeItem::Tactics(r) => r.name.clone(),
            KnowledgeItem::Game(r) => r
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| format!("{} vs {}", r.white, r.black)),
            KnowledgeItem::Principle(r) => r.name.clone(),
        };
        title.trim().to_string()
    }

    pub fn tags(&self) -> &[String] {
        match self {
            KnowledgeItem::Opening(r) => &r.tags,
            KnowledgeItem::Middlegame(r) => &r.tags,
            KnowledgeItem::Endgame(r) => &r.tags,
            KnowledgeItem::Tactics(r) => &r.tags,
            KnowledgeItem::Game(r) => &r.tags,
            KnowledgeItem::Principle(r) => &r.tags,
        }
    }
}

/// The full output of one extraction call: a source descriptor plus one
/// array per category. All six arrays must be present, empty or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionBundle {
    pub source: SourceDescriptor,
    pub opening: Vec<OpeningRecord>,
    pub middlegame: Vec<MiddlegameRecord>,
    pub endgame: Vec<EndgameRecord>,
    pub tactics: Vec<TacticsRecord>,
    pub games: Vec<GameRecord>,
    pub principles: Vec<PrincipleRecord>,
}

impl ExtractionBundle {
    pub fn item_count(&self) -> usize {
        self.opening.len()
            + self.middlegame.len()
            + self.endgame.len()
            + self.tactics.len()
            + self.games.len()
            + self.principles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Flattens the bundle into items, category order then response order
    pub fn into_items(self) -> Vec<KnowledgeItem> {
        let mut items = Vec::with_capacity(self.item_count());
        items.extend(self.opening.into_iter().map(KnowledgeItem::Opening));
        items.extend(self.middlegame.into_iter().map(KnowledgeItem::Middlegame));
        items.extend(self.endgame.into_iter().map(KnowledgeItem::Endgame));
        items.extend(self.tactics.into_iter().map(KnowledgeItem::Tactics));
        items.extend(self.games.into_iter().map(KnowledgeItem::Game));
        items.extend(self.principles.into_iter().map(KnowledgeItem::Principle));
        items
    }
}

/// A previously persisted item for the page being processed, supplied to
/// merge-mode extraction as context
#[derive(Debug, Clone)]
pub struct ExistingItem {
    pub category: Category,
    pub title: String,
    pub body: String,
    pub path: std::path::PathBuf,
}
