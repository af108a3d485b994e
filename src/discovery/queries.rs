//! The discovery query battery
//!
//! A fixed, ordered, topic-diverse set of queries covering the six knowledge
//! categories plus survey material. Order matters: seed URLs keep first-seen
//! order across the whole battery.

/// Queries issued once each per discovery run
pub const TOPIC_QUERIES: &[&str] = &[
    "chess opening theory main lines explained",
    "best chess openings repertoire guide",
    "chess middlegame strategy pawn structures",
    "chess middlegame planning piece placement",
    "chess endgame technique rook endings",
    "king and pawn endgame fundamentals",
    "chess tactics patterns pin fork skewer",
    "tactical motifs chess combinations explained",
    "famous annotated chess games analysis",
    "classic chess games commentary grandmaster",
    "chess principles for club players",
    "chess strategy fundamentals improvement guide",
    "chess knowledge encyclopedia overview",
];
