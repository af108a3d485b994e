//! URL discovery
//!
//! Runs the fixed topic query battery against the search service, filters
//! every organic link through the in-scope filter, and accumulates a
//! deduplicated seed list in first-seen order. Discovery runs to completion
//! before crawling starts; a single failed query is logged and skipped.

mod client;
mod queries;

pub use client::{OrganicResult, SearchClient};
pub use queries::TOPIC_QUERIES;

use crate::crawler::{DelayPolicy, PauseKind};
use crate::url::is_in_scope;
use std::collections::HashSet;

/// A candidate page with the query that surfaced it
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredUrl {
    pub url: String,
    pub query: String,
}

/// Runs the whole query battery and returns the ordered seed set
pub async fn discover(
    client: &SearchClient,
    queries: &[&str],
    delays: &DelayPolicy,
) -> Vec<DiscoveredUrl> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut discovered = Vec::new();

    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            delays.pause(PauseKind::QueryGap).await;
        }

        let results = match client.search(query).await {
            Ok(results) => results,
            Err(e) => {
                // Per-query failure never aborts discovery
                tracing::warn!("{}", e);
                continue;
            }
        };

        let mut accepted = 0;
        for result in results {
            if !is_in_scope(&result.link) {
                continue;
            }
            if seen.insert(result.link.clone()) {
                discovered.push(DiscoveredUrl {
                    url: result.link,
                    query: query.to_string(),
                });
                accepted += 1;
            }
        }

        tracing::debug!("Query \"{}\": {} new in-scope links", query, accepted);
    }

    tracing::info!(
        "Discovery complete: {} unique in-scope URLs from {} queries",
        discovered.len(),
        queries.len()
    );

    discovered
}
