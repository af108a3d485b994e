//! Search service client
//!
//! Thin client for a Serper-style JSON search API: one POST per query with
//! the query string, desired result count, and language hint; organic result
//! links come back in ranked order.

use crate::config::DiscoveryConfig;
use crate::HarvestError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: u32,
    hl: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

/// One ranked search hit; only the link is required
#[derive(Debug, Deserialize)]
pub struct OrganicResult {
    pub link: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// HTTP client for the discovery service
pub struct SearchClient {
    http: Client,
    config: DiscoveryConfig,
}

impl SearchClient {
    pub fn new(config: &DiscoveryConfig) -> Result<Self, HarvestError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Runs one query, returning organic result links in rank order
    ///
    /// Any failure is wrapped as a [`HarvestError::DiscoveryQuery`]; callers
    /// treat it as per-query, never run-fatal.
    pub async fn search(&self, query: &str) -> Result<Vec<OrganicResult>, HarvestError> {
        let request = SearchRequest {
            q: query,
            num: self.config.results_per_query,
            hl: &self.config.language,
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("X-API-KEY", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| query_error(query, &e.to_string()))?;

        if !response.status().is_success() {
            return Err(query_error(
                query,
                &format!("HTTP {}", response.status().as_u16()),
            ));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| query_error(query, &format!("unreadable response: {}", e)))?;

        Ok(parsed.organic)
    }
}

fn query_error(query: &str, message: &str) -> HarvestError {
    HarvestError::DiscoveryQuery {
        query: query.to_string(),
        message: message.to_string(),
    }
}
