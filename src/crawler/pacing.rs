//! Pacing policy
//!
//! Every deliberate pause in the pipeline goes through one policy object
//! keyed by call type, so tests run with zero delay and the real delays are
//! configuration, not constants scattered through the code.

use crate::config::CrawlerConfig;
use std::time::Duration;

/// The pipeline's distinct pause points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseKind {
    /// Between consecutive discovery queries
    QueryGap,
    /// After each processed page, success or failure
    PageGap,
    /// Immediately before each extraction request
    ExtractionGap,
    /// Between reconnect attempts after a recoverable failure
    ReconnectBackoff,
}

/// Maps pause points to durations
#[derive(Debug, Clone)]
pub struct DelayPolicy {
    query_gap: Duration,
    page_gap: Duration,
    extraction_gap: Duration,
    reconnect_backoff: Duration,
}

impl DelayPolicy {
    pub fn from_config(config: &CrawlerConfig, reconnect_backoff_ms: u64) -> Self {
        Self {
            query_gap: Duration::from_millis(config.query_delay_ms),
            page_gap: Duration::from_millis(config.page_delay_ms),
            extraction_gap: Duration::from_millis(config.extraction_delay_ms),
            reconnect_backoff: Duration::from_millis(reconnect_backoff_ms),
        }
    }

    /// Zero-delay policy for tests
    pub fn zero() -> Self {
        Self {
            query_gap: Duration::ZERO,
            page_gap: Duration::ZERO,
            extraction_gap: Duration::ZERO,
            reconnect_backoff: Duration::ZERO,
        }
    }

    pub fn duration(&self, kind: PauseKind) -> Duration {
        match kind {
            PauseKind::QueryGap => self.query_gap,
            PauseKind::PageGap => self.page_gap,
            PauseKind::ExtractionGap => self.extraction_gap,
            PauseKind::ReconnectBackoff => self.reconnect_backoff,
        }
    }

    pub async fn pause(&self, kind: PauseKind) {
        let duration = self.duration(kind);
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
