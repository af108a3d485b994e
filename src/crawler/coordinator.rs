//! Crawl coordinator - main harvest orchestration logic
//!
//! Drives the per-run state machine (discover, connect, process pages,
//! disconnect) and the per-page pipeline: liveness check, page open,
//! navigation, normalization, existing-knowledge lookup, extraction, write
//! batch, index update, page close. Failures are classified as recoverable
//! (reconnect and retry the same URL within a bounded budget) or page-fatal
//! (abandon the URL and move on); the run itself always completes.

use crate::browser::{CdpRenderer, RenderedPage, Renderer};
use crate::config::{Config, CrawlerConfig};
use crate::content::{normalize_html, PageContent};
use crate::crawler::pacing::{DelayPolicy, PauseKind};
use crate::crawler::session::{CrawlSession, RunReport};
use crate::discovery::{discover, DiscoveredUrl, SearchClient, TOPIC_QUERIES};
use crate::knowledge::{ExtractionClient, Extractor, SourceDescriptor};
use crate::store::{ItemKey, KnowledgeStore};
use crate::{HarvestError, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;

/// How a page attempt failure is handled by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    /// Transport/session failure: reconnect and retry the same URL
    Recoverable,
    /// Abandon the URL without retry; the run continues
    PageFatal,
}

fn classify(error: &HarvestError) -> FailureClass {
    match error {
        HarvestError::Connection(_) => FailureClass::Recoverable,
        _ => FailureClass::PageFatal,
    }
}

/// Terminal outcome of one URL, after retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Completed { items_written: u64 },
    Abandoned,
}

/// Orchestrates one harvest run over a discovered URL list
///
/// Generic over the rendering and extraction seams so the state machine can
/// be exercised with scripted fakes; [`run_harvest`] wires the production
/// implementations.
pub struct Coordinator<R: Renderer, X: Extractor> {
    renderer: R,
    extractor: X,
    store: KnowledgeStore,
    limits: CrawlerConfig,
    delays: DelayPolicy,
    session: CrawlSession,
}

impl<R: Renderer, X: Extractor> Coordinator<R, X> {
    pub fn new(
        renderer: R,
        extractor: X,
        store: KnowledgeStore,
        limits: CrawlerConfig,
        delays: DelayPolicy,
    ) -> Self {
        Self {
            renderer,
            extractor,
            store,
            limits,
            delays,
            session: CrawlSession::new(),
        }
    }

    /// Processes discovered URLs in order until the page budget is spent
    pub async fn run(&mut self, urls: &[DiscoveredUrl]) -> RunReport {
        let budget = self.limits.max_pages as u64;

        for discovered in urls {
            if self.session.pages_processed >= budget {
                tracing::info!("Page budget of {} reached", budget);
                break;
            }

            if !self.session.visited.insert(discovered.url.clone()) {
                tracing::debug!("Already visited this run: {}", discovered.url);
                continue;
            }

            tracing::info!(
                "Page {}/{}: {}",
                self.session.pages_processed + 1,
                budget,
                discovered.url
            );

            match self.process_page(&discovered.url).await {
                PageOutcome::Completed { items_written } => {
                    self.session.items_extracted += items_written;
                }
                PageOutcome::Abandoned => {}
            }

            // The page counter advances on every terminal outcome, so the
            // run cannot stall on one URL.
            self.session.pages_processed += 1;
            self.delays.pause(PauseKind::PageGap).await;
        }

        RunReport {
            urls_discovered: urls.len(),
            pages_processed: self.session.pages_processed,
            items_extracted: self.session.items_extracted,
            recoveries: self.session.recoveries,
        }
    }

    /// Graceful teardown of the render session at run end
    pub async fn disconnect(&mut self) {
        self.renderer.disconnect().await;
    }

    /// Runs one URL through the pipeline inside the bounded retry loop
    async fn process_page(&mut self, url: &str) -> PageOutcome {
        let max_attempts = 1 + self.limits.max_page_retries;

        for attempt in 1..=max_attempts {
            let error = match self.attempt_page(url).await {
                Ok(items_written) => return PageOutcome::Completed { items_written },
                Err(e) => e,
            };

            match classify(&error) {
                FailureClass::Recoverable if attempt < max_attempts => {
                    tracing::warn!(
                        "Recoverable failure on {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        max_attempts,
                        error
                    );
                    if let Err(e) = self.renderer.reconnect().await {
                        tracing::error!("Reconnect failed, abandoning {}: {}", url, e);
                        return PageOutcome::Abandoned;
                    }
                    self.session.recoveries += 1;
                    self.delays.pause(PauseKind::ReconnectBackoff).await;
                }
                FailureClass::Recoverable => {
                    tracing::error!(
                        "Retries exhausted for {} after {} attempts: {}",
                        url,
                        max_attempts,
                        error
                    );
                    return PageOutcome::Abandoned;
                }
                FailureClass::PageFatal => {
                    tracing::error!("Abandoning {}: {}", url, error);
                    return PageOutcome::Abandoned;
                }
            }
        }

        PageOutcome::Abandoned
    }

    /// One attempt: liveness check, page open, pipeline, guaranteed close
    async fn attempt_page(&mut self, url: &str) -> Result<u64> {
        if !self.renderer.is_alive().await {
            return Err(HarvestError::Connection(
                "render session failed liveness probe".to_string(),
            ));
        }

        let mut page = self.renderer.open_page().await?;
        let result = self.drive_page(page.as_mut(), url).await;

        // Closed on every exit path; a close failure must not mask the
        // pipeline result.
        if let Err(e) = page.close().await {
            tracing::debug!("Page close failed for {}: {}", url, e);
        }

        result
    }

    /// Navigate, normalize, extract, persist; returns items written
    async fn drive_page(&mut self, page: &mut dyn RenderedPage, url: &str) -> Result<u64> {
        let timeout = Duration::from_millis(self.limits.navigation_timeout_ms);
        let raw = page.load(url, timeout).await?;

        let normalized = normalize_html(&raw.html);
        let title = raw
            .title
            .filter(|t| !t.trim().is_empty())
            .or(normalized.title)
            .unwrap_or_else(|| url.to_string());

        let content = PageContent {
            url: url.to_string(),
            title,
            markdown: normalized.markdown,
            scraped_at: Utc::now(),
        };

        if content.markdown.trim().is_empty() {
            tracing::info!("No readable content at {}, skipping extraction", url);
            return Ok(0);
        }

        let existing = self.store.find_existing(url);
        if !existing.is_empty() {
            tracing::debug!(
                "Merge mode: {} existing items for {}",
                existing.len(),
                url
            );
        }

        self.delays.pause(PauseKind::ExtractionGap).await;
        let bundle = self.extractor.extract(&content, &existing).await?;

        // The model echoes a source object to satisfy the schema, but our
        // own capture metadata is authoritative for persistence.
        let source = SourceDescriptor {
            url: content.url.clone(),
            title: content.title.clone(),
            scraped_at: content.scraped_at,
        };

        let items = bundle.into_items();
        let new_keys: HashSet<ItemKey> = items
            .iter()
            .map(|item| (item.category(), item.title(), source.url.clone()))
            .collect();

        let mut entries = Vec::new();
        for item in &items {
            match self.store.write_item(item, &source) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    // One item's write failure never costs the rest
                    tracing::error!("Skipping item \"{}\": {}", item.title(), e);
                }
            }
        }

        // Keys present before but absent from the new bundle are retired;
        // their files go only after the replacement batch is on disk.
        let retired: Vec<ItemKey> = existing
            .iter()
            .map(|ex| (ex.category, ex.title.clone(), source.url.clone()))
            .filter(|key| !new_keys.contains(key))
            .collect();

        self.store.update_index(&entries, &retired)?;
        self.remove_stale_files(&existing, &retired);

        tracing::info!("Wrote {} knowledge items from {}", entries.len(), url);
        Ok(entries.len() as u64)
    }

    /// Removes files of retired items, unless another manifest entry still
    /// references the same path
    fn remove_stale_files(
        &self,
        existing: &[crate::knowledge::ExistingItem],
        retired: &[ItemKey],
    ) {
        if retired.is_empty() {
            return;
        }

        let manifest = self.store.load_manifest();
        for ex in existing {
            let is_retired = retired
                .iter()
                .any(|(class, title, _)| *class == ex.category && *title == ex.title);
            if !is_retired {
                continue;
            }

            let still_referenced = manifest
                .items
                .iter()
                .any(|entry| self.store.root().join(&entry.path) == ex.path);
            if still_referenced {
                continue;
            }

            if let Err(e) = self.store.remove_item_file(&ex.path) {
                tracing::warn!("Failed to remove stale file {}: {}", ex.path.display(), e);
            }
        }
    }
}

/// Runs one complete harvest: discovery, connection, page processing,
/// disconnect
///
/// # Example
///
/// ```no_run
/// use caissa_harvest::config::load_config;
/// use caissa_harvest::crawler::run_harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_harvest(config).await?;
/// println!("{} items extracted", report.items_extracted);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: Config) -> Result<RunReport> {
    let delays = DelayPolicy::from_config(&config.crawler, config.browser.connect_backoff_ms);

    tracing::info!(
        "Discovering seed URLs ({} queries, {} results each)",
        TOPIC_QUERIES.len(),
        config.discovery.results_per_query
    );
    let search = SearchClient::new(&config.discovery)?;
    let urls = discover(&search, TOPIC_QUERIES, &delays).await;

    tracing::info!("Connecting to rendering service at {}", config.browser.endpoint);
    let renderer = CdpRenderer::connect(&config.browser).await?;
    let extractor = ExtractionClient::new(&config.extraction)?;
    let store = KnowledgeStore::new(&config.output.knowledge_dir);

    let mut coordinator =
        Coordinator::new(renderer, extractor, store, config.crawler.clone(), delays);
    let report = coordinator.run(&urls).await;
    coordinator.disconnect().await;

    tracing::info!(
        "Harvest complete: {} pages processed, {} items extracted, {} recoveries",
        report.pages_processed,
        report.items_extracted,
        report.recoveries
    );

    Ok(report)
}
