//! Render session manager
//!
//! Owns the connection to the remote rendering endpoint. Each connection
//! attempt is transport connect plus a version probe; a probe failure counts
//! as a failed attempt even when the transport came up. Reconnection
//! replaces the browser handle wholesale.

use crate::browser::page::{connection_error, CdpPage};
use crate::browser::traits::{RenderedPage, Renderer};
use crate::config::BrowserConfig;
use crate::{HarvestError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::handler::HandlerConfig;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The production renderer: one CDP session shared across all pages
pub struct CdpRenderer {
    config: BrowserConfig,
    browser: Browser,
    event_loop: JoinHandle<()>,
}

impl CdpRenderer {
    /// Connects with bounded retries; fails the run when they are exhausted
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let (browser, event_loop) = connect_with_retries(config).await?;
        Ok(Self {
            config: config.clone(),
            browser,
            event_loop,
        })
    }
}

async fn connect_with_retries(config: &BrowserConfig) -> Result<(Browser, JoinHandle<()>)> {
    let backoff = Duration::from_millis(config.connect_backoff_ms);
    let mut last_error = String::new();

    for attempt in 1..=config.connect_retries {
        if attempt > 1 {
            tokio::time::sleep(backoff).await;
        }

        match connect_once(config).await {
            Ok(session) => {
                tracing::info!(
                    "Rendering session established (attempt {}/{})",
                    attempt,
                    config.connect_retries
                );
                return Ok(session);
            }
            Err(e) => {
                tracing::warn!(
                    "Rendering connection attempt {}/{} failed: {}",
                    attempt,
                    config.connect_retries,
                    e
                );
                last_error = e.to_string();
            }
        }
    }

    Err(HarvestError::Connection(format!(
        "exhausted {} connection attempts: {}",
        config.connect_retries, last_error
    )))
}

async fn connect_once(config: &BrowserConfig) -> Result<(Browser, JoinHandle<()>)> {
    let handler_config = HandlerConfig {
        ignore_https_errors: true,
        viewport: Some(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            ..Default::default()
        }),
        ..Default::default()
    };

    let (browser, mut handler) =
        Browser::connect_with_config(config.endpoint.clone(), handler_config)
            .await
            .map_err(connection_error)?;

    let event_loop = tokio::task::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    });

    // The transport can come up against a dead service; the version probe
    // is the actual liveness check.
    match browser.version().await {
        Ok(version) => {
            tracing::debug!("Rendering service alive: {}", version.product);
            Ok((browser, event_loop))
        }
        Err(e) => {
            event_loop.abort();
            Err(HarvestError::Connection(format!(
                "liveness probe failed: {}",
                e
            )))
        }
    }
}

#[async_trait]
impl Renderer for CdpRenderer {
    async fn is_alive(&self) -> bool {
        self.browser.version().await.is_ok()
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.event_loop.abort();

        let (browser, event_loop) = connect_with_retries(&self.config).await?;
        self.browser = browser;
        self.event_loop = event_loop;

        Ok(())
    }

    async fn open_page(&mut self) -> Result<Box<dyn RenderedPage>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(connection_error)?;

        Ok(Box::new(CdpPage::new(page)))
    }

    async fn disconnect(&mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        self.event_loop.abort();
    }
}
