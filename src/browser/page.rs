//! Page-scoped rendering context over CDP

use crate::browser::traits::{RawPage, RenderedPage};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use std::time::Duration;

/// One CDP target, closed exactly once
pub struct CdpPage {
    page: Option<Page>,
}

impl CdpPage {
    pub(crate) fn new(page: Page) -> Self {
        Self { page: Some(page) }
    }
}

#[async_trait]
impl RenderedPage for CdpPage {
    async fn load(&mut self, url: &str, timeout: Duration) -> Result<RawPage> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| HarvestError::Connection("page context already closed".to_string()))?;

        let navigation = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            let title = page.get_title().await?;
            let html = page.content().await?;
            Ok::<RawPage, CdpError>(RawPage { title, html })
        };

        match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(classify_cdp_error(url, timeout, e)),
            Err(_) => Err(HarvestError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            page.close()
                .await
                .map_err(|e| HarvestError::Connection(format!("page close failed: {}", e)))?;
        }
        Ok(())
    }
}

/// Maps CDP failures onto the harvest taxonomy: protocol timeouts become
/// navigation timeouts, everything else is connection-class
fn classify_cdp_error(url: &str, timeout: Duration, error: CdpError) -> HarvestError {
    match error {
        CdpError::Timeout => HarvestError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        },
        other => HarvestError::Connection(other.to_string()),
    }
}

pub(crate) fn connection_error(error: CdpError) -> HarvestError {
    HarvestError::Connection(error.to_string())
}
