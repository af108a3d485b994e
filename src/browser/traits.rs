//! Render service seam
//!
//! The orchestrator drives rendering through these traits so the state
//! machine can be exercised with scripted fakes. The production
//! implementation speaks CDP to a remote browser endpoint.

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Title and rendered DOM captured from one navigation
#[derive(Debug, Clone)]
pub struct RawPage {
    pub title: Option<String>,
    pub html: String,
}

/// A live connection to the rendering service, reused across pages
#[async_trait]
pub trait Renderer: Send {
    /// Lightweight non-throwing liveness probe, checked before every page
    async fn is_alive(&self) -> bool;

    /// Replaces the session with a fresh connection, bounded retries inside
    async fn reconnect(&mut self) -> Result<()>;

    /// Opens a page-scoped rendering context
    async fn open_page(&mut self) -> Result<Box<dyn RenderedPage>>;

    /// Graceful teardown at run end
    async fn disconnect(&mut self);
}

/// A page-scoped rendering context; must be closed on every exit path
#[async_trait]
pub trait RenderedPage: Send {
    /// Navigates and captures the settled page
    ///
    /// Fails with `NavigationTimeout` when the page does not reach a
    /// quiescent state in time, and with a connection-class error when the
    /// transport drops mid-operation.
    async fn load(&mut self, url: &str, timeout: Duration) -> Result<RawPage>;

    async fn close(&mut self) -> Result<()>;
}
