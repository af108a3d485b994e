use serde::Deserialize;

/// Main configuration structure for Caissa-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub browser: BrowserConfig,
    pub discovery: DiscoveryConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

/// Crawl budgets and pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages to process in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Crawl depth budget. Reserved: link-following beyond seed pages is
    /// not performed, but the budget is validated and reported.
    #[serde(rename = "max-depth", default)]
    pub max_depth: u32,

    /// Retries allowed per page for recoverable (connection-class) failures
    #[serde(rename = "max-page-retries", default = "default_page_retries")]
    pub max_page_retries: u32,

    /// Delay after each page, success or failure (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Delay between consecutive discovery queries (milliseconds)
    #[serde(rename = "query-delay-ms")]
    pub query_delay_ms: u64,

    /// Delay immediately before each extraction request (milliseconds)
    #[serde(rename = "extraction-delay-ms")]
    pub extraction_delay_ms: u64,

    /// How long a page may take to reach a quiescent state (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,
}

/// Remote rendering service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// WebSocket endpoint of the rendering service (ws:// or wss://)
    pub endpoint: String,

    /// Connection attempts before giving up
    #[serde(rename = "connect-retries", default = "default_connect_retries")]
    pub connect_retries: u32,

    /// Backoff between connection attempts (milliseconds)
    #[serde(rename = "connect-backoff-ms", default = "default_connect_backoff")]
    pub connect_backoff_ms: u64,

    /// Default viewport width for rendered pages
    #[serde(rename = "viewport-width", default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Default viewport height for rendered pages
    #[serde(rename = "viewport-height", default = "default_viewport_height")]
    pub viewport_height: u32,
}

/// Search discovery service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Search endpoint to POST queries to
    #[serde(default = "default_discovery_endpoint")]
    pub endpoint: String,

    /// Organic results requested per query
    #[serde(rename = "results-per-query", default = "default_results_per_query")]
    pub results_per_query: u32,

    /// Language hint passed with every query
    #[serde(default = "default_language")]
    pub language: String,

    /// Credential resolved from the environment, never from the TOML file
    #[serde(skip)]
    pub api_key: String,
}

/// Structured extraction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_extraction_endpoint")]
    pub endpoint: String,

    /// Model asked to produce the knowledge bundle
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion token ceiling per extraction call
    #[serde(rename = "max-output-tokens", default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Credential resolved from the environment, never from the TOML file
    #[serde(skip)]
    pub api_key: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory of the knowledge base (category dirs + index.json)
    #[serde(rename = "knowledge-dir")]
    pub knowledge_dir: String,
}

fn default_page_retries() -> u32 {
    2
}

fn default_connect_retries() -> u32 {
    3
}

fn default_connect_backoff() -> u64 {
    2000
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    800
}

fn default_discovery_endpoint() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_results_per_query() -> u32 {
    10
}

fn default_language() -> String {
    "en".to_string()
}

fn default_extraction_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_output_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.2
}
