//! Configuration management for tripdesk
//!
//! Settings are loaded once at startup from an optional TOML file, then
//! overridden by environment variables (this is where credentials and the
//! proxy key normally come from). The resulting [`Config`] is passed by
//! reference to every component that needs it.

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::parser::serp::SerpFormat;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WordPress REST configuration
    pub wordpress: WordPressConfig,

    /// Search result harvesting configuration
    pub scraper: ScraperConfig,

    /// Sink file configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// WordPress / JetEngine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordPressConfig {
    /// Base of the REST API, e.g. `https://example.com/wp-json`
    pub base_url: String,

    /// JetEngine relation ID (accommodation -> review)
    pub relation_id: u32,

    /// Application-password user
    pub user: Option<String>,

    /// Application password
    pub app_password: Option<String>,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// `per_page` sent with content list requests
    pub page_size: u32,
}

/// Fetch mode for search result pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Route requests through the scraping proxy
    Proxy,
    /// Request the search engine directly
    Direct,
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "proxy" => Ok(Self::Proxy),
            "direct" => Ok(Self::Direct),
            other => Err(format!("unknown fetch mode: {other}")),
        }
    }
}

/// Search harvesting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// How result pages are fetched
    pub mode: FetchMode,

    /// Scraping proxy API key
    pub api_key: Option<String>,

    /// Scraping proxy endpoint
    pub proxy_url: String,

    /// Country hint passed to the proxy
    pub country: String,

    /// Ask the proxy for a headless browser (more expensive)
    pub browser: bool,

    /// Search engine endpoint
    pub search_url: String,

    /// Interface language (`hl`)
    pub language: String,

    /// Maximum number of results kept per keyword
    pub top_n: usize,

    /// Markup shape to extract, or auto-detect
    pub extraction: SerpFormat,

    /// User agent string
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Post type used when publishing harvested links as content
    pub source_type: String,
}

/// Layout of rows written to the sink file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkLayout {
    /// `keyword,title,link,result_number,scraped_at`
    Rich,
    /// `timestamp,url`
    Minimal,
}

/// Sink file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// CSV file harvested results are appended to
    pub csv_path: PathBuf,

    /// Pending records that trigger an automatic flush
    pub flush_threshold: usize,

    /// Row layout
    pub layout: SinkLayout,

    /// Pre-load seen links from the existing sink file
    pub seed_seen_from_sink: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://triptoislands.com/wp-json"),
            relation_id: 12,
            user: None,
            app_password: None,
            request_timeout_secs: 10,
            page_size: 20,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Proxy,
            api_key: None,
            proxy_url: String::from("https://api.scrapingant.com/v2/general"),
            country: String::from("es"),
            browser: false,
            search_url: String::from("https://www.google.com/search"),
            language: String::from("es"),
            top_n: 5,
            extraction: SerpFormat::Auto,
            user_agent: String::from(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
            ),
            request_timeout_secs: 30,
            source_type: String::from("fuentes"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("urls_resultados.csv"),
            flush_threshold: 10,
            layout: SinkLayout::Rich,
            seed_seen_from_sink: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl WordPressConfig {
    /// Endpoint of the configured JetEngine relation
    pub fn relation_endpoint(&self) -> String {
        format!(
            "{}/jet-rel/{}",
            self.base_url.trim_end_matches('/'),
            self.relation_id
        )
    }

    /// Base64 `user:app_password` token, if both halves are set
    pub fn basic_auth_token(&self) -> Option<String> {
        match (self.user.as_deref(), self.app_password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some(
                base64::engine::general_purpose::STANDARD.encode(format!("{user}:{pass}")),
            ),
            _ => None,
        }
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ScraperConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the file (if any), apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        let wp = &mut self.wordpress;
        if let Some(v) = env_var("TRIPDESK_WP_BASE_URL") {
            wp.base_url = v;
        }
        if let Some(v) = env_parse("TRIPDESK_RELATION_ID")? {
            wp.relation_id = v;
        }
        if let Some(v) = env_var("WP_USER") {
            wp.user = Some(v);
        }
        if let Some(v) = env_var("WP_APP_PASS") {
            wp.app_password = Some(v);
        }
        if let Some(v) = env_parse("TRIPDESK_WP_TIMEOUT")? {
            wp.request_timeout_secs = v;
        }
        if let Some(v) = env_parse("TRIPDESK_PAGE_SIZE")? {
            wp.page_size = v;
        }

        let scraper = &mut self.scraper;
        if let Some(v) = env_var("SCRAPINGANT_KEY") {
            scraper.api_key = Some(v);
        }
        if let Some(v) = env_var("TRIPDESK_FETCH_MODE") {
            scraper.mode = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = env_var("TRIPDESK_PROXY_URL") {
            scraper.proxy_url = v;
        }
        if let Some(v) = env_var("TRIPDESK_COUNTRY") {
            scraper.country = v;
        }
        if let Some(v) = env_var("TRIPDESK_SEARCH_URL") {
            scraper.search_url = v;
        }
        if let Some(v) = env_var("TRIPDESK_SEARCH_LANG") {
            scraper.language = v;
        }
        if let Some(v) = env_parse("TRIPDESK_TOP_N")? {
            scraper.top_n = v;
        }
        if let Some(v) = env_var("TRIPDESK_EXTRACTION") {
            scraper.extraction = v.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(v) = env_var("TRIPDESK_USER_AGENT") {
            scraper.user_agent = v;
        }
        if let Some(v) = env_parse("TRIPDESK_SCRAPER_TIMEOUT")? {
            scraper.request_timeout_secs = v;
        }
        if let Some(v) = env_var("TRIPDESK_SOURCE_TYPE") {
            scraper.source_type = v;
        }

        if let Some(v) = env_var("TRIPDESK_CSV_PATH") {
            self.storage.csv_path = PathBuf::from(v);
        }
        if let Some(v) = env_parse("TRIPDESK_FLUSH_THRESHOLD")? {
            self.storage.flush_threshold = v;
        }

        if let Some(v) = env_var("TRIPDESK_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = env_var("TRIPDESK_LOG_FORMAT") {
            self.logging.format = v;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.wordpress.base_url).with_context(|| {
            format!("wordpress.base_url is not a URL: {}", self.wordpress.base_url)
        })?;

        url::Url::parse(&self.scraper.search_url).with_context(|| {
            format!("scraper.search_url is not a URL: {}", self.scraper.search_url)
        })?;

        url::Url::parse(&self.scraper.proxy_url).with_context(|| {
            format!("scraper.proxy_url is not a URL: {}", self.scraper.proxy_url)
        })?;

        if self.wordpress.request_timeout_secs == 0 || self.scraper.request_timeout_secs == 0 {
            anyhow::bail!("request timeouts must be greater than 0");
        }

        if self.scraper.extraction == SerpFormat::Unknown {
            anyhow::bail!("scraper.extraction must be auto, modern, container or redirect");
        }

        if self.scraper.top_n == 0 {
            anyhow::bail!("top_n must be greater than 0");
        }

        if self.storage.flush_threshold == 0 {
            anyhow::bail!("flush_threshold must be greater than 0");
        }

        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: {v}")),
        None => Ok(None),
    }
}
