//! Generic `wp/v2` content collection client

use crate::config::WordPressConfig;
use crate::error::{Error, Result};
use crate::models::{ContentRecord, NewContent};
use crate::wp::WpClient;

/// Filters for a list request, passed straight through as query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub per_page: u32,
    pub filters: Vec<(String, String)>,
}

impl ContentQuery {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![(String::from("per_page"), self.per_page.to_string())];
        params.extend(
            self.filters
                .iter()
                .filter(|(k, _)| k != "per_page")
                .cloned(),
        );
        params
    }
}

/// Lists and creates typed content items
#[derive(Clone)]
pub struct ContentClient {
    wp: WpClient,
    base_url: String,
    page_size: u32,
}

impl ContentClient {
    pub fn new(config: &WordPressConfig) -> Result<Self> {
        Ok(Self::with_client(
            WpClient::new(config)?,
            &config.base_url,
            config.page_size,
        ))
    }

    /// `base_url` is the `wp-json` root
    pub fn with_client(wp: WpClient, base_url: &str, page_size: u32) -> Self {
        Self {
            wp,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
        }
    }

    /// Query with the configured page size and no filters
    pub fn default_query(&self) -> ContentQuery {
        ContentQuery::new(self.page_size)
    }

    /// Collection URL for `content_type`
    pub fn collection_url(&self, content_type: &str) -> Result<String> {
        let valid = !content_type.is_empty()
            && content_type
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::config(format!("invalid content type: {content_type:?}")));
        }
        Ok(format!("{}/wp/v2/{content_type}", self.base_url))
    }

    /// List one page of `content_type` items
    pub async fn list(&self, content_type: &str, query: &ContentQuery) -> Result<Vec<ContentRecord>> {
        let url = self.collection_url(content_type)?;
        let items: Vec<ContentRecord> = self.wp.get_json(&url, &query.to_params()).await?;
        tracing::info!(content_type, count = items.len(), "Listed content");
        Ok(items)
    }

    /// Create a `content_type` item
    pub async fn create(&self, content_type: &str, item: &NewContent) -> Result<ContentRecord> {
        let url = self.collection_url(content_type)?;
        let created: ContentRecord = self.wp.post_json(&url, item).await?;
        tracing::info!(content_type, id = %created.id, title = %item.title, "Created content");
        Ok(created)
    }
}
