//! Wiring of the configured clients

use crate::config::Config;
use crate::crawler::Harvester;
use crate::error::Result;
use crate::wp::{ContentClient, RelationClient, WpClient};

/// Everything an action needs, built once from [`Config`]
pub struct App {
    pub config: Config,
    pub relations: RelationClient,
    pub content: ContentClient,
    pub harvester: Harvester,
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        let wp = WpClient::new(&config.wordpress)?;
        if !wp.is_authenticated() {
            tracing::warn!("WordPress credentials not set; write calls will likely be rejected");
        }

        Ok(Self {
            relations: RelationClient::with_client(wp.clone(), config.wordpress.relation_endpoint()),
            content: ContentClient::with_client(
                wp,
                &config.wordpress.base_url,
                config.wordpress.page_size,
            ),
            harvester: Harvester::new(&config.scraper)?,
            config: config.clone(),
        })
    }
}
