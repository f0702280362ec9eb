//! Scraping proxy URL construction
//!
//! Search pages are fetched through a third-party rendering proxy so requests
//! look like they come from a residential client in the configured country.
//! The proxy call is a plain GET:
//!
//! `{proxy_url}?url=<target>&x-api-key=<key>&browser=false&country=es`

use std::fmt;
use url::Url;

use crate::config::ScraperConfig;
use crate::error::{Error, Result};

/// Wraps target URLs into proxy requests
#[derive(Clone)]
pub struct ProxyGateway {
    base: String,
    api_key: Option<String>,
    country: String,
    browser: bool,
}

impl ProxyGateway {
    pub fn new(
        base: impl Into<String>,
        api_key: Option<String>,
        country: impl Into<String>,
        browser: bool,
    ) -> Self {
        Self {
            base: base.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            country: country.into(),
            browser,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.proxy_url.clone(),
            config.api_key.clone(),
            config.country.clone(),
            config.browser,
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Proxy URL fetching `target`
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] when no API key is configured; there
    /// is no unauthenticated fallback.
    pub fn wrap(&self, target: &str) -> Result<Url> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::missing_config("scraping proxy API key (SCRAPINGANT_KEY)"))?;

        let browser = if self.browser { "true" } else { "false" };
        let url = Url::parse_with_params(
            &self.base,
            &[
                ("url", target),
                ("x-api-key", key),
                ("browser", browser),
                ("country", self.country.as_str()),
            ],
        )?;

        Ok(url)
    }
}

impl fmt::Debug for ProxyGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyGateway")
            .field("base", &self.base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("country", &self.country)
            .field("browser", &self.browser)
            .finish()
    }
}
