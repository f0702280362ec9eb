//! HTTP fetcher for search results pages
//!
//! This module fetches results pages either through the scraping proxy or
//! directly, with:
//! - browser-like headers
//! - a fixed per-call timeout and no retries
//! - charset detection from `Content-Type`, falling back to UTF-8 and then
//!   windows-1252

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use reqwest::{header::HeaderMap, Client};
use url::Url;

use crate::config::{FetchMode, ScraperConfig};
use crate::crawler::headers::build_browser_headers;
use crate::crawler::proxy::ProxyGateway;
use crate::error::{Error, Result};

/// Results page fetcher
pub struct SerpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Browser-like request headers
    headers: HeaderMap,

    /// Direct or proxied
    mode: FetchMode,

    /// Proxy URL builder, used in [`FetchMode::Proxy`]
    gateway: ProxyGateway,
}

impl SerpFetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the HTTP client cannot be created
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            headers: build_browser_headers(&config.user_agent, &config.language),
            mode: config.mode,
            gateway: ProxyGateway::from_config(config),
        })
    }

    /// URL actually requested for `target`
    ///
    /// # Errors
    ///
    /// In proxy mode, returns `Error::MissingConfig` when no API key is set
    pub fn request_url(&self, target: &str) -> Result<Url> {
        match self.mode {
            FetchMode::Proxy => self.gateway.wrap(target),
            FetchMode::Direct => Ok(Url::parse(target)?),
        }
    }

    /// Fetch `target` and return the decoded body
    ///
    /// # Errors
    ///
    /// - `Error::MissingConfig` in proxy mode without an API key (no request
    ///   is sent)
    /// - `Error::Transport` on network failure or timeout
    /// - `Error::Status` on a non-2xx answer
    pub async fn fetch(&self, target: &str) -> Result<String> {
        let url = self.request_url(target)?;

        tracing::debug!(target = %target, mode = ?self.mode, "Fetching results page");

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::status("GET", target, status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;
        Ok(decode_body(&bytes, &content_type))
    }
}

/// Decode a response body
///
/// Uses the `charset` from `content_type` when it names a known encoding,
/// otherwise strict UTF-8, otherwise windows-1252.
pub fn decode_body(bytes: &[u8], content_type: &str) -> String {
    if let Some(encoding) = charset_from_content_type(content_type) {
        let (cow, _encoding, _had_errors) = encoding.decode(bytes);
        return cow.into_owned();
    }

    let (cow, had_errors) = UTF_8.decode_without_bom_handling(bytes);
    if !had_errors {
        return cow.into_owned();
    }

    let (cow, _encoding, _had_errors) = WINDOWS_1252.decode(bytes);
    cow.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, label)| Encoding::for_label(label.trim().trim_matches('"').as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: FetchMode, key: Option<&str>) -> ScraperConfig {
        ScraperConfig {
            mode,
            api_key: key.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_declared_charset() {
        // "Señor" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x65, 0xf1, 0x6f, 0x72];
        assert_eq!(decode_body(bytes, "text/html; charset=ISO-8859-1"), "Señor");
    }

    #[test]
    fn test_decode_utf8_default() {
        let text = "Hoteles en Tenerife – opiniones";
        assert_eq!(decode_body(text.as_bytes(), "text/html"), text);
    }

    #[test]
    fn test_decode_fallback_to_windows_1252() {
        let bytes: &[u8] = &[0x4d, 0x61, 0xf1, 0x61, 0x6e, 0x61];
        assert_eq!(decode_body(bytes, ""), "Mañana");
    }

    #[test]
    fn test_quoted_charset() {
        let encoding = charset_from_content_type("text/html; Charset=\"utf-8\"").unwrap();
        assert_eq!(encoding, UTF_8);
        assert!(charset_from_content_type("text/html").is_none());
    }

    #[test]
    fn test_request_url_direct() {
        let fetcher = SerpFetcher::new(&config(FetchMode::Direct, None)).unwrap();
        let url = fetcher.request_url("https://www.google.com/search?q=x").unwrap();
        assert_eq!(url.as_str(), "https://www.google.com/search?q=x");
    }

    #[test]
    fn test_request_url_proxy_requires_key() {
        let fetcher = SerpFetcher::new(&config(FetchMode::Proxy, None)).unwrap();
        assert!(fetcher.request_url("https://www.google.com/search?q=x").is_err());

        let fetcher = SerpFetcher::new(&config(FetchMode::Proxy, Some("k"))).unwrap();
        let url = fetcher.request_url("https://www.google.com/search?q=x").unwrap();
        assert_eq!(url.host_str(), Some("api.scrapingant.com"));
    }
}
