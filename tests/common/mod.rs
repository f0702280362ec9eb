//! Common test utilities

use std::path::PathBuf;

use tripdesk::config::{FetchMode, ScraperConfig, WordPressConfig};

/// Token for `admin:abcd efgh`
#[allow(dead_code)]
pub const BASIC_TOKEN: &str = "Basic YWRtaW46YWJjZCBlZmdo";

/// WordPress settings pointing at a mock server, with credentials
#[allow(dead_code)]
pub fn wp_config(server_uri: &str) -> WordPressConfig {
    WordPressConfig {
        base_url: format!("{server_uri}/wp-json"),
        user: Some("admin".to_string()),
        app_password: Some("abcd efgh".to_string()),
        ..Default::default()
    }
}

/// Scraper settings with the search engine and proxy on a mock server
#[allow(dead_code)]
pub fn scraper_config(server_uri: &str, mode: FetchMode, api_key: Option<&str>) -> ScraperConfig {
    ScraperConfig {
        mode,
        api_key: api_key.map(str::to_string),
        proxy_url: format!("{server_uri}/v2/general"),
        search_url: format!("{server_uri}/search"),
        ..Default::default()
    }
}

/// Load a results page fixture
#[allow(dead_code)]
pub fn serp_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/serp")
        .join(format!("{name}.html"));
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing fixture {}: {e}", path.display()))
}
