use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE,
    USER_AGENT,
};

/// Build browser-like headers for search result requests
///
/// # Arguments
///
/// * `user_agent` - User agent string (typically a modern desktop browser UA)
/// * `language` - Preferred interface language, e.g. `es`
///
/// # Examples
///
/// ```
/// use tripdesk::crawler::headers::build_browser_headers;
///
/// let headers = build_browser_headers(
///     "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
///     "es",
/// );
/// assert!(headers.contains_key("user-agent"));
/// ```
pub fn build_browser_headers(user_agent: &str, language: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    if let Ok(value) = HeaderValue::from_str(&accept_language(language)) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    headers
}

/// `Accept-Language` value preferring `language`, then English
pub fn accept_language(language: &str) -> String {
    let language = language.trim();
    if language.is_empty() || language.eq_ignore_ascii_case("en") {
        return String::from("en-US,en;q=0.9");
    }
    format!("{language},{language};q=0.9,en;q=0.8")
}

/// Build headers for WordPress REST calls
///
/// `auth_token` is the base64 `user:app_password` pair; without it the
/// request goes out unauthenticated.
///
/// # Examples
///
/// ```
/// use tripdesk::crawler::headers::build_json_headers;
///
/// let headers = build_json_headers(Some("YWRtaW46c2VjcmV0"));
/// assert_eq!(headers["authorization"], "Basic YWRtaW46c2VjcmV0");
/// ```
pub fn build_json_headers(auth_token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(token) = auth_token {
        match HeaderValue::from_str(&format!("Basic {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring unusable credentials"),
        }
    }

    headers
}
