//! Unified error handling for the tripdesk crate
//!
//! Every failure that can happen while serving one user action is expressed
//! as an [`Error`]. Call sites catch it, show [`Error::user_message`] to the
//! operator and abort that one action; nothing here is fatal to the process.
//!
//! # Taxonomy
//!
//! - network or transport failure ([`Error::Transport`])
//! - non-2xx HTTP status ([`Error::Status`])
//! - malformed or absent response body ([`Error::Decode`], [`Error::Json`])
//! - missing configuration ([`Error::MissingConfig`], [`Error::Config`])
//! - sink file failures ([`Error::Io`], [`Error::Csv`])
//!
//! An empty result set is not an error.

use std::io;
use thiserror::Error;

/// Classification of errors for display and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection refused, DNS, TLS, timeout
    Network,
    /// The server answered with a non-success status
    Http,
    /// The body could not be decoded into what we expected
    Decoding,
    /// Credentials, keys or settings are missing or invalid
    Config,
    /// Sink file I/O
    Storage,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short label used as a prefix in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Http => "HTTP error",
            Self::Decoding => "decoding error",
            Self::Config => "configuration error",
            Self::Storage => "storage error",
            Self::Other => "error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Unified error type for the tripdesk crate
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP client errors (connect, timeout, body read)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status code
    #[error("{method} {url} -> HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// Body could not be decoded
    #[error("could not decode response: {0}")]
    Decode(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required setting (credential, API key) is not configured
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Invalid URL built from configuration or input
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV sink errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a status error
    pub fn status(method: &'static str, url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            method,
            url: url.into(),
            status,
        }
    }

    /// Create a missing-configuration error
    pub fn missing_config(what: impl Into<String>) -> Self {
        Self::MissingConfig(what.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other(context.into())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(e) if e.is_decode() => ErrorCategory::Decoding,
            Self::Transport(_) => ErrorCategory::Network,
            Self::Status { .. } => ErrorCategory::Http,
            Self::Decode(_) | Self::Json(_) => ErrorCategory::Decoding,
            Self::MissingConfig(_) | Self::Config(_) | Self::Url(_) => ErrorCategory::Config,
            Self::Io(_) | Self::Csv(_) => ErrorCategory::Storage,
            Self::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether the failure came from a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Status code for [`Error::Status`]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Inline message shown to the operator
    pub fn user_message(&self) -> String {
        if self.is_timeout() {
            return format!("{}: request timed out", self.category());
        }
        format!("{}: {self}", self.category())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let err = Error::status("GET", "https://example.com/children/1", 404);
        assert_eq!(err.category(), ErrorCategory::Http);

        let err = Error::Decode("bad body".into());
        assert_eq!(err.category(), ErrorCategory::Decoding);

        let err = Error::missing_config("SCRAPINGANT_KEY");
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_status_message() {
        let err = Error::status("POST", "https://example.com/jet-rel/12", 500);
        assert_eq!(err.to_string(), "POST https://example.com/jet-rel/12 -> HTTP 500");
        assert_eq!(err.status_code(), Some(500));
        assert!(err.user_message().starts_with("HTTP error: "));
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let unified: Error = json_err.into();
        assert!(matches!(unified, Error::Json(_)));
        assert_eq!(unified.category(), ErrorCategory::Decoding);
    }

    #[test]
    fn test_io_is_storage() {
        let err: Error = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.user_message(), "error: Something went wrong");
    }
}
