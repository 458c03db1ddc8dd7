// src/error.rs

//! Unified error handling for the feed service.

use std::fmt;

use thiserror::Error;

/// Result type alias for feed service operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Outcome of a single page fetch: raw markup or a `Network` failure.
pub type FetchResult = Result<String>;

/// What went wrong while talking to the source site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// The request exceeded the configured timeout
    Timeout,
    /// The connection could not be established
    Connect,
    /// The server answered with a non-2xx status
    Status(u16),
    /// The response body could not be read
    Body,
    /// Anything else reported by the HTTP client
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("timeout"),
            Self::Connect => f.write_str("connection failed"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Body => f.write_str("unreadable body"),
            Self::Other => f.write_str("request failed"),
        }
    }
}

/// Extraction failures that make a fetched page unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No candidate block produced a valid item
    #[error("no items found ({candidates} candidate blocks inspected)")]
    NoItemsFound { candidates: usize },
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetching the source page failed
    #[error("Network error for {url}: {kind}: {message}")]
    Network {
        url: String,
        kind: NetworkErrorKind,
        message: String,
    },

    /// The fetched markup did not yield any item
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    /// Feed serialization failed
    #[error("Render error: {0}")]
    Render(String),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Create a network error for `url`.
    pub fn network(url: impl Into<String>, kind: NetworkErrorKind, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            kind,
            message: message.to_string(),
        }
    }

    /// Classify a `reqwest` failure into a network error.
    pub fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            NetworkErrorKind::Timeout
        } else if error.is_connect() {
            NetworkErrorKind::Connect
        } else if let Some(status) = error.status() {
            NetworkErrorKind::Status(status.as_u16())
        } else if error.is_body() || error.is_decode() {
            NetworkErrorKind::Body
        } else {
            NetworkErrorKind::Other
        };
        Self::network(url, kind, error)
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a render error.
    pub fn render(message: impl fmt::Display) -> Self {
        Self::Render(message.to_string())
    }

    /// Network failure kind, if this is a network error.
    pub fn network_kind(&self) -> Option<NetworkErrorKind> {
        match self {
            Self::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_display_includes_url_and_status() {
        let err = AppError::network("https://example.com", NetworkErrorKind::Status(503), "bad gateway");
        let text = err.to_string();
        assert!(text.contains("https://example.com"));
        assert!(text.contains("HTTP status 503"));
        assert_eq!(err.network_kind(), Some(NetworkErrorKind::Status(503)));
    }

    #[test]
    fn test_extract_error_converts() {
        let err: AppError = ExtractError::NoItemsFound { candidates: 3 }.into();
        assert!(matches!(err, AppError::Extract(ExtractError::NoItemsFound { candidates: 3 })));
        assert!(err.network_kind().is_none());
    }
}
