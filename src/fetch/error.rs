//! Error types for the fetch module.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching and writing one table artifact.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The endpoint that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The endpoint that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The API responded with a body that is not the expected row-of-rows
    /// JSON table.
    #[error("malformed API response from {url}: {detail}")]
    MalformedResponse {
        /// The endpoint that produced the body.
        url: String,
        /// What was wrong with it.
        detail: String,
    },

    /// File system error while writing an artifact.
    #[error("IO error writing {path}: {source}")]
    Io {
        /// The artifact path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The computed endpoint URL is invalid.
    #[error("invalid endpoint URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>` impls: every variant
// needs context (url, path) the source errors don't carry, so callers go
// through the constructors above.
