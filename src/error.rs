//! Error types for booru-rank-dl
//!
//! Errors fall into four classes:
//! - transient fetch failures ([`Error::Network`], [`Error::Timeout`], retryable
//!   [`Error::HttpStatus`], [`Error::Io`])
//! - unrecoverable fetch failures once retries are exhausted ([`Error::Fetch`])
//! - malformed upstream markup or headers ([`Error::Malformed`])
//! - fatal invocation problems ([`Error::InvalidArgument`], [`Error::Config`])
//!
//! Only the last class is allowed to terminate the process. Everything else is caught at the
//! scope of a single page or a single post and turned into a warning.

use thiserror::Error;

/// Result type alias for booru-rank-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for booru-rank-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// Invalid command line invocation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport-level failure reported by the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The requested URL
        url: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// No response headers or body data arrived within the request timeout
    #[error("{url} stalled for longer than {after:?}")]
    Timeout {
        /// The requested URL
        url: String,
        /// The timeout that elapsed
        after: std::time::Duration,
    },

    /// A fetch that did not succeed within its retry budget
    #[error("fetch of {url} failed: {source}")]
    Fetch {
        /// The requested URL
        url: String,
        /// The cause of the last failed attempt
        #[source]
        source: Box<Error>,
    },

    /// Expected markup or header missing or unparsable
    #[error("malformed content: {0}")]
    Malformed(#[from] MalformedContentError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL could not be parsed or resolved
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Upstream content that does not match the expected shape
#[derive(Debug, Error)]
pub enum MalformedContentError {
    /// Post-detail page has no primary image element (videos, flash, removed posts)
    #[error("no primary image element on {page_url}")]
    MissingImage {
        /// Detail page that was parsed
        page_url: String,
    },

    /// Primary image element exists but carries no usable source
    #[error("primary image on {page_url} has no src attribute")]
    MissingImageSource {
        /// Detail page that was parsed
        page_url: String,
    },

    /// Metadata probe returned no usable content type
    #[error("no content type for {url}")]
    MissingContentType {
        /// Image URL that was probed
        url: String,
    },

    /// Post link carries no numeric id
    #[error("no post id in {link}")]
    MissingPostId {
        /// Post link that was inspected
        link: String,
    },
}

impl Error {
    /// Wrap this error as the final cause of a failed fetch of `url`
    pub fn into_fetch(self, url: impl Into<String>) -> Self {
        match self {
            already @ Error::Fetch { .. } => already,
            other => Error::Fetch {
                url: url.into(),
                source: Box::new(other),
            },
        }
    }
}
