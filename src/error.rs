//! Error types for the discord-purge crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].
//!
//! Transient conditions (rate limits, dropped connections) are absorbed by the
//! transport and only surface as [`Error::NoResponse`] once its attempt budget
//! is spent.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the platform.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// The credential was empty or obviously malformed.
    #[error("invalid credential: {reason}")]
    InvalidCredential {
        /// Why the credential was rejected.
        reason: String,
    },

    /// A credential file could not be read.
    #[error("failed to read credential from {}", .path.display())]
    ReadCredential {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    BuildClient {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Usage errors (NOT retryable - detected before any request is sent)
    // ─────────────────────────────────────────────────────────────────────────
    /// Search query was incomplete or ambiguous.
    #[error("invalid search query: {message}")]
    InvalidQuery {
        /// Description of the problem.
        message: String,
    },

    /// An identifier was not a valid snowflake.
    #[error("invalid snowflake id: '{value}'")]
    InvalidSnowflake {
        /// The rejected input.
        value: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication errors (NOT retryable - fatal for the operation)
    // ─────────────────────────────────────────────────────────────────────────
    /// The platform rejected the credential (HTTP 401).
    #[error("unauthorized: the credential was rejected")]
    Unauthorized,

    // ─────────────────────────────────────────────────────────────────────────
    // Network errors (RETRYABLE - the transport already retried)
    // ─────────────────────────────────────────────────────────────────────────
    /// No usable response after the attempt budget was exhausted.
    #[error("no response for {method} {path} after {attempts} attempts")]
    NoResponse {
        /// HTTP method of the request.
        method: String,
        /// Request path relative to the API base.
        path: String,
        /// Number of attempts made.
        attempts: u32,
        /// The last network error, if the final attempt failed at the transport level.
        #[source]
        source: Option<reqwest::Error>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Protocol errors (NOT retryable - the server answered, just not usefully)
    // ─────────────────────────────────────────────────────────────────────────
    /// The endpoint answered with a status the caller cannot use.
    #[error("{endpoint} returned unexpected status {status}")]
    UnexpectedStatus {
        /// Endpoint description.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// A response body did not have the expected shape.
    #[error("failed to decode {endpoint} response")]
    Decode {
        /// Endpoint description.
        endpoint: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// The transport has already spent its own attempt budget by the time an
    /// error reaches the caller, so retrying means starting the operation over.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::NoResponse { .. } => true,

            Error::InvalidConfig { .. }
            | Error::InvalidCredential { .. }
            | Error::ReadCredential { .. }
            | Error::BuildClient { .. }
            | Error::InvalidQuery { .. }
            | Error::InvalidSnowflake { .. }
            | Error::Unauthorized
            | Error::UnexpectedStatus { .. }
            | Error::Decode { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. }
            | Error::InvalidCredential { .. }
            | Error::ReadCredential { .. }
            | Error::BuildClient { .. } => ErrorCategory::Configuration,

            Error::InvalidQuery { .. } | Error::InvalidSnowflake { .. } => ErrorCategory::Usage,

            Error::Unauthorized => ErrorCategory::Authentication,

            Error::NoResponse { .. } => ErrorCategory::Network,

            Error::UnexpectedStatus { .. } | Error::Decode { .. } => ErrorCategory::Protocol,
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or credential errors.
    Configuration,
    /// Invalid caller input, rejected before any request.
    Usage,
    /// The credential was rejected by the platform.
    Authentication,
    /// Network failures that outlasted the retry budget.
    Network,
    /// Unexpected status codes or response shapes.
    Protocol,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Usage => write!(f, "usage"),
            ErrorCategory::Authentication => write!(f, "authentication"),
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Protocol => write!(f, "protocol"),
        }
    }
}
