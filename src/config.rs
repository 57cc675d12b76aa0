//! Configuration for the API client.
//!
//! Use [`ClientConfigBuilder`] to create a configuration with sensible defaults:
//!
//! ```
//! use discord_purge::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .token("my-account-token-goes-here")
//!     .build()
//!     .expect("valid config");
//! ```
//!
//! The defaults mirror what the platform tolerates from a regular client: three
//! attempts per request, 1.5s between search pages and roughly 1.3s–2s between
//! deletions.

use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use std::ops::Range;
use std::time::Duration;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://discord.com/api/v9";

/// Default browser-like user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Configuration for talking to the platform API.
///
/// Create using [`ClientConfig::builder()`].
///
/// The token is stored as a [`SecretString`] so it never shows up in `Debug`
/// output or logs.
#[derive(Clone)]
pub struct ClientConfig {
    token: SecretString,
    /// API root, without a trailing slash.
    pub base_url: Url,
    /// User agent header value.
    pub user_agent: String,
    /// Optional SOCKS5 proxy for all requests.
    pub proxy: Option<Socks5Proxy>,
    /// Retry behaviour of the transport.
    pub retry: RetryPolicy,
    /// Proactive pacing between pages and deletions.
    pub pacing: PacingConfig,
    /// HTTP timeouts.
    pub timeouts: TimeoutConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("proxy", &self.proxy)
            .field("retry", &self.retry)
            .field("pacing", &self.pacing)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the raw token.
    ///
    /// Only the transport should need this, to build the authorization header.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Joins an API path (e.g. `/users/@me`) onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Retry behaviour for a single request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Fixed delay after a network-level failure.
    pub network_retry_delay: Duration,
    /// Added on top of the server's `retry_after` on HTTP 429.
    pub rate_limit_buffer: Duration,
    /// Used when a 429 response carries no `retry_after`.
    pub default_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            network_retry_delay: Duration::from_secs(2),
            rate_limit_buffer: Duration::from_millis(500),
            default_retry_after: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying a rate-limited request.
    #[must_use]
    pub fn rate_limit_delay(&self, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or(self.default_retry_after) + self.rate_limit_buffer
    }
}

/// Proactive pacing, independent of the transport's reactive throttling.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    /// Delay between consecutive search pages.
    pub page_delay: Duration,
    /// Fixed part of the delay after each deletion.
    pub delete_base_delay: Duration,
    /// Random extra delay after each deletion, drawn uniformly from this range.
    pub delete_jitter: Range<Duration>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_millis(1500),
            delete_base_delay: Duration::from_millis(1200),
            delete_jitter: Duration::from_millis(100)..Duration::from_millis(800),
        }
    }
}

impl PacingConfig {
    /// Pacing with every delay set to zero. Intended for tests and mock servers.
    #[must_use]
    pub fn none() -> Self {
        Self {
            page_delay: Duration::ZERO,
            delete_base_delay: Duration::ZERO,
            delete_jitter: Duration::ZERO..Duration::ZERO,
        }
    }
}

/// HTTP timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for establishing a connection.
    pub connect: Duration,
    /// Timeout for a whole request, including reading the body.
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    token: Option<SecretString>,
    base_url: Option<String>,
    user_agent: Option<String>,
    proxy: Option<Socks5Proxy>,
    retry: Option<RetryPolicy>,
    pacing: Option<PacingConfig>,
    timeouts: Option<TimeoutConfig>,
}

impl ClientConfigBuilder {
    /// Sets the account token (required).
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Sets the account token from an already-protected secret.
    #[must_use]
    pub fn secret_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Overrides the API root. Mostly useful for tests against a mock server.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Routes all requests through a SOCKS5 proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: Socks5Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the number of attempts per request.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry
            .get_or_insert_with(RetryPolicy::default)
            .max_attempts = attempts;
        self
    }

    /// Sets the delay after a network-level failure.
    #[must_use]
    pub fn network_retry_delay(mut self, delay: Duration) -> Self {
        self.retry
            .get_or_insert_with(RetryPolicy::default)
            .network_retry_delay = delay;
        self
    }

    /// Sets the pacing configuration.
    #[must_use]
    pub fn pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = Some(pacing);
        self
    }

    /// Sets the delay between search pages.
    #[must_use]
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.pacing
            .get_or_insert_with(PacingConfig::default)
            .page_delay = delay;
        self
    }

    /// Sets the timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the whole-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .request = timeout;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or blank, the base URL does not
    /// parse, or the retry/pacing values are unusable.
    pub fn build(self) -> Result<ClientConfig> {
        let token = self.token.ok_or_else(|| Error::InvalidCredential {
            reason: "token is required".into(),
        })?;
        if token.expose_secret().trim().is_empty() {
            return Err(Error::InvalidCredential {
                reason: "token is empty".into(),
            });
        }

        let raw_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|e| Error::InvalidConfig {
            message: format!("invalid base URL '{raw_url}': {e}"),
        })?;

        let retry = self.retry.unwrap_or_default();
        if retry.max_attempts == 0 {
            return Err(Error::InvalidConfig {
                message: "max_attempts must be at least 1".into(),
            });
        }

        let pacing = self.pacing.unwrap_or_default();
        if pacing.delete_jitter.start > pacing.delete_jitter.end {
            return Err(Error::InvalidConfig {
                message: "delete jitter range is inverted".into(),
            });
        }

        Ok(ClientConfig {
            token,
            base_url,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            proxy: self.proxy,
            retry,
            pacing,
            timeouts: self.timeouts.unwrap_or_default(),
        })
    }
}
