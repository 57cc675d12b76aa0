//! Authenticated request execution with rate-limit and failure handling.
//!
//! [`TransportClient`] is the only place that talks HTTP. It owns the retry
//! budget and reacts to exactly two conditions:
//!
//! - **429**: wait the server's `retry_after` (plus a small buffer) and retry
//!   the identical request.
//! - **401**: fail immediately with [`Error::Unauthorized`].
//!
//! Network failures are retried after a fixed delay. Every other status is
//! handed back verbatim; interpreting it is the caller's job.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|source| Error::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// Body of a 429 response.
#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: Option<f64>,
}

/// Executes authenticated requests against the platform API.
///
/// One instance per operation: the retry state of a request is sequential and
/// the client is not meant to be shared between concurrent scans or purges.
pub struct TransportClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl TransportClient {
    /// Builds a transport from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be used as a header value or the
    /// HTTP client cannot be constructed (for example, a bad proxy).
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(config.token()).map_err(|_| {
            Error::InvalidCredential {
                reason: "token contains characters not allowed in a header".into(),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeouts.connect)
            .timeout(config.timeouts.request);

        if let Some(proxy) = &config.proxy {
            debug!(proxy = %proxy, "Routing API traffic through proxy");
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let http = builder
            .build()
            .map_err(|source| Error::BuildClient { source })?;

        Ok(Self { http, config })
    }

    /// Returns the configuration this transport was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a request, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthorized`] on HTTP 401, without retrying.
    /// - [`Error::NoResponse`] once the attempt budget is spent on rate limits
    ///   or network failures.
    #[instrument(
        name = "TransportClient::send",
        skip_all,
        fields(method = %method, path = %path)
    )]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse> {
        let url = self.config.endpoint(path);
        let policy = &self.config.retry;
        let mut last_error = None;

        for attempt in 1..=policy.max_attempts {
            let has_next = attempt < policy.max_attempts;

            let mut request = self.http.request(method.clone(), &url);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(error) => {
                    warn!(
                        error = %error,
                        attempt,
                        max_attempts = policy.max_attempts,
                        "Request failed"
                    );
                    last_error = Some(error);
                    if has_next {
                        tokio::time::sleep(policy.network_retry_delay).await;
                    }
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                warn!("Credential rejected");
                return Err(Error::Unauthorized);
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let header_hint = retry_after_header(response.headers());
                let body = response.bytes().await.unwrap_or_default();
                let delay = policy.rate_limit_delay(retry_after_body(&body).or(header_hint));
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Rate limited"
                );
                last_error = None;
                if has_next {
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            match response.bytes().await {
                Ok(body) => {
                    debug!(status = status.as_u16(), attempt, "Response received");
                    return Ok(ApiResponse {
                        status,
                        body: body.to_vec(),
                    });
                }
                Err(error) => {
                    warn!(error = %error, attempt, "Failed to read response body");
                    last_error = Some(error);
                    if has_next {
                        tokio::time::sleep(policy.network_retry_delay).await;
                    }
                }
            }
        }

        warn!(attempts = policy.max_attempts, "Retry budget exhausted");

        Err(Error::NoResponse {
            method: method.to_string(),
            path: path.to_string(),
            attempts: policy.max_attempts,
            source: last_error,
        })
    }
}

impl std::fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("max_attempts", &self.config.retry.max_attempts)
            .finish_non_exhaustive()
    }
}

/// Reads `retry_after` (seconds, fractional) from a 429 body.
fn retry_after_body(body: &[u8]) -> Option<Duration> {
    let parsed: RateLimitBody = serde_json::from_slice(body).ok()?;
    parsed
        .retry_after
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

/// Reads the standard `Retry-After` header (whole seconds).
fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}
