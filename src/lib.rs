//! # discord-purge
//!
//! Async client for finding and deleting your own messages on Discord.
//!
//! This crate provides a high-level, async API for:
//! - Verifying a user token and resolving the account behind it
//! - Scanning a server or channel for that account's messages (optionally
//!   filtered by content and date range)
//! - Deleting the scanned messages one at a time, with throttling, a dry-run
//!   mode and a confirmation gate
//!
//! Every request goes through one transport that handles rate limits (429),
//! dropped connections and a revoked token (401) the same way everywhere.
//!
//! ## Features
//!
//! - **`cli`** (default): builds the `discord-purge` command-line binary.
//!
//! ## Quick Start
//!
//! ```no_run
//! use discord_purge::{ClientConfig, PurgeOptions, Session, Snowflake};
//! use discord_purge::observer::{NoopObserver, Preconfirmed};
//!
//! # async fn example() -> discord_purge::Result<()> {
//! // Configure the client
//! let config = ClientConfig::builder()
//!     .token("your-user-token")
//!     .build()?;
//!
//! // Verify the token
//! let session = Session::connect(config).await?;
//!
//! // Find everything you said in one channel
//! let query = session
//!     .query()
//!     .channel(Snowflake::parse("900000000000000000")?)
//!     .build()?;
//! let scan = session.scan(&query, &mut NoopObserver).await?;
//!
//! // Preview first
//! let options = PurgeOptions { dry_run: true, ..PurgeOptions::default() };
//! let preview = session
//!     .purge(&scan.messages, options, &Preconfirmed, &mut NoopObserver)
//!     .await;
//! for item in &preview.preview {
//!     println!("{}: {}", item.id, item.excerpt);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Using a SOCKS5 Proxy
//!
//! ```no_run
//! use discord_purge::{ClientConfig, Session, Socks5Proxy};
//!
//! # async fn example() -> discord_purge::Result<()> {
//! let config = ClientConfig::builder()
//!     .token("your-user-token")
//!     .proxy(Socks5Proxy::with_auth("proxy.example.com", 1080, "user", "pass"))
//!     .build()?;
//!
//! let session = Session::connect(config).await?;
//! // ... use session ...
//! # Ok(())
//! # }
//! ```
//!
//! ## Progress and Cancellation
//!
//! Observers are plain closures, and a [`CancellationToken`] stops a scan or
//! purge at the next page or item:
//!
//! ```no_run
//! use discord_purge::{CancellationToken, ClientConfig, PurgeOptions, Session};
//! use discord_purge::observer::PurgeProgress;
//!
//! # async fn example(messages: Vec<discord_purge::MessageReference>) -> discord_purge::Result<()> {
//! let stop = CancellationToken::new();
//! let session = Session::connect(ClientConfig::builder().token("t").build()?)
//!     .await?
//!     .with_stop_signal(stop.clone());
//!
//! let confirm = |count: usize| count < 1_000;
//! let mut report = |p: PurgeProgress| println!("{}/{}", p.processed(), p.total);
//!
//! let summary = session
//!     .purge(&messages, PurgeOptions::default(), &confirm, &mut report)
//!     .await;
//! println!("{:?}", summary.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use [`Error::is_retryable`]
//! to determine if an operation can be retried:
//!
//! ```
//! use discord_purge::Error;
//!
//! fn handle_error(error: &Error) {
//!     if error.is_retryable() {
//!         println!("Transient error, can retry: {}", error);
//!     } else {
//!         println!("Permanent error: {}", error);
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation. All major operations emit spans with
//! structured fields suitable for distributed tracing.
//!
//! ### Span Naming Convention
//!
//! - `Session::connect` - Token verification
//! - `SearchAggregator::scan` - Paginated search
//! - `PurgeExecutor::purge` - Deletion run
//! - `TransportClient::send` - Single request including retries
//!
//! ### Standard Fields
//!
//! - `method`, `path` - Request line
//! - `scope` - `guild:<id>` or `channel:<id>`
//! - `author_id` - Account whose messages are searched
//! - `message_id` - Message being deleted
//! - `attempt` - Retry attempt number
//!
//! The token is never logged.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod observer;
pub mod proxy;
pub mod purge;
pub mod search;
pub mod snowflake;
pub mod transport;

// Internal modules
mod client;

// Re-exports for ergonomic API
pub use client::Session;
pub use config::{ClientConfig, ClientConfigBuilder, PacingConfig, RetryPolicy, TimeoutConfig};
pub use error::{Error, ErrorCategory, Result};
pub use models::{Identity, MessageReference};
pub use proxy::{ProxyAuth, Socks5Proxy};
pub use purge::{
    DeletionOutcome, DeletionReason, DeletionSummary, PurgeExecutor, PurgeOptions, PurgeStatus,
};
pub use search::{ScanEnd, ScanResult, Scope, SearchAggregator, SearchQuery, SearchQueryBuilder};
pub use snowflake::Snowflake;
pub use tokio_util::sync::CancellationToken;
pub use transport::{ApiResponse, TransportClient};
