//! Authenticated session: identity lookup plus scan and purge.
//!
//! The [`Session`] is the main entry point for this crate. It provides
//! async methods to:
//!
//! - Resolve the account behind the token
//! - Scan a server or channel for that account's messages
//! - Purge a list of scanned messages
//!
//! # Example
//!
//! ```no_run
//! use discord_purge::{ClientConfig, PurgeOptions, Session, Snowflake};
//! use discord_purge::observer::{NoopObserver, Preconfirmed};
//!
//! # async fn example() -> discord_purge::Result<()> {
//! let config = ClientConfig::builder().token("token").build()?;
//! let session = Session::connect(config).await?;
//! println!("Signed in as {}", session.identity().display_name);
//!
//! let query = session
//!     .query()
//!     .channel(Snowflake::parse("900000000000000000")?)
//!     .build()?;
//! let scan = session.scan(&query, &mut NoopObserver).await?;
//!
//! let summary = session
//!     .purge(&scan.messages, PurgeOptions::default(), &Preconfirmed, &mut NoopObserver)
//!     .await;
//! println!("deleted {} of {}", summary.deleted, summary.total);
//! # Ok(())
//! # }
//! ```

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{Identity, MessageReference, UserPayload};
use crate::observer::{Confirm, PurgeObserver, ScanObserver};
use crate::purge::{DeletionSummary, PurgeExecutor, PurgeOptions};
use crate::search::{ScanResult, SearchAggregator, SearchQuery, SearchQueryBuilder};
use crate::transport::TransportClient;
use reqwest::{Method, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// An authenticated account session.
///
/// Create using [`Session::connect`].
///
/// # Lifecycle
///
/// 1. Connect with [`connect`](Self::connect), which verifies the token
/// 2. Build a query with [`query`](Self::query) and run [`scan`](Self::scan)
/// 3. Review the results, then hand them to [`purge`](Self::purge)
///
/// Scans and purges share one stop signal, see
/// [`with_stop_signal`](Self::with_stop_signal).
pub struct Session {
    transport: TransportClient,
    identity: Identity,
    stop: CancellationToken,
}

impl Session {
    /// Builds the transport and resolves the account behind the token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP client cannot be built
    /// - The token is rejected ([`Error::Unauthorized`])
    /// - The identity endpoint answers with anything but 200
    /// - The platform cannot be reached
    #[instrument(
        name = "Session::connect",
        skip_all,
        fields(
            base_url = %config.base_url,
            proxy_enabled = config.proxy.is_some()
        )
    )]
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let transport = TransportClient::new(config)?;
        let identity = Self::fetch_identity(&transport).await?;

        debug!(
            account_id = %identity.account_id,
            display_name = %identity.display_name,
            "Session ready"
        );

        Ok(Self {
            transport,
            identity,
            stop: CancellationToken::new(),
        })
    }

    /// Uses `stop` to cancel scans and purges at their next boundary.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    /// Returns a handle to this session's stop signal.
    #[must_use]
    pub fn stop_signal(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Returns the account behind the token.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    /// Starts a query whose author is this account.
    ///
    /// Call [`author`](SearchQueryBuilder::author) to search for someone else.
    #[must_use]
    pub fn query(&self) -> SearchQueryBuilder {
        SearchQuery::builder().author(self.identity.account_id)
    }

    /// Scans for messages matching `query`.
    ///
    /// See [`SearchAggregator::scan`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] or [`Error::Decode`]; other failures
    /// end the scan early and are reported in [`ScanResult::end`].
    pub async fn scan(
        &self,
        query: &SearchQuery,
        observer: &mut dyn ScanObserver,
    ) -> Result<ScanResult> {
        SearchAggregator::new(&self.transport)
            .with_stop_signal(self.stop.clone())
            .scan(query, observer)
            .await
    }

    /// Deletes `messages`.
    ///
    /// See [`PurgeExecutor::purge`].
    pub async fn purge(
        &self,
        messages: &[MessageReference],
        options: PurgeOptions,
        confirm: &dyn Confirm,
        observer: &mut dyn PurgeObserver,
    ) -> DeletionSummary {
        PurgeExecutor::new(&self.transport)
            .with_stop_signal(self.stop.clone())
            .purge(messages, options, confirm, observer)
            .await
    }

    async fn fetch_identity(transport: &TransportClient) -> Result<Identity> {
        let response = transport.send(Method::GET, "/users/@me", &[], None).await?;

        if response.status() != StatusCode::OK {
            return Err(Error::UnexpectedStatus {
                endpoint: "identity".into(),
                status: response.status().as_u16(),
            });
        }

        let user: UserPayload = response.json("identity")?;
        Ok(user.into())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("base_url", &self.transport.config().base_url.as_str())
            .field("cancelled", &self.stop.is_cancelled())
            .finish_non_exhaustive()
    }
}
