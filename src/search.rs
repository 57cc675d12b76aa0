//! Paginated message search.
//!
//! [`SearchAggregator`] walks the search endpoint 25 results at a time and
//! rebuilds a flat, author-filtered list of [`MessageReference`]s from the
//! nested conversation groups the endpoint returns.
//!
//! # Example
//!
//! ```no_run
//! use discord_purge::{
//!     ClientConfig, MessageReference, SearchAggregator, SearchQuery, Snowflake, TransportClient,
//! };
//!
//! # async fn example() -> discord_purge::Result<()> {
//! let transport = TransportClient::new(ClientConfig::builder().token("token").build()?)?;
//!
//! let query = SearchQuery::builder()
//!     .channel(Snowflake::parse("900000000000000000")?)
//!     .author(Snowflake::parse("80351110224678912")?)
//!     .content("oops")
//!     .build()?;
//!
//! let mut found = 0;
//! let result = SearchAggregator::new(&transport)
//!     .scan(&query, &mut |batch: &[MessageReference]| found += batch.len())
//!     .await?;
//! println!("{} messages, stopped because {:?}", result.messages.len(), result.end);
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::models::{MessageReference, RawMessage, SearchPage};
use crate::observer::ScanObserver;
use crate::snowflake::Snowflake;
use crate::transport::TransportClient;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Results per search page. The endpoint's page size is fixed.
pub const PAGE_SIZE: u64 = 25;

/// Where to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Scope {
    /// A whole server.
    Guild(Snowflake),
    /// A single channel, including direct-message channels.
    Channel(Snowflake),
}

impl Scope {
    fn search_path(self) -> String {
        match self {
            Scope::Guild(id) => format!("/guilds/{id}/messages/search"),
            Scope::Channel(id) => format!("/channels/{id}/messages/search"),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Guild(id) => write!(f, "guild:{id}"),
            Scope::Channel(id) => write!(f, "channel:{id}"),
        }
    }
}

/// A validated search.
///
/// Create using [`SearchQuery::builder()`]. The page offset is not part of the
/// query; the aggregator owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    scope: Scope,
    author_id: Snowflake,
    content: Option<String>,
    min_id: Option<Snowflake>,
    max_id: Option<Snowflake>,
}

impl SearchQuery {
    /// Creates a new query builder.
    #[must_use]
    pub fn builder() -> SearchQueryBuilder {
        SearchQueryBuilder::default()
    }

    /// Returns the search scope.
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns the author every result must match.
    #[must_use]
    pub fn author_id(&self) -> Snowflake {
        self.author_id
    }

    /// Returns the content substring filter, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    fn params(&self, offset: u64) -> Vec<(&'static str, String)> {
        let mut params = vec![("author_id", self.author_id.to_string())];
        if let Some(content) = &self.content {
            params.push(("content", content.clone()));
        }
        if let Some(min_id) = self.min_id {
            params.push(("min_id", min_id.to_string()));
        }
        if let Some(max_id) = self.max_id {
            params.push(("max_id", max_id.to_string()));
        }
        params.push(("offset", offset.to_string()));
        params
    }
}

/// Builder for [`SearchQuery`].
#[derive(Debug, Default, Clone)]
pub struct SearchQueryBuilder {
    guild_id: Option<Snowflake>,
    channel_id: Option<Snowflake>,
    author_id: Option<Snowflake>,
    content: Option<String>,
    min_id: Option<Snowflake>,
    max_id: Option<Snowflake>,
}

impl SearchQueryBuilder {
    /// Searches a whole server.
    #[must_use]
    pub fn guild(mut self, id: Snowflake) -> Self {
        self.guild_id = Some(id);
        self
    }

    /// Searches a single channel (use this for direct messages).
    #[must_use]
    pub fn channel(mut self, id: Snowflake) -> Self {
        self.channel_id = Some(id);
        self
    }

    /// Sets the author every result must match (required).
    #[must_use]
    pub fn author(mut self, id: Snowflake) -> Self {
        self.author_id = Some(id);
        self
    }

    /// Only match messages containing this text. Blank input is ignored.
    #[must_use]
    pub fn content(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.content = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Only match messages with an id above this one.
    #[must_use]
    pub fn min_id(mut self, id: Snowflake) -> Self {
        self.min_id = Some(id);
        self
    }

    /// Only match messages with an id below this one.
    #[must_use]
    pub fn max_id(mut self, id: Snowflake) -> Self {
        self.max_id = Some(id);
        self
    }

    /// Only match messages sent at or after `time`.
    #[must_use]
    pub fn after(self, time: DateTime<Utc>) -> Self {
        // min_id is exclusive
        let floor = Snowflake::from_datetime(time).get().saturating_sub(1);
        self.min_id(Snowflake::new(floor))
    }

    /// Only match messages sent before `time`.
    #[must_use]
    pub fn before(self, time: DateTime<Utc>) -> Self {
        self.max_id(Snowflake::from_datetime(time))
    }

    /// Builds the query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] unless exactly one of guild and channel
    /// is set and an author is given, or if the id bounds are inverted.
    pub fn build(self) -> Result<SearchQuery> {
        let scope = match (self.guild_id, self.channel_id) {
            (Some(guild), None) => Scope::Guild(guild),
            (None, Some(channel)) => Scope::Channel(channel),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidQuery {
                    message: "set either a guild or a channel, not both".into(),
                })
            }
            (None, None) => {
                return Err(Error::InvalidQuery {
                    message: "a guild or channel is required".into(),
                })
            }
        };

        let author_id = self.author_id.ok_or_else(|| Error::InvalidQuery {
            message: "an author is required".into(),
        })?;

        if let (Some(min), Some(max)) = (self.min_id, self.max_id) {
            if min >= max {
                return Err(Error::InvalidQuery {
                    message: format!("lower bound {min} is not below upper bound {max}"),
                });
            }
        }

        Ok(SearchQuery {
            scope,
            author_id,
            content: self.content,
            min_id: self.min_id,
            max_id: self.max_id,
        })
    }
}

/// Why a scan stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ScanEnd {
    /// A page came back with no messages.
    Exhausted,
    /// The offset passed the total reported by the first page.
    ReachedTotal,
    /// A page could not be fetched; results so far are kept.
    Failed {
        /// HTTP status, if the server answered.
        status: Option<u16>,
        /// Human-readable cause.
        detail: String,
    },
    /// The stop signal fired.
    Cancelled,
}

impl ScanEnd {
    /// Returns `true` if the scan ran to its natural end.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, ScanEnd::Exhausted | ScanEnd::ReachedTotal)
    }
}

/// The outcome of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Accepted messages in response order, unique by id.
    pub messages: Vec<MessageReference>,
    /// Total reported by the first page with data. Not refreshed afterwards.
    pub total_expected: Option<u64>,
    /// Number of pages fetched successfully.
    pub pages: u32,
    /// Why the scan stopped.
    pub end: ScanEnd,
}

/// Paginates the search endpoint.
#[derive(Debug)]
pub struct SearchAggregator<'a> {
    transport: &'a TransportClient,
    stop: CancellationToken,
}

impl<'a> SearchAggregator<'a> {
    /// Creates an aggregator over `transport`.
    #[must_use]
    pub fn new(transport: &'a TransportClient) -> Self {
        Self {
            transport,
            stop: CancellationToken::new(),
        }
    }

    /// Stops the scan at the next page boundary once `stop` is cancelled.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    /// Runs the scan, reporting each page's accepted messages to `observer`.
    ///
    /// Transport failures and unexpected statuses end the scan early with
    /// [`ScanEnd::Failed`] and whatever was collected so far.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthorized`] if the credential is rejected.
    /// - [`Error::Decode`] if a page does not have the expected shape.
    #[instrument(
        name = "SearchAggregator::scan",
        skip_all,
        fields(scope = %query.scope, author_id = %query.author_id)
    )]
    pub async fn scan(
        &self,
        query: &SearchQuery,
        observer: &mut dyn ScanObserver,
    ) -> Result<ScanResult> {
        let path = query.scope.search_path();
        let page_delay = self.transport.config().pacing.page_delay;

        let mut messages = Vec::new();
        let mut seen = HashSet::new();
        let mut total_expected = None;
        let mut pages = 0;
        let mut offset = 0;

        let end = loop {
            if self.stop.is_cancelled() {
                break ScanEnd::Cancelled;
            }

            let response = match self
                .transport
                .send(Method::GET, &path, &query.params(offset), None)
                .await
            {
                Ok(response) => response,
                Err(Error::Unauthorized) => return Err(Error::Unauthorized),
                Err(error) => {
                    warn!(offset, error = %error, "Search page failed, ending scan");
                    break ScanEnd::Failed {
                        status: None,
                        detail: error.to_string(),
                    };
                }
            };

            if response.status() != StatusCode::OK {
                warn!(
                    offset,
                    status = response.status().as_u16(),
                    "Unexpected search status, ending scan"
                );
                break ScanEnd::Failed {
                    status: Some(response.status().as_u16()),
                    detail: format!("search returned {}", response.status()),
                };
            }

            let page: SearchPage = response.json("search")?;
            pages += 1;

            let raw_count: usize = page.messages.iter().map(Vec::len).sum();
            if raw_count == 0 {
                debug!(offset, "Empty page");
                break ScanEnd::Exhausted;
            }

            let total = *total_expected.get_or_insert(page.total_results);
            let batch = accept_page(page.messages, query.author_id, &mut seen);

            debug!(
                offset,
                raw = raw_count,
                accepted = batch.len(),
                total,
                "Search page processed"
            );

            if !batch.is_empty() {
                observer.on_batch(&batch);
                messages.extend(batch);
            }

            offset += PAGE_SIZE;
            if offset >= total {
                break ScanEnd::ReachedTotal;
            }

            tokio::select! {
                () = self.stop.cancelled() => break ScanEnd::Cancelled,
                () = tokio::time::sleep(page_delay) => {}
            }
        };

        info!(
            found = messages.len(),
            pages,
            end = ?end,
            "Scan finished"
        );

        Ok(ScanResult {
            messages,
            total_expected,
            pages,
            end,
        })
    }
}

/// Flattens conversation groups in response order, keeping only messages by
/// `author` that have not been seen earlier in the scan.
fn accept_page(
    groups: Vec<Vec<RawMessage>>,
    author: Snowflake,
    seen: &mut HashSet<Snowflake>,
) -> Vec<MessageReference> {
    groups
        .into_iter()
        .flatten()
        .filter(|message| message.author.id == author)
        .filter(|message| seen.insert(message.id))
        .map(RawMessage::into_reference)
        .collect()
}
