//! Throttled, sequential message deletion.
//!
//! [`PurgeExecutor`] deletes exactly the references it is given, one request
//! at a time, with a randomized pause after each item. Deletions cannot be
//! undone, so a failed item never stops the batch and a successful one is
//! never revisited. The returned [`DeletionSummary`] is the record of what
//! actually happened.

use crate::config::PacingConfig;
use crate::error::Error;
use crate::models::MessageReference;
use crate::observer::{Confirm, PurgeObserver, PurgeProgress};
use crate::snowflake::Snowflake;
use crate::transport::TransportClient;
use rand::Rng;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Number of messages shown in a dry-run preview.
pub const PREVIEW_LIMIT: usize = 5;

/// Characters of content kept in a preview excerpt.
pub const PREVIEW_EXCERPT_CHARS: usize = 50;

/// How a purge should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeOptions {
    /// Preview only; send no delete requests.
    pub dry_run: bool,
    /// Ask the [`Confirm`] hook before the first delete request.
    pub require_confirmation: bool,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            require_confirmation: true,
        }
    }
}

/// Why an item ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum DeletionReason {
    /// 204: the message was deleted.
    Deleted,
    /// 404: the message was already gone.
    AlreadyAbsent,
    /// 403: not allowed (system messages, lost permissions).
    Forbidden,
    /// The transport gave up without a response.
    NoResponse,
    /// Any other status.
    Status(u16),
}

impl DeletionReason {
    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NO_CONTENT => DeletionReason::Deleted,
            StatusCode::NOT_FOUND => DeletionReason::AlreadyAbsent,
            StatusCode::FORBIDDEN => DeletionReason::Forbidden,
            other => DeletionReason::Status(other.as_u16()),
        }
    }

    /// Returns `true` if the message is gone afterwards.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, DeletionReason::Deleted | DeletionReason::AlreadyAbsent)
    }
}

/// Final result for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    /// The message.
    pub message_id: Snowflake,
    /// Its channel.
    pub channel_id: Snowflake,
    /// Whether the message is gone.
    pub succeeded: bool,
    /// What the server said.
    pub reason: DeletionReason,
}

/// How a purge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgeStatus {
    /// Every item was processed (or there were none).
    Completed,
    /// Dry run; nothing was sent.
    DryRun,
    /// The confirmation hook said no; nothing was sent.
    Declined,
    /// The stop signal fired between items.
    Cancelled,
    /// The credential was rejected mid-purge; remaining items were skipped.
    Unauthorized,
}

/// One line of a dry-run preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewItem {
    /// The message.
    pub id: Snowflake,
    /// Its channel.
    pub channel_id: Snowflake,
    /// Content, truncated.
    pub excerpt: String,
}

/// What a purge did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionSummary {
    /// Messages confirmed gone (deleted or already absent).
    pub deleted: usize,
    /// Messages that could not be deleted.
    pub failed: usize,
    /// Size of the input.
    pub total: usize,
    /// How the purge ended.
    pub status: PurgeStatus,
    /// Per-item outcomes in processing order.
    pub outcomes: Vec<DeletionOutcome>,
    /// Dry-run preview; empty otherwise.
    pub preview: Vec<PreviewItem>,
}

impl DeletionSummary {
    fn untouched(total: usize, status: PurgeStatus) -> Self {
        Self {
            deleted: 0,
            failed: 0,
            total,
            status,
            outcomes: Vec::new(),
            preview: Vec::new(),
        }
    }

    /// Current counts as a progress snapshot.
    #[must_use]
    pub fn progress(&self) -> PurgeProgress {
        PurgeProgress {
            deleted: self.deleted,
            failed: self.failed,
            total: self.total,
        }
    }
}

/// Deletes messages one at a time.
#[derive(Debug)]
pub struct PurgeExecutor<'a> {
    transport: &'a TransportClient,
    stop: CancellationToken,
}

impl<'a> PurgeExecutor<'a> {
    /// Creates an executor over `transport`.
    #[must_use]
    pub fn new(transport: &'a TransportClient) -> Self {
        Self {
            transport,
            stop: CancellationToken::new(),
        }
    }

    /// Stops the purge at the next item boundary once `stop` is cancelled.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: CancellationToken) -> Self {
        self.stop = stop;
        self
    }

    /// Builds the dry-run preview: the first few messages with short excerpts.
    #[must_use]
    pub fn preview(messages: &[MessageReference]) -> Vec<PreviewItem> {
        messages
            .iter()
            .take(PREVIEW_LIMIT)
            .map(|message| PreviewItem {
                id: message.id,
                channel_id: message.channel_id,
                excerpt: excerpt(&message.content),
            })
            .collect()
    }

    /// Deletes `messages` in order.
    ///
    /// `observer` hears about every processed item. `confirm` is consulted
    /// only when `options.require_confirmation` is set, the input is not
    /// empty, and this is not a dry run.
    #[instrument(
        name = "PurgeExecutor::purge",
        skip_all,
        fields(total = messages.len(), dry_run = options.dry_run)
    )]
    pub async fn purge(
        &self,
        messages: &[MessageReference],
        options: PurgeOptions,
        confirm: &dyn Confirm,
        observer: &mut dyn PurgeObserver,
    ) -> DeletionSummary {
        let total = messages.len();

        if messages.is_empty() {
            info!("Nothing to delete");
            return DeletionSummary::untouched(0, PurgeStatus::Completed);
        }

        if options.dry_run {
            let preview = Self::preview(messages);
            for item in &preview {
                info!(
                    message_id = %item.id,
                    channel_id = %item.channel_id,
                    excerpt = %item.excerpt,
                    "Dry run: would delete"
                );
            }
            let mut summary = DeletionSummary::untouched(total, PurgeStatus::DryRun);
            summary.preview = preview;
            return summary;
        }

        if options.require_confirmation && !confirm.decide(total) {
            warn!("Purge declined");
            return DeletionSummary::untouched(total, PurgeStatus::Declined);
        }

        let pacing = &self.transport.config().pacing;
        let mut summary = DeletionSummary::untouched(total, PurgeStatus::Completed);

        info!("Starting purge");

        for (index, message) in messages.iter().enumerate() {
            if self.stop.is_cancelled() {
                summary.status = PurgeStatus::Cancelled;
                break;
            }

            let Some(reason) = self.delete_one(message).await else {
                summary.status = PurgeStatus::Unauthorized;
                break;
            };

            if reason.is_success() {
                summary.deleted += 1;
            } else {
                summary.failed += 1;
            }
            summary.outcomes.push(DeletionOutcome {
                message_id: message.id,
                channel_id: message.channel_id,
                succeeded: reason.is_success(),
                reason,
            });
            observer.on_progress(summary.progress());

            if index + 1 < total {
                tokio::select! {
                    () = self.stop.cancelled() => {
                        summary.status = PurgeStatus::Cancelled;
                        break;
                    }
                    () = tokio::time::sleep(deletion_delay(pacing)) => {}
                }
            }
        }

        info!(
            deleted = summary.deleted,
            failed = summary.failed,
            total,
            status = ?summary.status,
            "Purge finished"
        );

        summary
    }

    /// Sends one delete. `None` means the credential was rejected.
    async fn delete_one(&self, message: &MessageReference) -> Option<DeletionReason> {
        let path = format!("/channels/{}/messages/{}", message.channel_id, message.id);

        let reason = match self.transport.send(Method::DELETE, &path, &[], None).await {
            Ok(response) => DeletionReason::from_status(response.status()),
            Err(Error::Unauthorized) => return None,
            Err(error) => {
                warn!(message_id = %message.id, error = %error, "Delete got no response");
                DeletionReason::NoResponse
            }
        };

        match reason {
            DeletionReason::Deleted => debug!(message_id = %message.id, "Deleted"),
            DeletionReason::AlreadyAbsent => {
                warn!(message_id = %message.id, "Message not found, treating as deleted");
            }
            DeletionReason::Forbidden => warn!(message_id = %message.id, "Delete forbidden"),
            DeletionReason::Status(status) => {
                warn!(message_id = %message.id, status, "Unexpected delete status");
            }
            DeletionReason::NoResponse => {}
        }

        Some(reason)
    }
}

/// Base delay plus uniform jitter.
fn deletion_delay(pacing: &PacingConfig) -> Duration {
    let jitter = if pacing.delete_jitter.is_empty() {
        pacing.delete_jitter.start
    } else {
        rand::thread_rng().gen_range(pacing.delete_jitter.clone())
    };
    pacing.delete_base_delay + jitter
}

fn excerpt(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
