//! Progress reporting and confirmation hooks.
//!
//! Scans and purges run as one linear future, often on a background task. The
//! host learns about progress only through the traits in this module:
//!
//! - [`ScanObserver`] receives each page's newly accepted messages.
//! - [`PurgeObserver`] receives running counts after every processed item.
//! - [`Confirm`] decides whether a purge may start.
//!
//! Closures implement all three. When the host owns state on another task
//! (a UI event loop, say), use [`ChannelObserver`] and consume the events on
//! the owning side instead of touching that state from the worker.
//!
//! # Example
//!
//! ```
//! use discord_purge::observer::{Confirm, PurgeObserver, PurgeProgress};
//!
//! let mut last = None;
//! let mut observer = |progress: PurgeProgress| last = Some(progress);
//! observer.on_progress(PurgeProgress { deleted: 1, failed: 0, total: 3 });
//! assert_eq!(last.unwrap().processed(), 1);
//!
//! let only_small_batches = |count: usize| count <= 100;
//! assert!(only_small_batches.decide(10));
//! ```

use crate::models::MessageReference;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Receives each page of accepted scan results.
pub trait ScanObserver: Send {
    /// Called once per page that contributed at least one message.
    fn on_batch(&mut self, batch: &[MessageReference]);
}

impl<F> ScanObserver for F
where
    F: FnMut(&[MessageReference]) + Send,
{
    fn on_batch(&mut self, batch: &[MessageReference]) {
        self(batch);
    }
}

/// Running counts of a purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PurgeProgress {
    /// Messages deleted, including ones that were already gone.
    pub deleted: usize,
    /// Messages that could not be deleted.
    pub failed: usize,
    /// Size of the purge input.
    pub total: usize,
}

impl PurgeProgress {
    /// Number of items handled so far.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.deleted + self.failed
    }
}

/// Receives purge progress after every processed item.
pub trait PurgeObserver: Send {
    /// Called after each delete attempt, whatever its outcome.
    fn on_progress(&mut self, progress: PurgeProgress);
}

impl<F> PurgeObserver for F
where
    F: FnMut(PurgeProgress) + Send,
{
    fn on_progress(&mut self, progress: PurgeProgress) {
        self(progress);
    }
}

/// Decides whether an irreversible purge may start.
pub trait Confirm: Send + Sync {
    /// Returns `true` to proceed with deleting `count` messages.
    fn decide(&self, count: usize) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(usize) -> bool + Send + Sync,
{
    fn decide(&self, count: usize) -> bool {
        self(count)
    }
}

/// Confirmation already obtained upstream; always proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preconfirmed;

impl Confirm for Preconfirmed {
    fn decide(&self, _count: usize) -> bool {
        true
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_batch(&mut self, _batch: &[MessageReference]) {}
}

impl PurgeObserver for NoopObserver {
    fn on_progress(&mut self, _progress: PurgeProgress) {}
}

/// An event forwarded by [`ChannelObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A page of newly accepted scan results.
    ScanBatch(Vec<MessageReference>),
    /// Purge counts after one more item.
    Purge(PurgeProgress),
}

/// Forwards progress to the task that owns the receiving end.
///
/// A closed receiver is not an error: the worker keeps going and events are
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelObserver {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }

    fn forward(&self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            debug!("Progress receiver dropped, discarding event");
        }
    }
}

impl ScanObserver for ChannelObserver {
    fn on_batch(&mut self, batch: &[MessageReference]) {
        self.forward(ProgressEvent::ScanBatch(batch.to_vec()));
    }
}

impl PurgeObserver for ChannelObserver {
    fn on_progress(&mut self, progress: PurgeProgress) {
        self.forward(ProgressEvent::Purge(progress));
    }
}
