//! Per-item reconciliation of local library state against the tracker.

mod movies;
mod shows;

use crate::context::RunContext;
use crate::progress::ProgressReporter;
use media_sync_config::ProviderSupport;
use media_sync_sources::{LocalCatalog, RemoteTracker};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything one item needs to decide and apply its updates.
///
/// Borrowed from the agent for the duration of a run; items of the same batch share
/// it concurrently.
pub struct Reconciler<'a> {
    pub local: &'a dyn LocalCatalog,
    pub remote: &'a dyn RemoteTracker,
    pub providers: &'a ProviderSupport,
    pub progress: &'a ProgressReporter,
    pub cancel: &'a CancellationToken,
    pub run: &'a RunContext,
    pub mutation_delay: Duration,
}

impl Reconciler<'_> {
    /// Rate-limit pause after a remote mutation
    async fn pause(&self) {
        if !self.mutation_delay.is_zero() {
            tokio::time::sleep(self.mutation_delay).await;
        }
    }
}
