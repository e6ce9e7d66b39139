use crate::batch::run_in_batches;
use crate::context::RunContext;
use crate::deletion::{DeletionOutcome, DeletionScanner};
use crate::progress::ProgressReporter;
use crate::reconcile::Reconciler;
use anyhow::{Context, Result};
use media_sync_config::{ProviderSupport, SyncOptions};
use media_sync_models::SyncProcess;
use media_sync_sources::{LocalCatalog, RemoteTracker};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Drives one reconciliation pass per media kind.
///
/// Every pass starts from scratch: catalogs are fetched again and a fresh
/// [`RunContext`] is created, so nothing leaks from one run into the next.
pub struct SyncAgent {
    local: Arc<dyn LocalCatalog>,
    remote: Arc<dyn RemoteTracker>,
    options: SyncOptions,
    providers: ProviderSupport,
    progress: ProgressReporter,
    cancel: CancellationToken,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub process: SyncProcess,
    /// Local items in the catalog
    pub items_total: usize,
    /// Local items whose reconciliation ran to completion
    pub items_processed: usize,
    pub removal_candidates: usize,
    pub removed: usize,
    pub cancelled: bool,
    pub duration: Duration,
}

impl SyncAgent {
    pub fn new(
        local: Arc<dyn LocalCatalog>,
        remote: Arc<dyn RemoteTracker>,
        options: SyncOptions,
        providers: ProviderSupport,
        progress: ProgressReporter,
    ) -> Self {
        Self {
            local,
            remote,
            options,
            providers,
            progress,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned token, e.g. one cancelled by a signal handler.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn reconciler<'a>(&'a self, run: &'a RunContext) -> Reconciler<'a> {
        Reconciler {
            local: self.local.as_ref(),
            remote: self.remote.as_ref(),
            providers: &self.providers,
            progress: &self.progress,
            cancel: &self.cancel,
            run,
            mutation_delay: self.options.mutation_delay(),
        }
    }

    fn deletion_scanner<'a>(&'a self, run: &'a RunContext) -> DeletionScanner<'a> {
        DeletionScanner {
            remote: self.remote.as_ref(),
            progress: &self.progress,
            run,
            remove_from_collection: self.options.remove_from_collection,
        }
    }

    /// Run the movie pass, then the show pass, as enabled in the options.
    ///
    /// A cancelled movie pass prevents the show pass from starting.
    pub async fn sync_all(&self) -> Result<Vec<SyncResult>> {
        let mut results = Vec::new();

        if self.options.movies {
            results.push(self.sync_movies().await?);
        }

        if self.options.shows {
            if self.cancel.is_cancelled() {
                info!("Cancellation requested, skipping TV show sync");
            } else {
                results.push(self.sync_shows().await?);
            }
        }

        Ok(results)
    }

    #[instrument(skip(self))]
    pub async fn sync_movies(&self) -> Result<SyncResult> {
        let start = Instant::now();
        let process = SyncProcess::Movies;
        info!(
            operation = "sync_start",
            process = %process,
            batch_limit = self.options.batch_limit,
            "Starting movie sync"
        );

        let (local, collected, watched) = futures::try_join!(
            async { self.local.fetch_movies().await.context("Failed to fetch local movies") },
            async {
                self.remote
                    .fetch_collected_movies()
                    .await
                    .context("Failed to fetch remote movie collection")
            },
            async {
                self.remote
                    .fetch_watched_movies()
                    .await
                    .context("Failed to fetch remote watched movies")
            },
        )?;

        info!(
            local = local.len(),
            collected = collected.len(),
            watched = watched.len(),
            "Fetched movie catalogs"
        );
        self.progress.summary(
            process,
            format!(
                "Local movies: {}, remote collected: {}, remote watched: {}",
                local.len(),
                collected.len(),
                watched.len()
            ),
        );

        let run = RunContext::new();
        let reconciler = self.reconciler(&run);
        let total = local.len();

        let batches = {
            let reconciler = &reconciler;
            let collected = &collected[..];
            let watched = &watched[..];
            run_in_batches(&local, self.options.batch_limit, &self.cancel, move |index, movie| {
                reconciler.reconcile_movie(movie, index, total, collected, watched)
            })
            .await
        };

        let deletion = self.finish_pass(process, batches.cancelled, || async {
            self.deletion_scanner(&run).process_movies(&collected).await
        })
        .await;

        Ok(self.result(process, total, batches.processed, batches.cancelled, deletion, start))
    }

    #[instrument(skip(self))]
    pub async fn sync_shows(&self) -> Result<SyncResult> {
        let start = Instant::now();
        let process = SyncProcess::TvShows;
        info!(
            operation = "sync_start",
            process = %process,
            batch_limit = self.options.batch_limit,
            "Starting TV show sync"
        );

        let (local, collected, watched) = futures::try_join!(
            async { self.local.fetch_shows().await.context("Failed to fetch local shows") },
            async {
                self.remote
                    .fetch_collected_shows()
                    .await
                    .context("Failed to fetch remote show collection")
            },
            async {
                self.remote
                    .fetch_watched_shows()
                    .await
                    .context("Failed to fetch remote watched shows")
            },
        )?;

        info!(
            local = local.len(),
            collected = collected.len(),
            watched = watched.len(),
            "Fetched show catalogs"
        );
        self.progress.summary(
            process,
            format!(
                "Local shows: {}, remote collected: {}, remote watched: {}",
                local.len(),
                collected.len(),
                watched.len()
            ),
        );

        let run = RunContext::new();
        let reconciler = self.reconciler(&run);
        let total = local.len();

        let batches = {
            let reconciler = &reconciler;
            let collected = &collected[..];
            let watched = &watched[..];
            run_in_batches(&local, self.options.batch_limit, &self.cancel, move |index, show| {
                reconciler.reconcile_show(show, index, total, collected, watched)
            })
            .await
        };

        let deletion = self.finish_pass(process, batches.cancelled, || async {
            self.deletion_scanner(&run).process_episodes(&collected).await
        })
        .await;

        Ok(self.result(process, total, batches.processed, batches.cancelled, deletion, start))
    }

    /// Deletion runs only for passes that covered the whole catalog.
    async fn finish_pass<F, Fut>(&self, process: SyncProcess, cancelled: bool, deletion: F) -> DeletionOutcome
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = DeletionOutcome>,
    {
        if cancelled {
            warn!(process = %process, "Sync cancelled, skipping deletion scan");
            self.progress
                .summary(process, "Sync cancelled before all items were processed");
            return DeletionOutcome::default();
        }
        deletion().await
    }

    fn result(
        &self,
        process: SyncProcess,
        items_total: usize,
        items_processed: usize,
        cancelled: bool,
        deletion: DeletionOutcome,
        start: Instant,
    ) -> SyncResult {
        let result = SyncResult {
            process,
            items_total,
            items_processed,
            removal_candidates: deletion.candidates,
            removed: deletion.removed,
            cancelled,
            duration: start.elapsed(),
        };

        info!(
            operation = "sync_complete",
            process = %process,
            items_total,
            items_processed,
            removal_candidates = result.removal_candidates,
            removed = result.removed,
            cancelled,
            duration_ms = result.duration.as_millis() as u64,
            "{} sync finished",
            process
        );
        self.progress.summary(
            process,
            format!(
                "Processed {} of {} items in {:.1}s",
                items_processed,
                items_total,
                result.duration.as_secs_f64()
            ),
        );
        result
    }
}
