use super::Reconciler;
use crate::matching::matches_movie;
use crate::progress::ItemProgress;
use media_sync_models::{
    LocalMovie, ProgressStatus, RemoteMovie, SearchHit, SyncItems, WatchedMovie,
};
use media_sync_sources::SourceError;
use tracing::{debug, warn};

impl Reconciler<'_> {
    pub async fn reconcile_movie(
        &self,
        movie: &LocalMovie,
        index: usize,
        total: usize,
        collected: &[RemoteMovie],
        watched: &[WatchedMovie],
    ) {
        let progress = ItemProgress::movie(self.progress, &movie.title, movie.year, index, total);

        if let Some(remote) = watched.iter().find(|w| matches_movie(&movie.external, &w.movie.ids)) {
            self.run.processed.record_movie(&remote.movie.ids);
            progress.report(ProgressStatus::Processing);

            if movie.is_watched() {
                progress.report(ProgressStatus::Nothing);
                return;
            }

            match self.local.mark_watched(&movie.id).await {
                Ok(()) => progress.report(ProgressStatus::Sync),
                Err(e) => {
                    warn!(
                        operation = "mark_watched",
                        title = %movie.title,
                        error = %e,
                        "Failed to mark movie as watched locally"
                    );
                    progress.report_with(
                        ProgressStatus::Message,
                        format!("Failed to mark as watched locally: {}", e),
                    );
                }
            }
            return;
        }

        progress.report(ProgressStatus::NotWatchedRemote);

        let collected_match = collected.iter().find(|c| matches_movie(&movie.external, &c.ids));
        if let Some(remote) = collected_match {
            self.run.processed.record_movie(&remote.ids);
        }

        match (movie.is_watched(), collected_match) {
            (true, Some(remote)) => {
                match self.remote.add_watched_history(&SyncItems::movie(remote.clone())).await {
                    Ok(()) => {
                        self.pause().await;
                        progress.report(ProgressStatus::WatchedRemote);
                    }
                    Err(e) => {
                        warn!(
                            operation = "add_watched_history",
                            title = %movie.title,
                            error = %e,
                            "Failed to add movie to remote history"
                        );
                        progress.report_with(ProgressStatus::ErrorAddRemote, e.to_string());
                    }
                }
            }
            (with_history, None) => {
                progress.report(ProgressStatus::NotFoundRemote);
                self.add_missing_movie(movie, &progress, with_history).await;
            }
            (false, Some(_)) => progress.report(ProgressStatus::Nothing),
        }
    }

    /// Look the movie up by its external id and add it to the collection, and to the
    /// watch history when `with_history` is set.
    async fn add_missing_movie(&self, movie: &LocalMovie, progress: &ItemProgress<'_>, with_history: bool) {
        let Some(kind) = self.providers.movie_search_kind(&movie.external.provider) else {
            debug!(
                title = %movie.title,
                provider = %movie.external.provider,
                "No remote search for this provider"
            );
            progress.report(ProgressStatus::NotSupported);
            return;
        };

        let result = async {
            let hits = self.remote.search_by_external_id(kind, &movie.external.id).await?;
            let Some(found) = hits.iter().find_map(SearchHit::as_movie).cloned() else {
                return Ok(None);
            };

            let items = SyncItems::movie(found.clone());
            self.remote.add_to_collection(&items).await?;
            self.pause().await;
            if with_history {
                self.remote.add_watched_history(&items).await?;
                self.pause().await;
            }
            Ok::<_, SourceError>(Some(found))
        }
        .await;

        match result {
            Ok(Some(found)) => {
                self.run.processed.record_movie(&found.ids);
                progress.report(ProgressStatus::AddRemote);
            }
            Ok(None) => {
                progress.report_with(
                    ProgressStatus::NotFoundRemote,
                    format!("No remote match for {}", movie.external),
                );
            }
            Err(e) => {
                warn!(
                    operation = "add_missing_movie",
                    title = %movie.title,
                    external = %movie.external,
                    error = %e,
                    "Failed to add movie to remote collection"
                );
                progress.report_with(ProgressStatus::ErrorAddRemote, e.to_string());
            }
        }
    }
}
