use super::Reconciler;
use crate::context::EpisodeKey;
use crate::matching::matches_show;
use crate::progress::ItemProgress;
use media_sync_models::{
    CollectedSeason, CollectedShow, LocalSeason, LocalShow, ProgressStatus, RemoteEpisode,
    SearchHit, SyncItems, WatchedSeason, WatchedShow,
};
use media_sync_sources::SourceError;
use tracing::{debug, warn};

impl Reconciler<'_> {
    pub async fn reconcile_show(
        &self,
        show: &LocalShow,
        index: usize,
        total: usize,
        collected: &[CollectedShow],
        watched: &[WatchedShow],
    ) {
        let progress = ItemProgress::show(self.progress, &show.title, &show.external.id, index, total);

        if !self.providers.is_show_supported(&show.external.provider) {
            debug!(title = %show.title, provider = %show.external.provider, "Show provider not supported");
            progress.report(ProgressStatus::NotSupported);
            return;
        }

        let Some(remote_show) = collected.iter().find(|c| matches_show(&show.external, &c.show.ids)) else {
            progress.report(ProgressStatus::NotFoundRemote);
            self.add_missing_show(show, &progress).await;
            return;
        };

        let Some(show_id) = remote_show.show.ids.trakt else {
            warn!(title = %show.title, "Collected show has no remote id");
            progress.report_with(ProgressStatus::ErrorAddRemote, "Remote show has no id");
            return;
        };

        let watched_show = watched.iter().find(|w| matches_show(&show.external, &w.show.ids));

        let mut show = show.clone();
        if let Err(e) = self.local.populate_seasons(&mut show).await {
            warn!(operation = "populate_seasons", title = %show.title, error = %e, "Failed to load local seasons");
            progress.report_with(ProgressStatus::Message, format!("Failed to load local seasons: {}", e));
            return;
        }

        for season in show.seasons.iter_mut() {
            if self.cancel.is_cancelled() {
                debug!(title = %show.title, "Cancelled during show processing");
                return;
            }

            if let Err(e) = self.local.populate_episodes(season).await {
                warn!(
                    operation = "populate_episodes",
                    title = %show.title,
                    season = season.number,
                    error = %e,
                    "Failed to load local episodes"
                );
                progress.report_season_with(
                    ProgressStatus::Message,
                    season.number,
                    format!("Failed to load local episodes: {}", e),
                );
                continue;
            }

            let watched_season = watched_show.and_then(|w| w.season(season.number));
            match remote_show.season(season.number) {
                Some(collected_season) => {
                    self.reconcile_collected_season(show_id, season, collected_season, watched_season, &progress)
                        .await
                }
                None => self.add_missing_season(show_id, season, &progress).await,
            }
        }
    }

    async fn add_missing_show(&self, show: &LocalShow, progress: &ItemProgress<'_>) {
        let Some(kind) = self.providers.show_search_kind(&show.external.provider) else {
            progress.report(ProgressStatus::NotSupported);
            return;
        };

        let result = async {
            let hits = self.remote.search_by_external_id(kind, &show.external.id).await?;
            let Some(found) = hits.iter().find_map(SearchHit::as_show).cloned() else {
                return Ok(false);
            };
            self.remote.add_to_collection(&SyncItems::show(found)).await?;
            self.pause().await;
            Ok::<_, SourceError>(true)
        }
        .await;

        match result {
            Ok(true) => progress.report(ProgressStatus::AddRemote),
            Ok(false) => debug!(title = %show.title, external = %show.external, "No remote match for show"),
            Err(e) => {
                warn!(
                    operation = "add_missing_show",
                    title = %show.title,
                    external = %show.external,
                    error = %e,
                    "Failed to add show to remote collection"
                );
                progress.report_with(ProgressStatus::ErrorAddRemote, e.to_string());
            }
        }
    }

    /// The whole season is missing from the remote collection: submit every local
    /// episode the tracker knows in one collection call, watched ones in one history call.
    async fn add_missing_season(&self, show_id: u64, season: &LocalSeason, progress: &ItemProgress<'_>) {
        progress.report_season(ProgressStatus::Processing, season.number);

        let result = async {
            let remote_episodes = self.remote.fetch_season(show_id, season.number).await?;

            let mut collection = SyncItems::new();
            let mut history = SyncItems::new();
            let mut added = Vec::new();
            for episode in &season.episodes {
                let Some(remote) = remote_episodes.iter().find(|r| r.number == episode.number) else {
                    continue;
                };
                collection.add_episode(remote.clone());
                if episode.is_watched() {
                    history.add_episode(remote.clone());
                }
                added.push(remote.number);
            }

            if !collection.is_empty() {
                self.remote.add_to_collection(&collection).await?;
                self.pause().await;
            }
            if !history.is_empty() {
                self.remote.add_watched_history(&history).await?;
                self.pause().await;
            }
            Ok::<_, SourceError>(added)
        }
        .await;

        match result {
            Ok(added) => {
                for number in added {
                    self.run
                        .processed
                        .record_episode(EpisodeKey::new(show_id, season.number, number));
                    progress.report_episode(ProgressStatus::AddRemote, season.number, number);
                }
            }
            Err(e) => {
                warn!(
                    operation = "add_missing_season",
                    show_id,
                    season = season.number,
                    error = %e,
                    "Failed to add season to remote collection"
                );
                progress.report_season_with(ProgressStatus::ErrorAddRemote, season.number, e.to_string());
            }
        }
    }

    async fn reconcile_collected_season(
        &self,
        show_id: u64,
        season: &LocalSeason,
        collected: &CollectedSeason,
        watched: Option<&WatchedSeason>,
        progress: &ItemProgress<'_>,
    ) {
        let mut missing = SyncItems::new();

        for episode in &season.episodes {
            if self.cancel.is_cancelled() {
                // Episodes queued for the season submission are picked up by the next run
                debug!(show_id, season = season.number, queued = missing.len(), "Cancelled during season processing");
                return;
            }

            let key = EpisodeKey::new(show_id, season.number, episode.number);
            if collected.episode(episode.number).is_some() {
                self.run.processed.record_episode(key);
            } else {
                match self.resolve_episode(show_id, season.number, episode.number).await {
                    Ok(remote) => missing.add_episode(remote),
                    Err(e) => {
                        debug!(show_id, season = season.number, episode = episode.number, error = %e, "Episode unknown remotely");
                        progress.report_episode(ProgressStatus::NotFoundRemote, season.number, episode.number);
                    }
                }
            }

            let remote_watched = watched
                .and_then(|w| w.episode(episode.number))
                .is_some_and(|e| e.plays > 0);

            match (episode.is_watched(), remote_watched) {
                (true, false) => self.push_episode_history(key, progress).await,
                (false, true) => match self.local.mark_watched(&episode.id).await {
                    Ok(()) => progress.report_episode(ProgressStatus::Sync, season.number, episode.number),
                    Err(e) => {
                        warn!(
                            operation = "mark_watched",
                            show_id,
                            season = season.number,
                            episode = episode.number,
                            error = %e,
                            "Failed to mark episode as watched locally"
                        );
                        progress.report_episode_with(
                            ProgressStatus::Message,
                            season.number,
                            episode.number,
                            format!("Failed to mark as watched locally: {}", e),
                        );
                    }
                },
                _ => progress.report_episode(ProgressStatus::Nothing, season.number, episode.number),
            }
        }

        if missing.is_empty() {
            return;
        }

        match self.remote.add_to_collection(&missing).await {
            Ok(()) => {
                self.pause().await;
                for episode in &missing.episodes {
                    self.run
                        .processed
                        .record_episode(EpisodeKey::new(show_id, season.number, episode.number));
                    progress.report_episode(ProgressStatus::AddRemote, season.number, episode.number);
                }
            }
            Err(e) => {
                warn!(
                    operation = "add_to_collection",
                    show_id,
                    season = season.number,
                    error = %e,
                    "Failed to add episodes to remote collection"
                );
                progress.report_season_with(ProgressStatus::ErrorAddRemote, season.number, e.to_string());
            }
        }
    }

    /// Locally watched, not watched remotely: add the exact episode to the history.
    async fn push_episode_history(&self, key: EpisodeKey, progress: &ItemProgress<'_>) {
        progress.report_episode(ProgressStatus::Processing, key.season, key.episode);

        let result = async {
            let episode = self.resolve_episode(key.show_id, key.season, key.episode).await?;
            self.remote.add_watched_history(&SyncItems::episode(episode)).await?;
            self.pause().await;
            Ok::<_, SourceError>(())
        }
        .await;

        match result {
            Ok(()) => {
                self.run.processed.record_episode(key);
                progress.report_episode(ProgressStatus::Sync, key.season, key.episode);
            }
            Err(e) => {
                warn!(
                    operation = "add_watched_history",
                    show_id = key.show_id,
                    season = key.season,
                    episode = key.episode,
                    error = %e,
                    "Failed to add episode to remote history"
                );
                progress.report_episode_with(ProgressStatus::ErrorAddRemote, key.season, key.episode, e.to_string());
            }
        }
    }

    /// Exact remote episode, from the show cache when possible.
    async fn resolve_episode(&self, show_id: u64, season: u32, episode: u32) -> Result<RemoteEpisode, SourceError> {
        if let Some(found) = self
            .run
            .shows
            .find_episode(self.remote, self.progress, show_id, season, episode)
            .await
        {
            return Ok(found);
        }
        self.remote.fetch_episode(show_id, season, episode).await
    }
}
