// Post-pass: find remote collection entries that no local item accounted for

use crate::context::{EpisodeKey, ProcessedSet, RunContext};
use crate::progress::ProgressReporter;
use media_sync_models::{
    CollectedShow, ProgressDetail, ProgressEvent, ProgressStatus, RemoteMovie, SyncItems,
    SyncProcess,
};
use media_sync_sources::RemoteTracker;
use tracing::{info, warn};

/// Remote collected movies with no processed counterpart, in collection order.
pub fn scan_movies<'a>(collected: &'a [RemoteMovie], processed: &ProcessedSet) -> Vec<(usize, &'a RemoteMovie)> {
    collected
        .iter()
        .enumerate()
        .filter(|(_, movie)| !processed.contains_movie(&movie.ids))
        .collect()
}

/// Remote collected episodes with no processed counterpart, with the index of their show.
pub fn scan_episodes(collected: &[CollectedShow], processed: &ProcessedSet) -> Vec<(usize, EpisodeKey)> {
    let mut candidates = Vec::new();
    for (index, show) in collected.iter().enumerate() {
        let Some(show_id) = show.show.ids.trakt else {
            continue;
        };
        for season in &show.seasons {
            for episode in &season.episodes {
                let key = EpisodeKey::new(show_id, season.number, episode.number);
                if !processed.contains_episode(&key) {
                    candidates.push((index, key));
                }
            }
        }
    }
    candidates
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub candidates: usize,
    pub removed: usize,
}

/// Reports removal candidates and, when enabled, removes them in one bulk call.
pub struct DeletionScanner<'a> {
    pub remote: &'a dyn RemoteTracker,
    pub progress: &'a ProgressReporter,
    pub run: &'a RunContext,
    pub remove_from_collection: bool,
}

impl DeletionScanner<'_> {
    fn removal_allowed(&self, process: SyncProcess, queued: usize) -> bool {
        if !self.remove_from_collection || queued == 0 {
            return false;
        }
        if self.run.processed.is_empty() {
            // Nothing local matched at all; removing would wipe the whole collection
            warn!(process = %process, queued, "No processed items, skipping bulk removal");
            self.progress.message(
                process,
                format!("Skipping removal of {} items: no local item matched the remote collection", queued),
            );
            return false;
        }
        true
    }

    pub async fn process_movies(&self, collected: &[RemoteMovie]) -> DeletionOutcome {
        let candidates = scan_movies(collected, &self.run.processed);
        let total = collected.len();

        for (index, movie) in &candidates {
            self.progress.emit(ProgressEvent {
                process: SyncProcess::Movies,
                item_name: movie.title.clone(),
                current: *index,
                total,
                status: ProgressStatus::ShouldRemove,
                message: None,
                detail: ProgressDetail::Movie { year: movie.year },
            });
        }

        self.progress.summary(
            SyncProcess::Movies,
            format!("Remote movies to remove from collection: {}", candidates.len()),
        );

        let mut outcome = DeletionOutcome {
            candidates: candidates.len(),
            removed: 0,
        };
        if !self.removal_allowed(SyncProcess::Movies, candidates.len()) {
            return outcome;
        }

        let mut items = SyncItems::new();
        for (_, movie) in &candidates {
            items.add_movie((*movie).clone());
        }

        match self.remote.remove_from_collection(&items).await {
            Ok(()) => {
                for (position, movie) in items.movies.iter().enumerate() {
                    self.progress.emit(ProgressEvent {
                        process: SyncProcess::Movies,
                        item_name: movie.title.clone(),
                        current: position,
                        total: items.movies.len(),
                        status: ProgressStatus::Remove,
                        message: None,
                        detail: ProgressDetail::Movie { year: movie.year },
                    });
                }
                outcome.removed = items.movies.len();
                info!(removed = outcome.removed, "Removed movies from remote collection");
            }
            Err(e) => {
                warn!(operation = "remove_from_collection", error = %e, "Failed to remove movies");
                self.progress.message(SyncProcess::Movies, format!("Failed to remove movies: {}", e));
            }
        }
        outcome
    }

    pub async fn process_episodes(&self, collected: &[CollectedShow]) -> DeletionOutcome {
        let candidates = scan_episodes(collected, &self.run.processed);
        let total = collected.len();
        let mut items = SyncItems::new();

        for (index, key) in &candidates {
            let resolved = self
                .run
                .shows
                .find_episode(self.remote, self.progress, key.show_id, key.season, key.episode)
                .await;
            if let Some(episode) = resolved {
                items.add_episode(episode);
            }

            self.progress.emit(ProgressEvent {
                process: SyncProcess::TvShows,
                item_name: collected[*index].show.title.clone(),
                current: *index,
                total,
                status: ProgressStatus::ShouldRemove,
                message: None,
                detail: ProgressDetail::Episode {
                    external_id: None,
                    season: Some(key.season),
                    episode: Some(key.episode),
                },
            });
        }

        let unresolved = candidates.len() - items.episodes.len();
        let mut summary = format!("Remote episodes to remove from collection: {}", candidates.len());
        if unresolved > 0 {
            summary.push_str(&format!(" ({} could not be resolved)", unresolved));
        }
        self.progress.summary(SyncProcess::TvShows, summary);

        let mut outcome = DeletionOutcome {
            candidates: candidates.len(),
            removed: 0,
        };
        if !self.removal_allowed(SyncProcess::TvShows, items.episodes.len()) {
            return outcome;
        }

        match self.remote.remove_from_collection(&items).await {
            Ok(()) => {
                for (position, episode) in items.episodes.iter().enumerate() {
                    self.progress.emit(ProgressEvent {
                        process: SyncProcess::TvShows,
                        item_name: episode.title.clone().unwrap_or_default(),
                        current: position,
                        total: items.episodes.len(),
                        status: ProgressStatus::Remove,
                        message: None,
                        detail: ProgressDetail::Episode {
                            external_id: None,
                            season: Some(episode.season),
                            episode: Some(episode.number),
                        },
                    });
                }
                outcome.removed = items.episodes.len();
                info!(removed = outcome.removed, "Removed episodes from remote collection");
            }
            Err(e) => {
                warn!(operation = "remove_from_collection", error = %e, "Failed to remove episodes");
                self.progress.message(SyncProcess::TvShows, format!("Failed to remove episodes: {}", e));
            }
        }
        outcome
    }
}
