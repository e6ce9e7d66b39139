use crate::matching::matches_remote;
use crate::show_cache::RemoteShowCache;
use media_sync_models::RemoteIds;
use std::collections::HashSet;
use std::sync::Mutex;

/// Collected episode position on the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpisodeKey {
    pub show_id: u64,
    pub season: u32,
    pub episode: u32,
}

impl EpisodeKey {
    pub fn new(show_id: u64, season: u32, episode: u32) -> Self {
        Self {
            show_id,
            season,
            episode,
        }
    }
}

/// Remote items confirmed to have a local counterpart during one run.
///
/// Anything collected remotely but absent here is a removal candidate.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    movies: Mutex<Vec<RemoteIds>>,
    episodes: Mutex<HashSet<EpisodeKey>>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_movie(&self, ids: &RemoteIds) {
        let mut movies = self.movies.lock().unwrap_or_else(|e| e.into_inner());
        if !movies.iter().any(|seen| seen == ids) {
            movies.push(ids.clone());
        }
    }

    pub fn record_episode(&self, key: EpisodeKey) {
        self.episodes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key);
    }

    pub fn contains_movie(&self, ids: &RemoteIds) -> bool {
        self.movies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|seen| matches_remote(ids, seen))
    }

    pub fn contains_episode(&self, key: &EpisodeKey) -> bool {
        self.episodes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }

    pub fn movie_count(&self) -> usize {
        self.movies.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_count() == 0 && self.episode_count() == 0
    }
}

/// State shared by every item of one sync run and discarded afterwards.
#[derive(Default)]
pub struct RunContext {
    pub processed: ProcessedSet,
    pub shows: RemoteShowCache,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }
}
