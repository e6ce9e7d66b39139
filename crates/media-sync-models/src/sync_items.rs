use crate::remote::{RemoteEpisode, RemoteMovie, RemoteShow};
use serde::{Deserialize, Serialize};

/// Mixed batch of items for one collection or history mutation on the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncItems {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movies: Vec<RemoteMovie>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shows: Vec<RemoteShow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub episodes: Vec<RemoteEpisode>,
}

impl SyncItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn movie(movie: RemoteMovie) -> Self {
        let mut items = Self::new();
        items.add_movie(movie);
        items
    }

    pub fn show(show: RemoteShow) -> Self {
        let mut items = Self::new();
        items.add_show(show);
        items
    }

    pub fn episode(episode: RemoteEpisode) -> Self {
        let mut items = Self::new();
        items.add_episode(episode);
        items
    }

    pub fn add_movie(&mut self, movie: RemoteMovie) {
        self.movies.push(movie);
    }

    pub fn add_show(&mut self, show: RemoteShow) {
        self.shows.push(show);
    }

    pub fn add_episode(&mut self, episode: RemoteEpisode) {
        self.episodes.push(episode);
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty() && self.episodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.movies.len() + self.shows.len() + self.episodes.len()
    }
}
