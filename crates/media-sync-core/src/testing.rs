//! Recording, stateful fakes of the two collaborator traits.
//!
//! Mutations change the fake's state the way the real services would, so a
//! second run against the same fakes sees the result of the first.

use async_trait::async_trait;
use media_sync_models::{
    CollectedEpisode, CollectedSeason, CollectedShow, ExternalProvider, ExternalRef, LocalEpisode,
    LocalMovie, LocalSeason, LocalShow, RemoteEpisode, RemoteIds, RemoteMovie, RemoteSeason,
    RemoteShow, SearchHit, SearchIdKind, ShowWithSeasons, SyncItems, WatchedEpisode, WatchedMovie,
    WatchedSeason, WatchedShow,
};
use media_sync_sources::error::Result;
use media_sync_sources::{LocalCatalog, RemoteTracker, SourceError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchMovies,
    FetchShows,
    PopulateSeasons(String),
    PopulateEpisodes(String),
    MarkWatched(String),
    FetchCollectedMovies,
    FetchWatchedMovies,
    FetchCollectedShows,
    FetchWatchedShows,
    Search(SearchIdKind, String),
    FetchShow(u64),
    FetchSeasons(u64),
    FetchSeason(u64, u32),
    FetchEpisode(u64, u32, u32),
    AddToCollection(SyncItems),
    AddWatchedHistory(SyncItems),
    RemoveFromCollection(SyncItems),
}

impl Call {
    /// Calls that change state on either side
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::MarkWatched(_)
                | Call::AddToCollection(_)
                | Call::AddWatchedHistory(_)
                | Call::RemoveFromCollection(_)
        )
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// Local side
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeLocal {
    movies: Mutex<Vec<LocalMovie>>,
    shows: Mutex<Vec<LocalShow>>,
    calls: Mutex<Vec<Call>>,
    cancel_on_mark_watched: Mutex<Option<CancellationToken>>,
}

impl FakeLocal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movies(self, movies: Vec<LocalMovie>) -> Self {
        *lock(&self.movies) = movies;
        self
    }

    /// Shows with their full season/episode tree
    pub fn with_shows(self, shows: Vec<LocalShow>) -> Self {
        *lock(&self.shows) = shows;
        self
    }

    /// Cancel `token` from inside the first episode `mark_watched` call, after it succeeds
    pub fn cancel_on_mark_watched(self, token: CancellationToken) -> Self {
        *lock(&self.cancel_on_mark_watched) = Some(token);
        self
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        lock(&self.calls).iter().filter(|c| predicate(c)).count()
    }

    pub fn mutations(&self) -> Vec<Call> {
        lock(&self.calls).iter().filter(|c| c.is_mutation()).cloned().collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn view_count(&self, local_id: &str) -> Option<u32> {
        if let Some(movie) = lock(&self.movies).iter().find(|m| m.id == local_id) {
            return Some(movie.view_count);
        }
        lock(&self.shows)
            .iter()
            .flat_map(|s| &s.seasons)
            .flat_map(|s| &s.episodes)
            .find(|e| e.id == local_id)
            .map(|e| e.view_count)
    }
}

#[async_trait]
impl LocalCatalog for FakeLocal {
    async fn fetch_movies(&self) -> Result<Vec<LocalMovie>> {
        self.record(Call::FetchMovies);
        Ok(lock(&self.movies).clone())
    }

    async fn fetch_shows(&self) -> Result<Vec<LocalShow>> {
        self.record(Call::FetchShows);
        Ok(lock(&self.shows)
            .iter()
            .map(|show| LocalShow {
                seasons: Vec::new(),
                ..show.clone()
            })
            .collect())
    }

    async fn populate_seasons(&self, show: &mut LocalShow) -> Result<()> {
        self.record(Call::PopulateSeasons(show.id.clone()));
        let shows = lock(&self.shows);
        let stored = shows
            .iter()
            .find(|s| s.id == show.id)
            .ok_or_else(|| SourceError::NotFound(format!("show {}", show.id)))?;
        show.seasons = stored
            .seasons
            .iter()
            .map(|season| LocalSeason {
                episodes: Vec::new(),
                ..season.clone()
            })
            .collect();
        Ok(())
    }

    async fn populate_episodes(&self, season: &mut LocalSeason) -> Result<()> {
        self.record(Call::PopulateEpisodes(season.id.clone()));
        let shows = lock(&self.shows);
        let stored = shows
            .iter()
            .flat_map(|s| &s.seasons)
            .find(|s| s.id == season.id)
            .ok_or_else(|| SourceError::NotFound(format!("season {}", season.id)))?;
        season.episodes = stored.episodes.clone();
        Ok(())
    }

    async fn mark_watched(&self, local_id: &str) -> Result<()> {
        self.record(Call::MarkWatched(local_id.to_string()));
        if let Some(movie) = lock(&self.movies).iter_mut().find(|m| m.id == local_id) {
            movie.view_count += 1;
            return Ok(());
        }
        let mut shows = lock(&self.shows);
        let episode = shows
            .iter_mut()
            .flat_map(|s| s.seasons.iter_mut())
            .flat_map(|s| s.episodes.iter_mut())
            .find(|e| e.id == local_id)
            .ok_or_else(|| SourceError::NotFound(format!("item {}", local_id)))?;
        episode.view_count += 1;
        if let Some(token) = lock(&self.cancel_on_mark_watched).take() {
            token.cancel();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Remote side
// ---------------------------------------------------------------------------

/// show id → season → episode → plays
type EpisodeMap<V> = BTreeMap<u64, BTreeMap<u32, BTreeMap<u32, V>>>;

#[derive(Default)]
struct RemoteState {
    collected_movies: Vec<RemoteMovie>,
    watched_movies: Vec<WatchedMovie>,
    trees: HashMap<u64, ShowWithSeasons>,
    collected_episodes: EpisodeMap<()>,
    watched_episodes: EpisodeMap<u32>,
    search: Vec<(SearchIdKind, String, SearchHit)>,
    show_fetch_failures: usize,
    fail_searches: bool,
    fail_catalog: bool,
}

impl RemoteState {
    fn show_meta(&self, show_id: u64) -> RemoteShow {
        self.trees
            .get(&show_id)
            .map(|t| t.show.clone())
            .unwrap_or_else(|| RemoteShow {
                title: format!("Show {}", show_id),
                year: None,
                ids: RemoteIds::trakt(show_id),
            })
    }

    /// Position of an episode in the known show trees, by its remote id
    fn locate(&self, episode: &RemoteEpisode) -> Option<(u64, u32, u32)> {
        let trakt = episode.ids.trakt?;
        self.trees.iter().find_map(|(show_id, tree)| {
            tree.seasons
                .iter()
                .flat_map(|s| &s.episodes)
                .find(|e| e.ids.trakt == Some(trakt))
                .map(|e| (*show_id, e.season, e.number))
        })
    }
}

#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<RemoteState>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect_movie(&self, movie: RemoteMovie) {
        lock(&self.state).collected_movies.push(movie);
    }

    pub fn watch_movie(&self, movie: RemoteMovie, plays: u32) {
        lock(&self.state).watched_movies.push(WatchedMovie { movie, plays });
    }

    pub fn add_tree(&self, tree: ShowWithSeasons) {
        if let Some(id) = tree.show.ids.trakt {
            lock(&self.state).trees.insert(id, tree);
        }
    }

    pub fn collect_episodes(&self, show_id: u64, season: u32, episodes: &[u32]) {
        let mut state = lock(&self.state);
        let entry = state.collected_episodes.entry(show_id).or_default().entry(season).or_default();
        for number in episodes {
            entry.insert(*number, ());
        }
    }

    pub fn watch_episodes(&self, show_id: u64, season: u32, episodes: &[u32]) {
        let mut state = lock(&self.state);
        let entry = state.watched_episodes.entry(show_id).or_default().entry(season).or_default();
        for number in episodes {
            *entry.entry(*number).or_default() += 1;
        }
    }

    pub fn add_search_hit(&self, kind: SearchIdKind, id: &str, hit: SearchHit) {
        lock(&self.state).search.push((kind, id.to_string(), hit));
    }

    pub fn fail_next_show_fetches(&self, count: usize) {
        lock(&self.state).show_fetch_failures = count;
    }

    pub fn fail_searches(&self) {
        lock(&self.state).fail_searches = true;
    }

    pub fn fail_catalog(&self) {
        lock(&self.state).fail_catalog = true;
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        lock(&self.calls).iter().filter(|c| predicate(c)).count()
    }

    pub fn mutations(&self) -> Vec<Call> {
        lock(&self.calls).iter().filter(|c| c.is_mutation()).cloned().collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn collected_movie_ids(&self) -> Vec<u64> {
        lock(&self.state).collected_movies.iter().filter_map(|m| m.ids.trakt).collect()
    }

    pub fn movie_plays(&self, trakt: u64) -> u32 {
        lock(&self.state)
            .watched_movies
            .iter()
            .find(|w| w.movie.ids.trakt == Some(trakt))
            .map_or(0, |w| w.plays)
    }

    pub fn is_episode_collected(&self, show_id: u64, season: u32, episode: u32) -> bool {
        lock(&self.state)
            .collected_episodes
            .get(&show_id)
            .and_then(|s| s.get(&season))
            .is_some_and(|e| e.contains_key(&episode))
    }

    pub fn episode_plays(&self, show_id: u64, season: u32, episode: u32) -> u32 {
        lock(&self.state)
            .watched_episodes
            .get(&show_id)
            .and_then(|s| s.get(&season))
            .and_then(|e| e.get(&episode))
            .copied()
            .unwrap_or(0)
    }

    fn catalog_check(&self) -> Result<()> {
        if lock(&self.state).fail_catalog {
            return Err(SourceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteTracker for FakeRemote {
    async fn fetch_collected_movies(&self) -> Result<Vec<RemoteMovie>> {
        self.record(Call::FetchCollectedMovies);
        self.catalog_check()?;
        Ok(lock(&self.state).collected_movies.clone())
    }

    async fn fetch_watched_movies(&self) -> Result<Vec<WatchedMovie>> {
        self.record(Call::FetchWatchedMovies);
        Ok(lock(&self.state).watched_movies.clone())
    }

    async fn fetch_collected_shows(&self) -> Result<Vec<CollectedShow>> {
        self.record(Call::FetchCollectedShows);
        self.catalog_check()?;
        let state = lock(&self.state);
        Ok(state
            .collected_episodes
            .iter()
            .map(|(show_id, seasons)| CollectedShow {
                show: state.show_meta(*show_id),
                seasons: seasons
                    .iter()
                    .map(|(number, episodes)| CollectedSeason {
                        number: *number,
                        episodes: episodes.keys().map(|n| CollectedEpisode { number: *n }).collect(),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn fetch_watched_shows(&self) -> Result<Vec<WatchedShow>> {
        self.record(Call::FetchWatchedShows);
        let state = lock(&self.state);
        Ok(state
            .watched_episodes
            .iter()
            .map(|(show_id, seasons)| WatchedShow {
                show: state.show_meta(*show_id),
                plays: seasons.values().flat_map(|e| e.values()).sum(),
                seasons: seasons
                    .iter()
                    .map(|(number, episodes)| WatchedSeason {
                        number: *number,
                        episodes: episodes
                            .iter()
                            .map(|(n, plays)| WatchedEpisode {
                                number: *n,
                                plays: *plays,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn search_by_external_id(&self, kind: SearchIdKind, id: &str) -> Result<Vec<SearchHit>> {
        self.record(Call::Search(kind, id.to_string()));
        let state = lock(&self.state);
        if state.fail_searches {
            return Err(SourceError::new("search unavailable"));
        }
        Ok(state
            .search
            .iter()
            .filter(|(k, i, _)| *k == kind && i == id)
            .map(|(_, _, hit)| hit.clone())
            .collect())
    }

    async fn fetch_show(&self, show_id: u64) -> Result<RemoteShow> {
        self.record(Call::FetchShow(show_id));
        // Give concurrent lookups a chance to interleave
        tokio::task::yield_now().await;
        let mut state = lock(&self.state);
        if state.show_fetch_failures > 0 {
            state.show_fetch_failures -= 1;
            return Err(SourceError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        state
            .trees
            .get(&show_id)
            .map(|t| t.show.clone())
            .ok_or_else(|| SourceError::NotFound(format!("show {}", show_id)))
    }

    async fn fetch_seasons(&self, show_id: u64) -> Result<Vec<RemoteSeason>> {
        self.record(Call::FetchSeasons(show_id));
        lock(&self.state)
            .trees
            .get(&show_id)
            .map(|t| t.seasons.clone())
            .ok_or_else(|| SourceError::NotFound(format!("show {}", show_id)))
    }

    async fn fetch_season(&self, show_id: u64, season: u32) -> Result<Vec<RemoteEpisode>> {
        self.record(Call::FetchSeason(show_id, season));
        lock(&self.state)
            .trees
            .get(&show_id)
            .and_then(|t| t.seasons.iter().find(|s| s.number == season))
            .map(|s| s.episodes.clone())
            .ok_or_else(|| SourceError::NotFound(format!("show {} season {}", show_id, season)))
    }

    async fn fetch_episode(&self, show_id: u64, season: u32, episode: u32) -> Result<RemoteEpisode> {
        self.record(Call::FetchEpisode(show_id, season, episode));
        lock(&self.state)
            .trees
            .get(&show_id)
            .and_then(|t| t.episode(season, episode))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("show {} S{}E{}", show_id, season, episode)))
    }

    async fn add_to_collection(&self, items: &SyncItems) -> Result<()> {
        self.record(Call::AddToCollection(items.clone()));
        let mut state = lock(&self.state);

        for movie in &items.movies {
            if !state.collected_movies.iter().any(|m| m.ids.trakt == movie.ids.trakt) {
                state.collected_movies.push(movie.clone());
            }
        }

        // Adding a show collects every episode the tracker knows of
        for show in &items.shows {
            let Some(show_id) = show.ids.trakt else { continue };
            let Some(tree) = state.trees.get(&show_id).cloned() else { continue };
            for season in &tree.seasons {
                let entry = state.collected_episodes.entry(show_id).or_default().entry(season.number).or_default();
                for episode in &season.episodes {
                    entry.insert(episode.number, ());
                }
            }
        }

        for episode in &items.episodes {
            if let Some((show_id, season, number)) = state.locate(episode) {
                state
                    .collected_episodes
                    .entry(show_id)
                    .or_default()
                    .entry(season)
                    .or_default()
                    .insert(number, ());
            }
        }
        Ok(())
    }

    async fn add_watched_history(&self, items: &SyncItems) -> Result<()> {
        self.record(Call::AddWatchedHistory(items.clone()));
        let mut state = lock(&self.state);

        for movie in &items.movies {
            let existing = state
                .watched_movies
                .iter()
                .position(|w| w.movie.ids.trakt == movie.ids.trakt);
            match existing {
                Some(index) => state.watched_movies[index].plays += 1,
                None => state.watched_movies.push(WatchedMovie {
                    movie: movie.clone(),
                    plays: 1,
                }),
            }
        }

        for episode in &items.episodes {
            if let Some((show_id, season, number)) = state.locate(episode) {
                *state
                    .watched_episodes
                    .entry(show_id)
                    .or_default()
                    .entry(season)
                    .or_default()
                    .entry(number)
                    .or_default() += 1;
            }
        }
        Ok(())
    }

    async fn remove_from_collection(&self, items: &SyncItems) -> Result<()> {
        self.record(Call::RemoveFromCollection(items.clone()));
        let mut state = lock(&self.state);

        state
            .collected_movies
            .retain(|m| !items.movies.iter().any(|r| r.ids.trakt == m.ids.trakt));

        for episode in &items.episodes {
            if let Some((show_id, season, number)) = state.locate(episode) {
                if let Some(seasons) = state.collected_episodes.get_mut(&show_id) {
                    if let Some(episodes) = seasons.get_mut(&season) {
                        episodes.remove(&number);
                    }
                    seasons.retain(|_, e| !e.is_empty());
                }
            }
        }
        state.collected_episodes.retain(|_, s| !s.is_empty());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Remote show tree with `count` episodes per listed season.
///
/// Episode remote ids are `show_id * 1000 + season * 100 + number`; the show's
/// tvdb id equals its remote id.
pub fn sample_tree(show_id: u64, title: &str, seasons: &[(u32, u32)]) -> ShowWithSeasons {
    ShowWithSeasons {
        show: remote_show(show_id, title),
        seasons: seasons
            .iter()
            .map(|(season, count)| RemoteSeason {
                number: *season,
                ids: RemoteIds::default(),
                episodes: (1..=*count)
                    .map(|number| RemoteEpisode {
                        season: *season,
                        number,
                        title: Some(format!("S{:02}E{:02}", season, number)),
                        ids: RemoteIds::trakt(show_id * 1000 + u64::from(*season) * 100 + u64::from(number)),
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn remote_show(show_id: u64, title: &str) -> RemoteShow {
    RemoteShow {
        title: title.to_string(),
        year: None,
        ids: RemoteIds::trakt(show_id).with_tvdb(show_id as u32),
    }
}

pub fn remote_movie(trakt: u64, imdb: &str) -> RemoteMovie {
    RemoteMovie {
        title: format!("Movie {}", imdb),
        year: Some(2000),
        ids: RemoteIds::trakt(trakt).with_imdb(imdb),
    }
}

/// Local movie matched through the imdb agent
pub fn local_movie(key: &str, imdb: &str, view_count: u32) -> LocalMovie {
    LocalMovie {
        id: key.to_string(),
        title: format!("Movie {}", imdb),
        year: Some(2000),
        external: ExternalRef::new(ExternalProvider::Imdb, imdb),
        view_count,
    }
}

/// Local show matched through the tvdb agent. `seasons` lists, per season number,
/// the view count of episodes 1..=n.
pub fn local_show(key: &str, tvdb: u32, seasons: &[(u32, &[u32])]) -> LocalShow {
    LocalShow {
        id: key.to_string(),
        title: format!("Show {}", tvdb),
        year: None,
        external: ExternalRef::new(ExternalProvider::TheTvdb, tvdb.to_string()),
        seasons: seasons
            .iter()
            .map(|(season, views)| LocalSeason {
                id: format!("{}-{}", key, season),
                number: *season,
                episodes: views
                    .iter()
                    .enumerate()
                    .map(|(i, view_count)| LocalEpisode {
                        id: local_episode_id(key, *season, i as u32 + 1),
                        number: i as u32 + 1,
                        view_count: *view_count,
                    })
                    .collect(),
            })
            .collect(),
    }
}

pub fn local_episode_id(show_key: &str, season: u32, episode: u32) -> String {
    format!("{}-{}-{}", show_key, season, episode)
}
