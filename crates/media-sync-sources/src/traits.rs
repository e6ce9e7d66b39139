use crate::error::Result;
use async_trait::async_trait;
use media_sync_models::{
    CollectedShow, LocalMovie, LocalSeason, LocalShow, RemoteEpisode, RemoteMovie,
    RemoteSeason, RemoteShow, SearchHit, SearchIdKind, SyncItems, WatchedMovie, WatchedShow,
};

/// The personal media library being mirrored.
#[async_trait]
pub trait LocalCatalog: Send + Sync {
    async fn fetch_movies(&self) -> Result<Vec<LocalMovie>>;

    /// Shows come back without seasons; call `populate_seasons` before walking them.
    async fn fetch_shows(&self) -> Result<Vec<LocalShow>>;

    /// Fill `show.seasons`. Episodes are loaded separately per season.
    async fn populate_seasons(&self, show: &mut LocalShow) -> Result<()>;

    async fn populate_episodes(&self, season: &mut LocalSeason) -> Result<()>;

    /// Record one play of the item with the given local id.
    async fn mark_watched(&self, local_id: &str) -> Result<()>;
}

/// The remote tracking service that receives collection and history updates.
#[async_trait]
pub trait RemoteTracker: Send + Sync {
    async fn fetch_collected_movies(&self) -> Result<Vec<RemoteMovie>>;
    async fn fetch_watched_movies(&self) -> Result<Vec<WatchedMovie>>;
    async fn fetch_collected_shows(&self) -> Result<Vec<CollectedShow>>;
    async fn fetch_watched_shows(&self) -> Result<Vec<WatchedShow>>;

    async fn search_by_external_id(&self, kind: SearchIdKind, id: &str) -> Result<Vec<SearchHit>>;

    async fn fetch_show(&self, show_id: u64) -> Result<RemoteShow>;

    /// Every season of a show with its episodes.
    async fn fetch_seasons(&self, show_id: u64) -> Result<Vec<RemoteSeason>>;

    /// Episodes of one season.
    async fn fetch_season(&self, show_id: u64, season: u32) -> Result<Vec<RemoteEpisode>>;

    async fn fetch_episode(&self, show_id: u64, season: u32, episode: u32) -> Result<RemoteEpisode>;

    async fn add_to_collection(&self, items: &SyncItems) -> Result<()>;
    async fn add_watched_history(&self, items: &SyncItems) -> Result<()>;
    async fn remove_from_collection(&self, items: &SyncItems) -> Result<()>;
}
