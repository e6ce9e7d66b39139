use crate::error::Result;
use crate::trakt::api::{
    SyncPayload, TraktCollectedMovie, TraktCollectedShow, TraktEpisode, TraktHttpClient,
    TraktSearchResult, TraktSeason, TraktShow, TraktWatchedMovie, TraktWatchedShow,
};
use crate::traits::RemoteTracker;
use async_trait::async_trait;
use chrono::Utc;
use media_sync_config::TraktConfig;
use media_sync_models::{
    CollectedShow, RemoteEpisode, RemoteMovie, RemoteSeason, RemoteShow, SearchHit, SearchIdKind,
    SyncItems, WatchedMovie, WatchedShow,
};
use reqwest::Client;
use tracing::{debug, info};

/// Trakt as the remote tracker. Uses an already-issued access token.
pub struct TraktClient {
    api: TraktHttpClient,
}

impl TraktClient {
    pub fn new(client_id: &str, access_token: &str) -> Self {
        let client = Client::builder()
            .user_agent(concat!("plextrakt/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api: TraktHttpClient::new(client, access_token, client_id),
        }
    }

    pub fn from_config(config: &TraktConfig) -> Self {
        Self::new(&config.client_id, &config.access_token)
    }
}

#[async_trait]
impl RemoteTracker for TraktClient {
    async fn fetch_collected_movies(&self) -> Result<Vec<RemoteMovie>> {
        let items: Vec<TraktCollectedMovie> = self.api.get("/sync/collection/movies").await?;
        info!(count = items.len(), "Trakt: Fetched collected movies");
        Ok(items.into_iter().map(|item| item.movie.into()).collect())
    }

    async fn fetch_watched_movies(&self) -> Result<Vec<WatchedMovie>> {
        let items: Vec<TraktWatchedMovie> = self.api.get("/sync/watched/movies").await?;
        info!(count = items.len(), "Trakt: Fetched watched movies");
        Ok(items.into_iter().map(Into::into).collect())
    }

    async fn fetch_collected_shows(&self) -> Result<Vec<CollectedShow>> {
        let items: Vec<TraktCollectedShow> = self.api.get("/sync/collection/shows").await?;
        info!(count = items.len(), "Trakt: Fetched collected shows");
        Ok(items.into_iter().map(Into::into).collect())
    }

    async fn fetch_watched_shows(&self) -> Result<Vec<WatchedShow>> {
        let items: Vec<TraktWatchedShow> = self.api.get("/sync/watched/shows").await?;
        info!(count = items.len(), "Trakt: Fetched watched shows");
        Ok(items.into_iter().map(Into::into).collect())
    }

    async fn search_by_external_id(&self, kind: SearchIdKind, id: &str) -> Result<Vec<SearchHit>> {
        let path = format!("/search/{}/{}", kind.as_str(), urlencoding::encode(id));
        let results: Vec<TraktSearchResult> = self.api.get(&path).await?;
        let hits: Vec<SearchHit> = results
            .into_iter()
            .filter_map(TraktSearchResult::into_hit)
            .collect();
        debug!(kind = %kind, id = %id, hits = hits.len(), "Trakt: Search by id");
        Ok(hits)
    }

    async fn fetch_show(&self, show_id: u64) -> Result<RemoteShow> {
        let show: TraktShow = self.api.get(&format!("/shows/{}", show_id)).await?;
        Ok(show.into())
    }

    async fn fetch_seasons(&self, show_id: u64) -> Result<Vec<RemoteSeason>> {
        let seasons: Vec<TraktSeason> = self
            .api
            .get(&format!("/shows/{}/seasons?extended=episodes", show_id))
            .await?;
        Ok(seasons.into_iter().map(Into::into).collect())
    }

    async fn fetch_season(&self, show_id: u64, season: u32) -> Result<Vec<RemoteEpisode>> {
        let episodes: Vec<TraktEpisode> = self
            .api
            .get(&format!("/shows/{}/seasons/{}", show_id, season))
            .await?;
        Ok(episodes.into_iter().map(Into::into).collect())
    }

    async fn fetch_episode(&self, show_id: u64, season: u32, episode: u32) -> Result<RemoteEpisode> {
        let episode: TraktEpisode = self
            .api
            .get(&format!("/shows/{}/seasons/{}/episodes/{}", show_id, season, episode))
            .await?;
        Ok(episode.into())
    }

    async fn add_to_collection(&self, items: &SyncItems) -> Result<()> {
        self.api
            .post_sync("/sync/collection", &SyncPayload::new(items, None))
            .await?;
        debug!(count = items.len(), "Trakt: Added to collection");
        Ok(())
    }

    async fn add_watched_history(&self, items: &SyncItems) -> Result<()> {
        self.api
            .post_sync("/sync/history", &SyncPayload::new(items, Some(Utc::now())))
            .await?;
        debug!(count = items.len(), "Trakt: Added to watch history");
        Ok(())
    }

    async fn remove_from_collection(&self, items: &SyncItems) -> Result<()> {
        self.api
            .post_sync("/sync/collection/remove", &SyncPayload::new(items, None))
            .await?;
        debug!(count = items.len(), "Trakt: Removed from collection");
        Ok(())
    }
}
