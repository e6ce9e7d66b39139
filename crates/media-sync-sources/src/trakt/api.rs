use crate::error::{check_status, Result};
use chrono::{DateTime, Utc};
use media_sync_models::{
    CollectedEpisode, CollectedSeason, CollectedShow, RemoteEpisode, RemoteIds, RemoteMovie,
    RemoteSeason, RemoteShow, SearchHit, SyncItems, WatchedEpisode, WatchedMovie, WatchedSeason,
    WatchedShow,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TRAKT_API_URL: &str = "https://api.trakt.tv";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktIds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvrage: Option<u32>,
}

/// Remove slashes from IMDB ID (Trakt sometimes includes them)
fn remove_slashes(s: String) -> String {
    s.replace('/', "")
}

impl From<TraktIds> for RemoteIds {
    fn from(ids: TraktIds) -> Self {
        RemoteIds {
            trakt: ids.trakt,
            slug: ids.slug,
            imdb: ids.imdb.map(remove_slashes),
            tmdb: ids.tmdb,
            tvdb: ids.tvdb,
            tvrage: ids.tvrage,
        }
    }
}

impl From<&RemoteIds> for TraktIds {
    fn from(ids: &RemoteIds) -> Self {
        TraktIds {
            trakt: ids.trakt,
            slug: ids.slug.clone(),
            imdb: ids.imdb.clone(),
            tmdb: ids.tmdb,
            tvdb: ids.tvdb,
            tvrage: ids.tvrage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktMovie {
    pub title: String,
    pub year: Option<u32>,
    pub ids: TraktIds,
}

impl From<TraktMovie> for RemoteMovie {
    fn from(movie: TraktMovie) -> Self {
        RemoteMovie {
            title: movie.title,
            year: movie.year,
            ids: movie.ids.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktShow {
    pub title: String,
    pub year: Option<u32>,
    pub ids: TraktIds,
}

impl From<TraktShow> for RemoteShow {
    fn from(show: TraktShow) -> Self {
        RemoteShow {
            title: show.title,
            year: show.year,
            ids: show.ids.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktEpisode {
    #[serde(default)]
    pub season: u32,
    #[serde(default)]
    pub number: u32,
    pub title: Option<String>,
    pub ids: TraktIds,
}

impl From<TraktEpisode> for RemoteEpisode {
    fn from(episode: TraktEpisode) -> Self {
        RemoteEpisode {
            season: episode.season,
            number: episode.number,
            title: episode.title,
            ids: episode.ids.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TraktSeason {
    pub number: u32,
    #[serde(default)]
    pub ids: TraktIds,
    #[serde(default)]
    pub episodes: Vec<TraktEpisode>,
}

impl From<TraktSeason> for RemoteSeason {
    fn from(season: TraktSeason) -> Self {
        RemoteSeason {
            number: season.number,
            ids: season.ids.into(),
            episodes: season.episodes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TraktCollectedMovie {
    pub movie: TraktMovie,
}

#[derive(Debug, Deserialize)]
pub struct TraktWatchedMovie {
    #[serde(default)]
    pub plays: u32,
    pub movie: TraktMovie,
}

impl From<TraktWatchedMovie> for WatchedMovie {
    fn from(item: TraktWatchedMovie) -> Self {
        WatchedMovie {
            movie: item.movie.into(),
            plays: item.plays,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TraktNumberedEpisode {
    pub number: u32,
    #[serde(default)]
    pub plays: u32,
}

#[derive(Debug, Deserialize)]
pub struct TraktNumberedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<TraktNumberedEpisode>,
}

#[derive(Debug, Deserialize)]
pub struct TraktCollectedShow {
    pub show: TraktShow,
    #[serde(default)]
    pub seasons: Vec<TraktNumberedSeason>,
}

impl From<TraktCollectedShow> for CollectedShow {
    fn from(item: TraktCollectedShow) -> Self {
        CollectedShow {
            show: item.show.into(),
            seasons: item
                .seasons
                .into_iter()
                .map(|season| CollectedSeason {
                    number: season.number,
                    episodes: season
                        .episodes
                        .into_iter()
                        .map(|e| CollectedEpisode { number: e.number })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TraktWatchedShow {
    #[serde(default)]
    pub plays: u32,
    pub show: TraktShow,
    #[serde(default)]
    pub seasons: Vec<TraktNumberedSeason>,
}

impl From<TraktWatchedShow> for WatchedShow {
    fn from(item: TraktWatchedShow) -> Self {
        WatchedShow {
            show: item.show.into(),
            plays: item.plays,
            seasons: item
                .seasons
                .into_iter()
                .map(|season| WatchedSeason {
                    number: season.number,
                    episodes: season
                        .episodes
                        .into_iter()
                        .map(|e| WatchedEpisode {
                            number: e.number,
                            plays: e.plays,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TraktSearchResult {
    #[serde(rename = "type")]
    pub item_type: String,
    pub movie: Option<TraktMovie>,
    pub show: Option<TraktShow>,
    pub episode: Option<TraktEpisode>,
}

impl TraktSearchResult {
    pub fn into_hit(self) -> Option<SearchHit> {
        match self.item_type.as_str() {
            "movie" => self.movie.map(|m| SearchHit::Movie(m.into())),
            "show" => self.show.map(|s| SearchHit::Show(s.into())),
            "episode" => self.episode.map(|e| SearchHit::Episode(e.into())),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct SyncEntry<T: Serialize> {
    #[serde(flatten)]
    item: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct EpisodeRef {
    ids: TraktIds,
}

/// Body of `/sync/collection`, `/sync/history` and `/sync/collection/remove`.
#[derive(Debug, Serialize)]
pub struct SyncPayload {
    movies: Vec<SyncEntry<TraktMovie>>,
    shows: Vec<SyncEntry<TraktShow>>,
    episodes: Vec<SyncEntry<EpisodeRef>>,
}

impl SyncPayload {
    pub fn new(items: &SyncItems, watched_at: Option<DateTime<Utc>>) -> Self {
        Self {
            movies: items
                .movies
                .iter()
                .map(|m| SyncEntry {
                    item: TraktMovie {
                        title: m.title.clone(),
                        year: m.year,
                        ids: (&m.ids).into(),
                    },
                    watched_at,
                })
                .collect(),
            shows: items
                .shows
                .iter()
                .map(|s| SyncEntry {
                    item: TraktShow {
                        title: s.title.clone(),
                        year: s.year,
                        ids: (&s.ids).into(),
                    },
                    watched_at,
                })
                .collect(),
            episodes: items
                .episodes
                .iter()
                .map(|e| SyncEntry {
                    item: EpisodeRef { ids: (&e.ids).into() },
                    watched_at,
                })
                .collect(),
        }
    }
}

/// Authenticated Trakt API v2 transport.
pub struct TraktHttpClient {
    client: Client,
    base_url: String,
    access_token: String,
    client_id: String,
}

impl TraktHttpClient {
    pub fn new(client: Client, access_token: &str, client_id: &str) -> Self {
        Self {
            client,
            base_url: TRAKT_API_URL.to_string(),
            access_token: access_token.to_string(),
            client_id: client_id.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("trakt-api-version", "2")
            .header("trakt-api-key", &self.client_id)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path = %path, "Trakt GET");
        let response = check_status(self.request(reqwest::Method::GET, path).send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn post_sync(&self, path: &str, payload: &SyncPayload) -> Result<()> {
        debug!(path = %path, "Trakt POST");
        let response = self
            .request(reqwest::Method::POST, path)
            .json(payload)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_watched_shows() {
        let body = r#"[{
            "plays": 3,
            "last_watched_at": "2024-01-01T00:00:00.000Z",
            "show": {"title": "Breaking Bad", "year": 2008,
                     "ids": {"trakt": 1388, "slug": "breaking-bad", "tvdb": 81189, "imdb": "tt0903747", "tmdb": 1396, "tvrage": 18164}},
            "seasons": [{"number": 1, "episodes": [{"number": 1, "plays": 2, "last_watched_at": null}]}]
        }]"#;
        let parsed: Vec<TraktWatchedShow> = serde_json::from_str(body).unwrap();
        let show: WatchedShow = parsed.into_iter().next().unwrap().into();

        assert_eq!(show.show.ids.trakt, Some(1388));
        assert_eq!(show.show.ids.tvrage, Some(18164));
        assert_eq!(show.season(1).and_then(|s| s.episode(1)).map(|e| e.plays), Some(2));
    }

    #[test]
    fn test_imdb_slashes_removed() {
        let ids: RemoteIds = TraktIds {
            imdb: Some("tt0133093/".to_string()),
            ..TraktIds::default()
        }
        .into();
        assert_eq!(ids.imdb.as_deref(), Some("tt0133093"));
    }

    #[test]
    fn test_search_result_into_hit() {
        let body = r#"[
            {"type": "movie", "score": null, "movie": {"title": "The Matrix", "year": 1999, "ids": {"trakt": 481, "imdb": "tt0133093"}}},
            {"type": "person", "score": null, "person": {"name": "Keanu"}}
        ]"#;
        let parsed: Vec<TraktSearchResult> = serde_json::from_str(body).unwrap();
        let hits: Vec<SearchHit> = parsed.into_iter().filter_map(TraktSearchResult::into_hit).collect();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].as_movie().map(|m| m.ids.trakt), Some(Some(481)));
    }

    #[test]
    fn test_sync_payload_shape() {
        let mut items = SyncItems::new();
        items.add_movie(RemoteMovie {
            title: "The Matrix".to_string(),
            year: Some(1999),
            ids: RemoteIds::trakt(481),
        });
        items.add_episode(RemoteEpisode {
            season: 1,
            number: 2,
            title: None,
            ids: RemoteIds::trakt(73482),
        });

        let json = serde_json::to_value(SyncPayload::new(&items, None)).unwrap();
        assert_eq!(json["movies"][0]["ids"]["trakt"], 481);
        assert!(json["movies"][0].get("watched_at").is_none());
        assert!(json["movies"][0]["ids"].get("imdb").is_none());
        assert_eq!(json["episodes"][0]["ids"]["trakt"], 73482);
        assert_eq!(json["shows"].as_array().map(Vec::len), Some(0));
    }
}
