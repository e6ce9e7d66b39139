use crate::error::Result;
use crate::plex::api::{PlexHttpClient, PlexMetadata};
use crate::plex::guid::{select_external_ref, MOVIE_GUID_PREFERENCE, SHOW_GUID_PREFERENCE};
use crate::traits::LocalCatalog;
use async_trait::async_trait;
use media_sync_config::PlexConfig;
use media_sync_models::{LocalEpisode, LocalMovie, LocalSeason, LocalShow};
use tracing::{debug, info};

/// Plex media server as the local catalog.
pub struct PlexClient {
    api: PlexHttpClient,
}

impl PlexClient {
    pub fn new(server_url: &str, token: &str, client_id: &str) -> Result<Self> {
        Ok(Self {
            api: PlexHttpClient::new(server_url, token, client_id)?,
        })
    }

    pub fn from_config(config: &PlexConfig) -> Result<Self> {
        Self::new(&config.server_url, &config.token, &config.client_id)
    }

    async fn items_of_type(&self, section_type: &str) -> Result<Vec<PlexMetadata>> {
        let mut items = Vec::new();
        for section in self.api.get_sections().await? {
            if section.type_ != section_type {
                continue;
            }
            let section_items = self.api.get_section_items(&section.key).await?;
            debug!(
                section = %section.title,
                count = section_items.len(),
                "Plex: Loaded library section"
            );
            items.extend(section_items);
        }
        Ok(items)
    }
}

fn to_local_movie(item: PlexMetadata) -> LocalMovie {
    let external = select_external_ref(
        item.guid.as_deref(),
        item.guids.iter().map(|g| g.id.as_str()),
        &MOVIE_GUID_PREFERENCE,
    );
    LocalMovie {
        id: item.rating_key,
        title: item.title,
        year: item.year,
        external,
        view_count: item.view_count,
    }
}

fn to_local_show(item: PlexMetadata) -> LocalShow {
    let external = select_external_ref(
        item.guid.as_deref(),
        item.guids.iter().map(|g| g.id.as_str()),
        &SHOW_GUID_PREFERENCE,
    );
    LocalShow {
        id: item.rating_key,
        title: item.title,
        year: item.year,
        external,
        seasons: Vec::new(),
    }
}

#[async_trait]
impl LocalCatalog for PlexClient {
    async fn fetch_movies(&self) -> Result<Vec<LocalMovie>> {
        let movies: Vec<LocalMovie> = self
            .items_of_type("movie")
            .await?
            .into_iter()
            .map(to_local_movie)
            .collect();
        info!(count = movies.len(), "Plex: Fetched movies");
        Ok(movies)
    }

    async fn fetch_shows(&self) -> Result<Vec<LocalShow>> {
        let shows: Vec<LocalShow> = self
            .items_of_type("show")
            .await?
            .into_iter()
            .map(to_local_show)
            .collect();
        info!(count = shows.len(), "Plex: Fetched shows");
        Ok(shows)
    }

    async fn populate_seasons(&self, show: &mut LocalShow) -> Result<()> {
        let mut seasons = Vec::new();
        for child in self.api.get_children(&show.id).await? {
            // Only real seasons carry an index
            let Some(number) = child.index else { continue };
            seasons.push(LocalSeason {
                id: child.rating_key,
                number,
                episodes: Vec::new(),
            });
        }
        show.seasons = seasons;
        Ok(())
    }

    async fn populate_episodes(&self, season: &mut LocalSeason) -> Result<()> {
        season.episodes = self
            .api
            .get_children(&season.id)
            .await?
            .into_iter()
            .filter_map(|child| {
                Some(LocalEpisode {
                    number: child.index?,
                    id: child.rating_key,
                    view_count: child.view_count,
                })
            })
            .collect();
        Ok(())
    }

    async fn mark_watched(&self, local_id: &str) -> Result<()> {
        self.api.scrobble(local_id).await?;
        debug!(rating_key = %local_id, "Plex: Marked as watched");
        Ok(())
    }
}
