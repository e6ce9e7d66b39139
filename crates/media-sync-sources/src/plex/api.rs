use crate::error::{check_status, Result, SourceError};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const SCROBBLE_IDENTIFIER: &str = "com.plexapp.plugins.library";

#[derive(Debug, Clone, Deserialize)]
pub struct LibrarySection {
    pub key: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlexGuid {
    pub id: String,
}

/// One entry of a `Metadata` list: a movie, show, season or episode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexMetadata {
    pub rating_key: String,
    #[serde(default)]
    pub title: String,
    pub year: Option<u32>,
    /// Season or episode number
    pub index: Option<u32>,
    /// Legacy agent guid, or a `plex://` guid on modern agents
    pub guid: Option<String>,
    #[serde(rename = "Guid", default)]
    pub guids: Vec<PlexGuid>,
    #[serde(default)]
    pub view_count: u32,
}

#[derive(Debug, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<PlexMetadata>,
    #[serde(rename = "Directory", default)]
    directory: Vec<LibrarySection>,
}

#[derive(Debug, Deserialize)]
struct PlexResponse {
    #[serde(rename = "MediaContainer")]
    media_container: MediaContainer,
}

pub struct PlexHttpClient {
    client: Client,
    server_url: String,
}

impl PlexHttpClient {
    pub fn new(server_url: &str, token: &str, client_id: &str) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::HeaderName::from_static("x-plex-token"),
            reqwest::header::HeaderValue::from_str(token)
                .map_err(|_| SourceError::InvalidConfig("Invalid Plex token format".to_string()))?,
        );
        headers.insert(
            reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
            reqwest::header::HeaderValue::from_str(client_id)
                .map_err(|_| SourceError::InvalidConfig("Invalid Plex client id".to_string()))?,
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_container(&self, path: &str) -> Result<MediaContainer> {
        let url = format!("{}{}", self.server_url, path);
        debug!(url = %url, "Plex request");
        let response = check_status(self.client.get(&url).send().await?).await?;
        let body = response.text().await?;
        let parsed: PlexResponse = serde_json::from_str(&body)?;
        Ok(parsed.media_container)
    }

    pub async fn get_sections(&self) -> Result<Vec<LibrarySection>> {
        Ok(self.get_container("/library/sections").await?.directory)
    }

    pub async fn get_section_items(&self, section_key: &str) -> Result<Vec<PlexMetadata>> {
        let path = format!("/library/sections/{}/all?includeGuids=1", urlencoding::encode(section_key));
        Ok(self.get_container(&path).await?.metadata)
    }

    /// Seasons of a show, or episodes of a season.
    pub async fn get_children(&self, rating_key: &str) -> Result<Vec<PlexMetadata>> {
        let path = format!("/library/metadata/{}/children", urlencoding::encode(rating_key));
        Ok(self.get_container(&path).await?.metadata)
    }

    pub async fn scrobble(&self, rating_key: &str) -> Result<()> {
        let url = format!(
            "{}/:/scrobble?identifier={}&key={}",
            self.server_url,
            SCROBBLE_IDENTIFIER,
            urlencoding::encode(rating_key)
        );
        check_status(self.client.get(&url).send().await?).await?;
        Ok(())
    }
}
