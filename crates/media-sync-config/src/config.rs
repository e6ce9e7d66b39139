use media_sync_models::{ExternalProvider, SearchIdKind};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub plex: PlexConfig,
    pub trakt: TraktConfig,
    #[serde(default)]
    pub sync: SyncOptions,
    #[serde(default)]
    pub providers: ProviderSupport,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlexConfig {
    pub server_url: String,
    pub token: String,
    #[serde(default = "default_plex_client_id")]
    pub client_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TraktConfig {
    pub client_id: String,
    /// Already-issued OAuth access token
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SyncOptions {
    #[serde(default = "default_true")]
    pub movies: bool,
    #[serde(default = "default_true")]
    pub shows: bool,
    /// Number of items reconciled concurrently; the next batch waits for the whole
    /// previous one.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    /// Actually remove remote collection entries with no local counterpart.
    /// When false they are only reported.
    #[serde(default)]
    pub remove_from_collection: bool,
    /// Pause after each remote mutation call
    #[serde(default = "default_mutation_delay_ms")]
    pub mutation_delay_ms: u64,
}

impl SyncOptions {
    pub fn mutation_delay(&self) -> Duration {
        Duration::from_millis(self.mutation_delay_ms)
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            movies: true,
            shows: true,
            batch_limit: default_batch_limit(),
            remove_from_collection: false,
            mutation_delay_ms: default_mutation_delay_ms(),
        }
    }
}

/// Which local metadata agents the tracker can cross-reference.
///
/// The tracker's capabilities change over time, so this is data rather than code.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderSupport {
    /// Agent → id kind used to look up a movie missing from the collection
    #[serde(default = "default_movie_search")]
    pub movie_search: HashMap<ExternalProvider, SearchIdKind>,
    /// Agent → id kind used to look up a show missing from the collection
    #[serde(default = "default_show_search")]
    pub show_search: HashMap<ExternalProvider, SearchIdKind>,
    /// Agents whose shows are skipped entirely
    #[serde(default = "default_unsupported_shows")]
    pub unsupported_shows: HashSet<ExternalProvider>,
}

impl ProviderSupport {
    pub fn movie_search_kind(&self, provider: &ExternalProvider) -> Option<SearchIdKind> {
        self.movie_search.get(provider).copied()
    }

    pub fn show_search_kind(&self, provider: &ExternalProvider) -> Option<SearchIdKind> {
        self.show_search.get(provider).copied()
    }

    pub fn is_show_supported(&self, provider: &ExternalProvider) -> bool {
        !self.unsupported_shows.contains(provider)
    }
}

impl Default for ProviderSupport {
    fn default() -> Self {
        Self {
            movie_search: default_movie_search(),
            show_search: default_show_search(),
            unsupported_shows: default_unsupported_shows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_batch_limit() -> usize {
    2
}

fn default_mutation_delay_ms() -> u64 {
    250
}

fn default_plex_client_id() -> String {
    "plextrakt-cli".to_string()
}

pub fn default_movie_search() -> HashMap<ExternalProvider, SearchIdKind> {
    let mut map = HashMap::new();
    map.insert(ExternalProvider::Imdb, SearchIdKind::Imdb);
    map.insert(ExternalProvider::TheMovieDb, SearchIdKind::Tmdb);
    map
}

pub fn default_show_search() -> HashMap<ExternalProvider, SearchIdKind> {
    let mut map = HashMap::new();
    map.insert(ExternalProvider::TheTvdb, SearchIdKind::Tvdb);
    map
}

pub fn default_unsupported_shows() -> HashSet<ExternalProvider> {
    // The tracker keeps no TheMovieDb cross-reference for shows
    HashSet::from([ExternalProvider::TheMovieDb])
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.plex.server_url.is_empty() {
            return Err(anyhow::anyhow!("plex.server_url is not configured"));
        }
        if !self.plex.server_url.starts_with("http://") && !self.plex.server_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "plex.server_url must start with http:// or https:// (got '{}')",
                self.plex.server_url
            ));
        }
        if self.plex.token.is_empty() || self.plex.token == "YOUR_PLEX_TOKEN" {
            return Err(anyhow::anyhow!("plex.token is not configured"));
        }
        if self.trakt.client_id.is_empty() || self.trakt.client_id == "YOUR_CLIENT_ID" {
            return Err(anyhow::anyhow!("trakt.client_id is not configured"));
        }
        if self.trakt.access_token.is_empty() || self.trakt.access_token == "YOUR_ACCESS_TOKEN" {
            return Err(anyhow::anyhow!("trakt.access_token is not configured"));
        }
        if self.sync.batch_limit == 0 {
            return Err(anyhow::anyhow!("sync.batch_limit must be at least 1"));
        }
        Ok(())
    }

    /// Template written by `config init`
    pub fn template() -> Self {
        Self {
            plex: PlexConfig {
                server_url: "http://127.0.0.1:32400".to_string(),
                token: "YOUR_PLEX_TOKEN".to_string(),
                client_id: default_plex_client_id(),
            },
            trakt: TraktConfig {
                client_id: "YOUR_CLIENT_ID".to_string(),
                access_token: "YOUR_ACCESS_TOKEN".to_string(),
            },
            sync: SyncOptions::default(),
            providers: ProviderSupport::default(),
        }
    }
}
