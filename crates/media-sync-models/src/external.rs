use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata agent a local item was matched with on the media server.
///
/// The name is what the server embeds in the item guid
/// (`com.plexapp.agents.imdb://tt0111161?lang=en` → `imdb`). Unknown agents are
/// kept verbatim so they can be reported, but never match anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExternalProvider {
    Imdb,
    Tmdb,
    TheMovieDb,
    TheTvdb,
    TvRage,
    Other(String),
}

impl ExternalProvider {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "imdb" => ExternalProvider::Imdb,
            "tmdb" => ExternalProvider::Tmdb,
            "themoviedb" => ExternalProvider::TheMovieDb,
            "thetvdb" | "tvdb" => ExternalProvider::TheTvdb,
            "tvrage" => ExternalProvider::TvRage,
            other => ExternalProvider::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExternalProvider::Imdb => "imdb",
            ExternalProvider::Tmdb => "tmdb",
            ExternalProvider::TheMovieDb => "themoviedb",
            ExternalProvider::TheTvdb => "thetvdb",
            ExternalProvider::TvRage => "tvrage",
            ExternalProvider::Other(name) => name,
        }
    }
}

impl From<String> for ExternalProvider {
    fn from(value: String) -> Self {
        ExternalProvider::parse(&value)
    }
}

impl From<&str> for ExternalProvider {
    fn from(value: &str) -> Self {
        ExternalProvider::parse(value)
    }
}

impl From<ExternalProvider> for String {
    fn from(value: ExternalProvider) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ExternalProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-reference of a local item into an external metadata provider (the match key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalRef {
    pub provider: ExternalProvider,
    pub id: String,
}

impl ExternalRef {
    pub fn new(provider: impl Into<ExternalProvider>, id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            id: id.into(),
        }
    }

    /// Reference for items whose guid could not be parsed at all.
    pub fn unknown() -> Self {
        Self {
            provider: ExternalProvider::Other(String::new()),
            id: String::new(),
        }
    }

    /// The id as an unsigned number, for providers with numeric ids.
    pub fn numeric_id(&self) -> Option<u32> {
        self.id.trim().parse().ok()
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.provider, self.id)
    }
}

/// Id types the tracker can look items up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIdKind {
    Imdb,
    Tmdb,
    Tvdb,
}

impl SearchIdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIdKind::Imdb => "imdb",
            SearchIdKind::Tmdb => "tmdb",
            SearchIdKind::Tvdb => "tvdb",
        }
    }
}

impl fmt::Display for SearchIdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
