use crate::external::ExternalRef;
use serde::{Deserialize, Serialize};

/// A movie as seen by the local media server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalMovie {
    /// Opaque server-side key (Plex `ratingKey`)
    pub id: String,
    pub title: String,
    pub year: Option<u32>,
    pub external: ExternalRef,
    pub view_count: u32,
}

impl LocalMovie {
    pub fn is_watched(&self) -> bool {
        self.view_count > 0
    }
}

/// A show as seen by the local media server.
///
/// `seasons` is empty after the library listing and is filled in on demand,
/// since fetching it costs one request per show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalShow {
    pub id: String,
    pub title: String,
    pub year: Option<u32>,
    pub external: ExternalRef,
    #[serde(default)]
    pub seasons: Vec<LocalSeason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSeason {
    pub id: String,
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<LocalEpisode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEpisode {
    pub id: String,
    pub number: u32,
    pub view_count: u32,
}

impl LocalEpisode {
    pub fn is_watched(&self) -> bool {
        self.view_count > 0
    }
}
