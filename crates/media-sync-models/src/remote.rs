use serde::{Deserialize, Serialize};

/// Identifiers the tracker attaches to every movie, show, season and episode.
///
/// `trakt` is the tracker's own primary key; the others are cross-references
/// into external metadata providers and may each be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteIds {
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

impl RemoteIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trakt(id: u64) -> Self {
        Self {
            trakt: Some(id),
            ..Self::default()
        }
    }

    pub fn with_imdb(mut self, imdb: impl Into<String>) -> Self {
        self.imdb = Some(imdb.into());
        self
    }

    pub fn with_tmdb(mut self, tmdb: u32) -> Self {
        self.tmdb = Some(tmdb);
        self
    }

    pub fn with_tvdb(mut self, tvdb: u32) -> Self {
        self.tvdb = Some(tvdb);
        self
    }

    pub fn with_tvrage(mut self, tvrage: u32) -> Self {
        self.tvrage = Some(tvrage);
        self
    }

    /// True if at least one identifier is present. Empty strings don't count.
    pub fn has_any_id(&self) -> bool {
        self.trakt.is_some()
            || self.slug.as_deref().is_some_and(|s| !s.is_empty())
            || self.imdb.as_deref().is_some_and(|s| !s.is_empty())
            || self.tmdb.is_some()
            || self.tvdb.is_some()
            || self.tvrage.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMovie {
    pub title: String,
    pub year: Option<u32>,
    pub ids: RemoteIds,
}

/// Entry of the tracker's watched-movies list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedMovie {
    pub movie: RemoteMovie,
    pub plays: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteShow {
    pub title: String,
    pub year: Option<u32>,
    pub ids: RemoteIds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEpisode {
    pub season: u32,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    pub ids: RemoteIds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSeason {
    pub number: u32,
    #[serde(default)]
    pub ids: RemoteIds,
    #[serde(default)]
    pub episodes: Vec<RemoteEpisode>,
}

impl RemoteSeason {
    pub fn episode(&self, number: u32) -> Option<&RemoteEpisode> {
        self.episodes.iter().find(|e| e.number == number)
    }
}

/// Show metadata together with its full season/episode tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowWithSeasons {
    pub show: RemoteShow,
    pub seasons: Vec<RemoteSeason>,
}

impl ShowWithSeasons {
    pub fn episode(&self, season: u32, episode: u32) -> Option<&RemoteEpisode> {
        self.seasons
            .iter()
            .find(|s| s.number == season)
            .and_then(|s| s.episode(episode))
    }
}

/// Entry of the tracker's collected-shows list: which episodes the user owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedShow {
    pub show: RemoteShow,
    #[serde(default)]
    pub seasons: Vec<CollectedSeason>,
}

impl CollectedShow {
    pub fn season(&self, number: u32) -> Option<&CollectedSeason> {
        self.seasons.iter().find(|s| s.number == number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<CollectedEpisode>,
}

impl CollectedSeason {
    pub fn episode(&self, number: u32) -> Option<&CollectedEpisode> {
        self.episodes.iter().find(|e| e.number == number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectedEpisode {
    pub number: u32,
}

/// Entry of the tracker's watched-shows list: plays per episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedShow {
    pub show: RemoteShow,
    #[serde(default)]
    pub plays: u32,
    #[serde(default)]
    pub seasons: Vec<WatchedSeason>,
}

impl WatchedShow {
    pub fn season(&self, number: u32) -> Option<&WatchedSeason> {
        self.seasons.iter().find(|s| s.number == number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<WatchedEpisode>,
}

impl WatchedSeason {
    pub fn episode(&self, number: u32) -> Option<&WatchedEpisode> {
        self.episodes.iter().find(|e| e.number == number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedEpisode {
    pub number: u32,
    pub plays: u32,
}

/// One result of an id lookup on the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Movie(RemoteMovie),
    Show(RemoteShow),
    Episode(RemoteEpisode),
}

impl SearchHit {
    pub fn as_movie(&self) -> Option<&RemoteMovie> {
        match self {
            SearchHit::Movie(movie) => Some(movie),
            _ => None,
        }
    }

    pub fn as_show(&self) -> Option<&RemoteShow> {
        match self {
            SearchHit::Show(show) => Some(show),
            _ => None,
        }
    }
}
