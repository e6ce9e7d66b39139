use serde::{Deserialize, Serialize};
use std::fmt;

/// Which reconciliation pass an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncProcess {
    Movies,
    TvShows,
}

impl SyncProcess {
    pub fn id(&self) -> u32 {
        match self {
            SyncProcess::Movies => 1,
            SyncProcess::TvShows => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyncProcess::Movies => "Movies",
            SyncProcess::TvShows => "TV Shows",
        }
    }
}

impl fmt::Display for SyncProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one reconciliation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    /// Both sides agree, nothing to do
    Nothing,
    /// Free-form message, not tied to an item decision
    Message,
    /// State was copied between the two sides
    Sync,
    /// Removed from the remote collection
    Remove,
    /// No matching remote item
    NotFoundRemote,
    /// Matching remote item has no plays
    NotWatchedRemote,
    /// A remote mutation or lookup failed
    ErrorAddRemote,
    /// Play added to remote history
    WatchedRemote,
    /// Work on the item started
    Processing,
    /// Item uses an id the tracker can't cross-reference
    NotSupported,
    /// Added to the remote collection
    AddRemote,
    /// Remote item has no local counterpart
    ShouldRemove,
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Item-kind specific part of a progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProgressDetail {
    Message,
    Movie {
        year: Option<u32>,
    },
    Episode {
        external_id: Option<String>,
        season: Option<u32>,
        episode: Option<u32>,
    },
}

/// One structured status event emitted by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub process: SyncProcess,
    pub item_name: String,
    pub current: usize,
    pub total: usize,
    pub status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub detail: ProgressDetail,
}

impl ProgressEvent {
    pub fn message(process: SyncProcess, text: impl Into<String>) -> Self {
        Self {
            process,
            item_name: String::new(),
            current: 0,
            total: 0,
            status: ProgressStatus::Message,
            message: Some(text.into()),
            detail: ProgressDetail::Message,
        }
    }

    pub fn season(&self) -> Option<u32> {
        match self.detail {
            ProgressDetail::Episode { season, .. } => season,
            _ => None,
        }
    }

    pub fn episode(&self) -> Option<u32> {
        match self.detail {
            ProgressDetail::Episode { episode, .. } => episode,
            _ => None,
        }
    }
}
