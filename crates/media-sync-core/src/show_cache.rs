use crate::progress::ProgressReporter;
use media_sync_models::{RemoteEpisode, ShowWithSeasons, SyncProcess};
use media_sync_sources::{RemoteTracker, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

type ShowSlot = Arc<OnceCell<Arc<ShowWithSeasons>>>;

/// Per-run cache of full remote show trees, keyed by the tracker's show id.
///
/// Each id gets its own once-cell so concurrent lookups of the same show share a
/// single population. A failed population leaves the cell empty and the next lookup
/// tries again.
#[derive(Default)]
pub struct RemoteShowCache {
    entries: Mutex<HashMap<u64, ShowSlot>>,
}

impl RemoteShowCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, show_id: u64) -> ShowSlot {
        let mut entries = self.entries.lock().await;
        entries.entry(show_id).or_default().clone()
    }

    pub async fn get_show(
        &self,
        remote: &dyn RemoteTracker,
        progress: &ProgressReporter,
        show_id: u64,
    ) -> Option<Arc<ShowWithSeasons>> {
        let slot = self.slot(show_id).await;
        let result = slot
            .get_or_try_init(|| async {
                debug!(show_id, "Populating remote show cache");
                let show = remote.fetch_show(show_id).await?;
                let seasons = remote.fetch_seasons(show_id).await?;
                Ok::<_, SourceError>(Arc::new(ShowWithSeasons { show, seasons }))
            })
            .await;

        match result {
            Ok(tree) => Some(Arc::clone(tree)),
            Err(e) => {
                warn!(show_id, error = %e, "Failed to load remote show");
                progress.message(
                    SyncProcess::TvShows,
                    format!("Problem querying show {}: {}", show_id, e),
                );
                None
            }
        }
    }

    /// Resolve one episode through the cached show tree.
    pub async fn find_episode(
        &self,
        remote: &dyn RemoteTracker,
        progress: &ProgressReporter,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Option<RemoteEpisode> {
        let tree = self.get_show(remote, progress, show_id).await?;
        tree.episode(season, episode).cloned()
    }

    /// Number of shows currently populated
    pub async fn len(&self) -> usize {
        self.entries
            .lock()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
