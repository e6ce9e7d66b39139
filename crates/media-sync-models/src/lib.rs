pub mod external;
pub mod local;
pub mod progress;
pub mod remote;
pub mod sync_items;

pub use external::{ExternalProvider, ExternalRef, SearchIdKind};
pub use local::{LocalEpisode, LocalMovie, LocalSeason, LocalShow};
pub use progress::{ProgressDetail, ProgressEvent, ProgressStatus, SyncProcess};
pub use remote::{
    CollectedEpisode, CollectedSeason, CollectedShow, RemoteEpisode, RemoteIds, RemoteMovie,
    RemoteSeason, RemoteShow, SearchHit, ShowWithSeasons, WatchedEpisode, WatchedMovie,
    WatchedSeason, WatchedShow,
};
pub use sync_items::SyncItems;
