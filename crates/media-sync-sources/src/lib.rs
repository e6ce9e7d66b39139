pub mod error;
pub mod plex;
pub mod traits;
pub mod trakt;

pub use error::SourceError;
pub use plex::PlexClient;
pub use traits::{LocalCatalog, RemoteTracker};
pub use trakt::TraktClient;
