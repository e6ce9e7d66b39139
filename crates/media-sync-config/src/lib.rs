pub mod config;
pub mod paths;

pub use config::{Config, PlexConfig, ProviderSupport, SyncOptions, TraktConfig, default_movie_search, default_show_search, default_unsupported_shows};
pub use paths::{PathManager, container_base_path};
