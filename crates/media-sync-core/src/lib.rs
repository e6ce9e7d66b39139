pub mod batch;
pub mod context;
pub mod deletion;
pub mod matching;
pub mod progress;
pub mod reconcile;
pub mod show_cache;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{EpisodeKey, ProcessedSet, RunContext};
pub use progress::ProgressReporter;
pub use show_cache::RemoteShowCache;
pub use sync::{SyncAgent, SyncResult};
