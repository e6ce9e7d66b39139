// Identity matching between local provider references and remote id sets

use media_sync_models::{ExternalProvider, ExternalRef, RemoteIds};

fn numeric_eq(local: &ExternalRef, remote: Option<u32>) -> bool {
    match (local.numeric_id(), remote) {
        (Some(local_id), Some(remote_id)) => local_id == remote_id,
        _ => false,
    }
}

fn imdb_eq(local: &ExternalRef, remote: Option<&str>) -> bool {
    !local.id.is_empty() && remote == Some(local.id.as_str())
}

/// Does a local movie reference point at this remote movie?
///
/// `themoviedb` (the legacy Plex agent name) is accepted as an alias of `tmdb`.
pub fn matches_movie(local: &ExternalRef, remote: &RemoteIds) -> bool {
    match local.provider {
        ExternalProvider::Imdb => imdb_eq(local, remote.imdb.as_deref()),
        ExternalProvider::Tmdb | ExternalProvider::TheMovieDb => numeric_eq(local, remote.tmdb),
        _ => false,
    }
}

/// Does a local show reference point at this remote show?
///
/// The tracker keeps no `themoviedb` cross-reference for shows, so that agent never
/// matches.
pub fn matches_show(local: &ExternalRef, remote: &RemoteIds) -> bool {
    match local.provider {
        ExternalProvider::Imdb => imdb_eq(local, remote.imdb.as_deref()),
        ExternalProvider::Tmdb => numeric_eq(local, remote.tmdb),
        ExternalProvider::TheTvdb => numeric_eq(local, remote.tvdb),
        ExternalProvider::TvRage => numeric_eq(local, remote.tvrage),
        _ => false,
    }
}

/// Compare two records that both come from the tracker, by its own primary key.
pub fn matches_remote(a: &RemoteIds, b: &RemoteIds) -> bool {
    a.has_any_id() && b.has_any_id() && a.trakt.is_some() && a.trakt == b.trakt
}
