use media_sync_models::{ExternalProvider, ExternalRef};

/// Preferred agents when a movie carries several modern guids
pub const MOVIE_GUID_PREFERENCE: [ExternalProvider; 3] = [
    ExternalProvider::Imdb,
    ExternalProvider::Tmdb,
    ExternalProvider::TheTvdb,
];

pub const SHOW_GUID_PREFERENCE: [ExternalProvider; 3] = [
    ExternalProvider::TheTvdb,
    ExternalProvider::Imdb,
    ExternalProvider::Tmdb,
];

/// Parse a Plex guid into a provider reference.
///
/// Handles legacy agent guids such as `com.plexapp.agents.imdb://tt0111161?lang=en`
/// and modern ones such as `tmdb://603`. Plex-internal guids (`plex://movie/…`,
/// `local://…`) carry no cross-reference and yield `None`.
pub fn parse_guid(guid: &str) -> Option<ExternalRef> {
    let (scheme, rest) = guid.trim().split_once("://")?;
    let provider = scheme.rsplit('.').next()?;
    if provider.is_empty() || !provider.chars().all(|c| c.is_ascii_lowercase()) {
        return None;
    }
    if matches!(provider, "plex" | "local" | "none") {
        return None;
    }

    let id = rest.split('?').next().unwrap_or_default();
    if id.is_empty() {
        return None;
    }

    Some(ExternalRef::new(provider, id))
}

/// Pick the reference used to match an item.
///
/// A legacy agent guid wins because it names the agent that actually matched the
/// item. Otherwise the modern guid list is searched in `preference` order, falling
/// back to its first parsable entry.
pub fn select_external_ref<'a>(
    agent_guid: Option<&str>,
    guids: impl IntoIterator<Item = &'a str>,
    preference: &[ExternalProvider],
) -> ExternalRef {
    if let Some(parsed) = agent_guid.and_then(parse_guid) {
        return parsed;
    }

    let parsed: Vec<ExternalRef> = guids.into_iter().filter_map(parse_guid).collect();
    preference
        .iter()
        .find_map(|wanted| parsed.iter().find(|r| &r.provider == wanted))
        .or_else(|| parsed.first())
        .cloned()
        .unwrap_or_else(ExternalRef::unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_agent_guid() {
        let parsed = parse_guid("com.plexapp.agents.imdb://tt0111161?lang=en").unwrap();
        assert_eq!(parsed.provider, ExternalProvider::Imdb);
        assert_eq!(parsed.id, "tt0111161");

        let parsed = parse_guid("com.plexapp.agents.thetvdb://73244?lang=en").unwrap();
        assert_eq!(parsed.provider, ExternalProvider::TheTvdb);
        assert_eq!(parsed.id, "73244");

        let parsed = parse_guid("com.plexapp.agents.themoviedb://1399?lang=en").unwrap();
        assert_eq!(parsed.provider, ExternalProvider::TheMovieDb);
    }

    #[test]
    fn test_parse_modern_guid() {
        let parsed = parse_guid("tvdb://81189").unwrap();
        assert_eq!(parsed.provider, ExternalProvider::TheTvdb);
        assert_eq!(parsed.id, "81189");

        let parsed = parse_guid("tmdb://603").unwrap();
        assert_eq!(parsed.provider, ExternalProvider::Tmdb);
    }

    #[test]
    fn test_parse_rejects_internal_guids() {
        assert!(parse_guid("plex://movie/5d776b5e1e5c36001f8e9b8a").is_none());
        assert!(parse_guid("local://12345").is_none());
        assert!(parse_guid("com.plexapp.agents.none://abc").is_none());
        assert!(parse_guid("imdb://").is_none());
        assert!(parse_guid("not a guid").is_none());
    }

    #[test]
    fn test_select_prefers_agent_guid() {
        let selected = select_external_ref(
            Some("com.plexapp.agents.themoviedb://603?lang=en"),
            ["imdb://tt0133093"],
            &MOVIE_GUID_PREFERENCE,
        );
        assert_eq!(selected.provider, ExternalProvider::TheMovieDb);
        assert_eq!(selected.id, "603");
    }

    #[test]
    fn test_select_uses_preference_order() {
        let guids = ["tmdb://1396", "imdb://tt0903747", "tvdb://81189"];

        let movie = select_external_ref(Some("plex://movie/abc"), guids, &MOVIE_GUID_PREFERENCE);
        assert_eq!(movie.provider, ExternalProvider::Imdb);

        let show = select_external_ref(Some("plex://show/abc"), guids, &SHOW_GUID_PREFERENCE);
        assert_eq!(show.provider, ExternalProvider::TheTvdb);
        assert_eq!(show.id, "81189");
    }

    #[test]
    fn test_select_without_usable_guid() {
        let selected = select_external_ref(None, [], &MOVIE_GUID_PREFERENCE);
        assert_eq!(selected, ExternalRef::unknown());
    }
}
