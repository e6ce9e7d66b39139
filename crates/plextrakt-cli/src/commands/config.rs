use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_sync_config::{Config, PathManager};
use media_sync_models::{ExternalProvider, SearchIdKind};
use owo_colors::OwoColorize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

pub fn run_config(cmd: ConfigCommands, config_path: &Path, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(config_path, full, output),
        ConfigCommands::Init { force } => init_config(config_path, force, output),
    }
}

/// Container deployments set `PLEXTRAKT_BASE_PATH`; everyone else gets the per-user directory.
pub fn path_manager() -> Result<PathManager> {
    if std::env::var_os("PLEXTRAKT_BASE_PATH").is_some() {
        return Ok(PathManager::from_docker_env());
    }
    PathManager::new().map_err(|e| eyre!("{}", e))
}

pub fn load_config(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        return Err(eyre!(
            "Configuration file not found at {}. Run 'plextrakt config init' to create one.",
            config_path.display()
        ));
    }
    Config::load_from_file(config_path)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_path.display(), e))
}

fn init_config(config_path: &Path, force: bool, output: &Output) -> Result<()> {
    if config_path.exists() && !force {
        output.warn(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        ));
        return Ok(());
    }

    Config::template()
        .save_to_file(config_path)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_path.display(), e))?;

    output.success(format!("Configuration template written to {}", config_path.display()));
    output.info("Fill in the Plex token and the Trakt client id and access token before syncing.");
    Ok(())
}

fn show_config(config_path: &Path, full: bool, output: &Output) -> Result<()> {
    let config = load_config(config_path)?;
    let secret = |s: &str| if full { s.to_string() } else { mask_string(s) };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("{} {}", "Config file:".bold(), config_path.display());

            print_section_header("Plex");
            print_row("Server URL", &config.plex.server_url);
            print_row("Token", &secret(&config.plex.token));
            print_row("Client ID", &config.plex.client_id);

            print_section_header("Trakt");
            print_row("Client ID", &secret(&config.trakt.client_id));
            print_row("Access token", &secret(&config.trakt.access_token));

            print_section_header("Sync");
            print_row("Movies", &check_mark(config.sync.movies));
            print_row("TV shows", &check_mark(config.sync.shows));
            print_row("Batch limit", &config.sync.batch_limit.to_string());
            print_row("Remove from collection", &check_mark(config.sync.remove_from_collection));
            print_row("Mutation delay", &format!("{} ms", config.sync.mutation_delay_ms));

            print_section_header("Providers");
            print_row("Movie search", &describe_search(&config.providers.movie_search));
            print_row("Show search", &describe_search(&config.providers.show_search));
            let mut unsupported: Vec<&str> = config
                .providers
                .unsupported_shows
                .iter()
                .map(ExternalProvider::as_str)
                .collect();
            unsupported.sort_unstable();
            print_row("Unsupported shows", &unsupported.join(", "));
            println!();
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_path.display().to_string(),
                "plex": {
                    "server_url": config.plex.server_url,
                    "token": secret(&config.plex.token),
                    "client_id": config.plex.client_id,
                },
                "trakt": {
                    "client_id": secret(&config.trakt.client_id),
                    "access_token": secret(&config.trakt.access_token),
                },
                "sync": config.sync,
                "providers": config.providers,
            }));
        }
    }

    if let Err(e) = config.validate() {
        output.warn(format!("Configuration is incomplete: {}", e));
    }
    Ok(())
}

fn describe_search(map: &HashMap<ExternalProvider, SearchIdKind>) -> String {
    let mut entries: Vec<String> = map
        .iter()
        .map(|(provider, kind)| format!("{} → {}", provider, kind.as_str()))
        .collect();
    entries.sort();
    entries.join(", ")
}

fn check_mark(enabled: bool) -> String {
    if enabled {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

fn print_section_header(title: &str) {
    println!();
    println!("{}", title.bold().bright_cyan());
    println!("{}", "─".repeat(title.len()).bright_cyan());
}

fn print_row(label: &str, value: &str) {
    println!("  {:<24} {}", label, value);
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s.starts_with("YOUR_") {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    format!("{}***{}", &s[..2], &s[s.len() - 2..])
}
