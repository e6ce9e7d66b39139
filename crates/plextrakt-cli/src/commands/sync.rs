use super::config::load_config;
use super::sync_ui::SyncUI;
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_sync_config::SyncOptions;
use media_sync_core::{ProgressReporter, SyncAgent, SyncResult};
use media_sync_sources::{PlexClient, TraktClient};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Command-line overrides for the `[sync]` section.
#[derive(Debug, Default)]
pub struct SyncFlags {
    pub movies: bool,
    pub shows: bool,
    pub remove_from_collection: bool,
    pub batch_limit: Option<usize>,
}

impl SyncFlags {
    /// Passes named on the command line replace the configured ones; with
    /// neither flag the configuration decides.
    fn apply(&self, options: &mut SyncOptions) {
        if self.movies || self.shows {
            options.movies = self.movies;
            options.shows = self.shows;
        }
        if self.remove_from_collection {
            options.remove_from_collection = true;
        }
        if let Some(limit) = self.batch_limit {
            options.batch_limit = limit;
        }
    }
}

pub async fn run_sync(config_path: &Path, flags: SyncFlags, output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let mut config = load_config(config_path)?;
    flags.apply(&mut config.sync);
    config
        .validate()
        .map_err(|e| eyre!("Configuration validation failed: {}", e))?;

    let local = PlexClient::from_config(&config.plex)
        .map_err(|e| eyre!("Failed to create Plex client: {}", e))?;
    let remote = TraktClient::from_config(&config.trakt);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let agent = SyncAgent::new(
        Arc::new(local),
        Arc::new(remote),
        config.sync,
        config.providers,
        ProgressReporter::new(tx),
    )
    .with_cancellation(cancel.clone());

    let mut ui = SyncUI::new(output.format(), output.is_quiet());
    let renderer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            ui.handle(&event);
        }
        ui.finish();
    });

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(operation = "interrupt", "Ctrl-C received, stopping after the current batch");
            interrupt.cancel();
        }
    });

    let outcome = agent.sync_all().await;
    // Dropping the agent closes the progress channel so the renderer drains and exits
    drop(agent);
    let _ = renderer.await;

    let results = outcome.map_err(|e| eyre!("Sync operation failed: {:#}", e))?;
    report(&results, output);
    Ok(())
}

fn report(results: &[SyncResult], output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            for result in results {
                let line = format!(
                    "{}: {}/{} items processed, {} removal candidates, {} removed in {:.1}s",
                    result.process,
                    result.items_processed,
                    result.items_total,
                    result.removal_candidates,
                    result.removed,
                    result.duration.as_secs_f64()
                );
                if result.cancelled {
                    output.warn(format!("{} (cancelled)", line));
                } else {
                    output.success(line);
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let passes: Vec<_> = results
                .iter()
                .map(|r| {
                    json!({
                        "process": r.process.name(),
                        "items_total": r.items_total,
                        "items_processed": r.items_processed,
                        "removal_candidates": r.removal_candidates,
                        "removed": r.removed,
                        "cancelled": r.cancelled,
                        "duration_seconds": r.duration.as_secs_f64(),
                    })
                })
                .collect();
            output.json(&json!({
                "type": "summary",
                "success": results.iter().all(|r| !r.cancelled),
                "passes": passes,
            }));
        }
    }
}
