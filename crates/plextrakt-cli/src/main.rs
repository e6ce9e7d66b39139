use clap::{ArgAction, Parser, Subcommand};
use commands::{config, sync};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "plextrakt")]
#[command(about = "Mirror Plex watch state and collection to Trakt")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Configuration file (defaults to the per-user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write logs to a daily rotated file in the log directory
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the Plex library against Trakt (one-time run)
    #[command(long_about = "Compare every Plex movie and episode with the Trakt collection and watch history, then update whichever side is behind. If neither --movies nor --shows is given, the passes enabled in the configuration run. Press Ctrl-C to stop after the current batch.")]
    Sync {
        /// Run the movie pass
        #[arg(long, action = ArgAction::SetTrue)]
        movies: bool,

        /// Run the TV show pass
        #[arg(long, action = ArgAction::SetTrue)]
        shows: bool,

        /// Remove Trakt collection entries that have no Plex counterpart
        #[arg(long, action = ArgAction::SetTrue)]
        remove_from_collection: bool,

        /// Number of items reconciled concurrently
        #[arg(long, value_name = "N")]
        batch_limit: Option<usize>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show current configuration (masks tokens)
    Show {
        /// Show tokens unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a configuration template to fill in
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = if cli.log_file {
        Some(config::path_manager()?.log_file())
    } else {
        None
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = match cli.config {
        Some(path) => path,
        None => config::path_manager()?.config_file(),
    };

    match cli.command {
        Commands::Sync {
            movies,
            shows,
            remove_from_collection,
            batch_limit,
        } => {
            let flags = sync::SyncFlags {
                movies,
                shows,
                remove_from_collection,
                batch_limit,
            };
            sync::run_sync(&config_path, flags, &output).await
        }
        Commands::Config { cmd } => config::run_config(cmd, &config_path, &output),
    }
}
