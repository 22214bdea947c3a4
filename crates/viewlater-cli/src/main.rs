//! viewlater CLI
//!
//! Command-line interface for viewlater - save links now, read them later.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use viewlater_core::{Config, LinkError, StorageError, Store};

mod commands;
mod editor;
mod metadata;
mod output;

use commands::link::{EditArgs, ListArgs, SaveArgs};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "viewlater")]
#[command(about = "viewlater - Save links now, read them later")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a different config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a link
    #[command(alias = "add")]
    Save(SaveArgs),
    /// List the most recent links
    #[command(alias = "ls")]
    List(ListArgs),
    /// Search links
    Search {
        /// Text to look for in title, URL, notes and group
        text: String,
        #[command(flatten)]
        args: ListArgs,
    },
    /// Show link details
    Show {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Edit a link
    Edit(EditArgs),
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Open a link in the browser
    Open {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// List all groups
    Groups,
    /// Import a browser bookmark file
    Import {
        /// Bookmark JSON file
        file: PathBuf,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage location and counts
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, display_limit, fetch_titles, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(err) = run(cli, &output).await {
        eprintln!("Error: {:?}", err);
        if let Some(hint) = recovery_hint(&err) {
            eprintln!("\nHint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let mut store = Store::open_with_config(config);

    match cli.command {
        Commands::Save(args) => commands::link::save(&mut store, args, output).await,
        Commands::List(args) => commands::link::list(&mut store, args, output),
        Commands::Search { text, args } => {
            commands::link::search(&mut store, text, args, output)
        }
        Commands::Show { id } => commands::link::show(&mut store, id, output),
        Commands::Edit(args) => commands::link::edit(&mut store, args, output),
        Commands::Delete { id } => commands::link::delete(&mut store, id, output),
        Commands::Open { id } => commands::link::open(&mut store, id, output),
        Commands::Groups => commands::group::list(&mut store, output),
        Commands::Import { file } => commands::import::import(&mut store, &file, output),
        Commands::Status => commands::status::show(&mut store, output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// What the user can do about a storage failure, if anything
fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        let storage = match cause.downcast_ref::<LinkError>() {
            Some(LinkError::Storage(e)) => Some(e),
            _ => cause.downcast_ref::<StorageError>(),
        };
        storage.and_then(StorageError::recovery_suggestion)
    })
}

/// Initialize file logging
///
/// Only active when VIEWLATER_LOG is set; its value is the level.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("VIEWLATER_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "viewlater_core={},viewlater={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging to {:?}", log_path);
}
