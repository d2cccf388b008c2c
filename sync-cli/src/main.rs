//! # etagsync
//!
//! Incremental one-way sync of a local directory into an object-store
//! container.
//!
//! ## Commands
//!
//! - `sync`: Upload new and changed files, skip unchanged ones
//! - `create-container`: Create a container (idempotent)
//! - `list-containers`: Show owned containers
//! - `list-objects`: Show a container's keys and fingerprints
//!
//! ## Example
//!
//! ```bash
//! # Create the target container
//! etagsync create-container my-site
//!
//! # Upload ./public; run again and nothing is re-sent
//! etagsync sync ./public my-site
//!
//! # Inspect what the store holds
//! etagsync list-objects my-site
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use sync_store::{DirectoryStore, RetryingStore};
use sync_types::ContainerName;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{create_container, list_containers, list_objects, sync};
use config::AppConfig;

/// Incremental directory sync to object-store containers.
#[derive(Parser, Debug)]
#[command(name = "etagsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: etagsync.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the containers (overrides the config file)
    #[arg(long, global = true)]
    store_root: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload new and changed files from a directory into a container
    Sync {
        /// Local directory to upload
        path: PathBuf,

        /// Target container
        container: String,

        /// Chunk size in bytes (overrides the config file)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Follow symbolic links
        #[arg(long)]
        follow_symlinks: bool,
    },

    /// Create a container
    CreateContainer {
        /// Container name
        container: String,
    },

    /// List owned containers
    ListContainers,

    /// List objects in a container with their fingerprints
    ListObjects {
        /// Container name
        container: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(root) = cli.store_root {
        config.store.root = root;
    }
    if let Commands::Sync {
        chunk_size,
        follow_symlinks,
        ..
    } = &cli.command
    {
        if let Some(size) = chunk_size {
            config.transfer.chunk_size = *size;
        }
        if *follow_symlinks {
            config.transfer.follow_symlinks = true;
        }
    }
    config.validate()?;
    tracing::debug!(
        store_root = %config.store.root.display(),
        chunk_size = config.transfer.chunk_size,
        "configuration loaded"
    );

    let store = RetryingStore::new(
        DirectoryStore::new(&config.store.root).with_page_size(config.store.page_size),
        config.retry_policy(),
    );
    let mut out = std::io::stdout().lock();

    let succeeded = match cli.command {
        Commands::Sync {
            path, container, ..
        } => {
            let container = parse_container(&container)?;
            sync::run(store, config.sync_config(), &path, &container, &mut out).await?
        }
        Commands::CreateContainer { container } => {
            let container = parse_container(&container)?;
            create_container::run(&store, &container, &mut out).await?
        }
        Commands::ListContainers => {
            list_containers::run(&store, &mut out).await?;
            true
        }
        Commands::ListObjects { container } => {
            let container = parse_container(&container)?;
            list_objects::run(&store, &container, &mut out).await?;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_container(name: &str) -> Result<ContainerName> {
    ContainerName::parse(name).with_context(|| format!("Invalid container name {name:?}"))
}
