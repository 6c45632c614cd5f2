//! CLI module for MovieGraph.
//!
//! Commands:
//! - Build: build (ingest source dumps, write snapshot)
//! - Query: stats, paths, neighborhood
//! - Daemon: serve, ping, stop

pub mod build;
pub mod daemon;
pub mod read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{MovieGraphConfig, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "moviegraph")]
#[command(about = "MovieGraph - person/title graph over IMDb-style dumps", long_about = None)]
pub struct Cli {
    /// Config file (default: ./moviegraph.toml, optional)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Snapshot directory, overriding [snapshot].dir
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Build ────────────────────────────────────────────────────
    /// Ingest the source dumps and write a snapshot
    Build {
        /// name.basics.tsv
        #[arg(long)]
        names: Option<PathBuf>,

        /// title.basics.tsv
        #[arg(long)]
        titles: Option<PathBuf>,

        /// title.principals.tsv
        #[arg(long)]
        principals: Option<PathBuf>,

        /// Worker tasks
        #[arg(short, long)]
        workers: Option<usize>,
    },

    // ─── Query ────────────────────────────────────────────────────
    /// Show graph statistics
    Stats,

    /// Print every path between two vertices
    Paths {
        /// Start vertex ID
        from: String,

        /// End vertex ID
        to: String,
    },

    /// Print (and optionally export) the neighborhood of a vertex
    Neighborhood {
        /// Start vertex ID
        id: String,

        /// Layers to expand (clamped to [query] min_depth..=max_depth)
        #[arg(short, long, default_value = "1")]
        depth: usize,

        /// Write Index.csv/Edges.csv under <snapshot>/<id>/
        #[arg(short, long)]
        export: bool,
    },

    // ─── Daemon ───────────────────────────────────────────────────
    /// Serve queries over a Unix socket (foreground)
    Serve {
        /// Socket path, overriding [daemon].socket
        #[arg(long)]
        socket: Option<PathBuf>,
    },

    /// Check whether a daemon is answering
    Ping {
        #[arg(long)]
        socket: Option<PathBuf>,
    },

    /// Ask a running daemon to exit
    Stop {
        #[arg(long)]
        socket: Option<PathBuf>,
    },
}

/// Load the config file if present; a file that exists but does not parse is an error.
pub fn load_config(path: &Path) -> Result<MovieGraphConfig> {
    if !path.exists() {
        return Ok(MovieGraphConfig::default());
    }
    MovieGraphConfig::try_load(path)
        .with_context(|| format!("loading config from {}", path.display()))
}

impl Cli {
    /// Snapshot directory after the command-line override.
    pub fn snapshot_dir(&self, config: &MovieGraphConfig) -> PathBuf {
        self.snapshot
            .clone()
            .unwrap_or_else(|| config.snapshot.dir.clone())
    }
}

/// Run the parsed command.
pub async fn run(cli: Cli, mut config: MovieGraphConfig) -> Result<()> {
    let snapshot = cli.snapshot_dir(&config);

    match cli.command {
        Commands::Build {
            names,
            titles,
            principals,
            workers,
        } => {
            if let Some(path) = names {
                config.data.names_path = path;
            }
            if let Some(path) = titles {
                config.data.titles_path = path;
            }
            if let Some(path) = principals {
                config.data.principals_path = path;
            }
            if let Some(n) = workers {
                config.ingest.workers = n;
            }
            config.validate()?;
            build::build(&config, &snapshot).await
        }

        Commands::Stats => read::stats(&snapshot),

        Commands::Paths { from, to } => read::paths(&snapshot, &from, &to),

        Commands::Neighborhood { id, depth, export } => {
            read::neighborhood(&snapshot, &config, &id, depth, export)
        }

        Commands::Serve { socket } => {
            let socket = socket.unwrap_or_else(|| config.daemon.socket.clone());
            daemon::serve(&snapshot, &socket, &config).await
        }

        Commands::Ping { socket } => {
            daemon::ping(&socket.unwrap_or_else(|| config.daemon.socket.clone()))
        }

        Commands::Stop { socket } => {
            daemon::stop(&socket.unwrap_or_else(|| config.daemon.socket.clone()))
        }
    }
}
