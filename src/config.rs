//
//  config.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GraphError, Result};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "moviegraph.toml";

/// Top-level MovieGraph configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieGraphConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Source dump locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_names_path")]
    pub names_path: PathBuf,
    #[serde(default = "default_titles_path")]
    pub titles_path: PathBuf,
    #[serde(default = "default_principals_path")]
    pub principals_path: PathBuf,
}

/// Ingestion pipeline sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Worker tasks resolving principal rows.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Bounded job queue between reader and workers.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Rows an index scan inserts before waking waiting lookups.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,
    /// Seconds between progress log lines; 0 disables them.
    #[serde(default = "default_progress_interval_secs")]
    pub progress_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Directory holding Index.csv and Edges.csv.
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
}

/// Bounds applied to neighborhood requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_min_depth")]
    pub min_depth: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Write logs here instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_socket")]
    pub socket: PathBuf,
}

fn default_names_path() -> PathBuf {
    PathBuf::from("./data/name.basics.tsv")
}

fn default_titles_path() -> PathBuf {
    PathBuf::from("./data/title.basics.tsv")
}

fn default_principals_path() -> PathBuf {
    PathBuf::from("./data/title.principals.tsv")
}

fn default_workers() -> usize {
    16
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_scan_batch_size() -> usize {
    crate::index::DEFAULT_BATCH_SIZE
}

fn default_progress_interval_secs() -> u64 {
    15
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("./export")
}

fn default_min_depth() -> usize {
    1
}

fn default_max_depth() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_socket() -> PathBuf {
    PathBuf::from("./moviegraph.sock")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            names_path: default_names_path(),
            titles_path: default_titles_path(),
            principals_path: default_principals_path(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            scan_batch_size: default_scan_batch_size(),
            progress_interval_secs: default_progress_interval_secs(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: default_snapshot_dir(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            min_depth: default_min_depth(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_file: None,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            socket: default_socket(),
        }
    }
}

impl MovieGraphConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Load config from a TOML file, reporting a missing or invalid file.
    pub fn try_load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| GraphError::file_access(path, e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| GraphError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline and query layer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.ingest.workers == 0 {
            return Err(GraphError::Config("ingest.workers must be at least 1".into()));
        }
        if self.ingest.queue_capacity == 0 {
            return Err(GraphError::Config(
                "ingest.queue_capacity must be at least 1".into(),
            ));
        }
        if self.query.min_depth > self.query.max_depth {
            return Err(GraphError::Config(format!(
                "query.min_depth ({}) exceeds query.max_depth ({})",
                self.query.min_depth, self.query.max_depth
            )));
        }
        Ok(())
    }
}
