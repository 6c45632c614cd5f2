//! # MovieGraph
//!
//! Bipartite person/title graph built from IMDb-style tab-separated dumps.
//!
//! ## Pieces
//!
//! - **Lazy indexes** ([`index`]): key lookups over `name.basics.tsv` and
//!   `title.basics.tsv`, filled by one background scan per file and shared
//!   by every caller.
//! - **Graph store** ([`graph::Graph`]): concurrency-safe vertices and
//!   duplicate-free adjacency lists.
//! - **Ingestion** ([`graph::Pipeline`]): a bounded reader/worker pipeline
//!   that turns `title.principals.tsv` into person <-> title edges.
//! - **Traversal**: all-paths search and bounded-depth neighborhoods.
//! - **Snapshots**: `Index.csv` + `Edges.csv` export and import.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moviegraph::{build_graph, export_snapshot, MovieGraphConfig};
//! use std::path::Path;
//!
//! # async fn demo() -> moviegraph::Result<()> {
//! let config = MovieGraphConfig::load(Path::new("moviegraph.toml"));
//! let (graph, report) = build_graph(&config).await?;
//! println!("{} edges linked", report.edges_linked);
//!
//! for path in graph.all_paths("nm0000206", "nm0000401") {
//!     println!("{}", moviegraph::format_path(&path));
//! }
//! export_snapshot(&graph, Path::new("./export"))?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod graph;
pub mod index;
pub mod logging;
pub mod query;

// Re-exports for convenience
pub use config::MovieGraphConfig;
pub use error::{GraphError, Result};
pub use graph::{
    build_graph, export_neighborhood, export_snapshot, format_path, import_snapshot, Graph,
    GraphStats, IngestReport, Neighborhood, Node, NodeValue, Person, Pipeline, PipelineConfig,
    SnapshotSummary, Title,
};
pub use index::{LazyFileIndex, NameIndex, RecordLookup, ScanState, TitleIndex};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
