//! Person/title graph: the store, how it is built, traversed and persisted.

pub mod builder;
pub mod engine;
pub mod persistence;
pub mod query;
pub mod types;

pub use builder::{build_graph, IngestReport, Pipeline, PipelineConfig, Progress};
pub use engine::Graph;
pub use persistence::{
    export_neighborhood, export_snapshot, import_snapshot, neighborhood_dir, SnapshotSummary,
    EDGES_FILE, INDEX_FILE,
};
pub use query::{format_path, Neighborhood};
pub use types::{GraphStats, Node, NodeValue, Person, Title};
