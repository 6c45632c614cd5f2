//! Query commands over a snapshot: stats, paths, neighborhood.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::MovieGraphConfig;
use crate::graph::{
    export_neighborhood, format_path, import_snapshot, neighborhood_dir, Graph, Neighborhood,
};
use crate::query::{self, NeighborhoodRequest, PathsRequest, QueryLimits};

fn open(snapshot: &Path) -> Result<Graph> {
    import_snapshot(snapshot)
        .with_context(|| format!("loading snapshot from {}", snapshot.display()))
}

/// Print graph statistics.
pub fn stats(snapshot: &Path) -> Result<()> {
    let graph = open(snapshot)?;
    let stats = query::stats(&graph).stats;

    println!("MovieGraph Snapshot");
    println!("───────────────────");
    println!("Path:     {}", snapshot.display());
    println!("Vertices: {}", stats.total_vertices);
    println!("  people: {}", stats.persons);
    println!("  titles: {}", stats.titles);
    if stats.unknown > 0 {
        println!("  other:  {}", stats.unknown);
    }
    println!("Edges:    {} (directed entries)", stats.total_edges);
    Ok(())
}

/// Print every path found between two vertices, one per line.
pub fn paths(snapshot: &Path, from: &str, to: &str) -> Result<()> {
    let graph = open(snapshot)?;
    let request = PathsRequest {
        from: from.to_string(),
        to: to.to_string(),
    };
    let result = query::paths(&graph, &request)?;

    if result.paths.is_empty() {
        println!("No paths between {} and {}", from, to);
        return Ok(());
    }
    for path in &result.paths {
        println!("{}", format_path(path));
    }
    Ok(())
}

/// Print the neighborhood of `id`, exporting it under `<snapshot>/<id>/` if asked.
pub fn neighborhood(
    snapshot: &Path,
    config: &MovieGraphConfig,
    id: &str,
    depth: usize,
    export: bool,
) -> Result<()> {
    let graph = open(snapshot)?;
    let request = NeighborhoodRequest {
        start: id.to_string(),
        depth,
    };
    let limits = QueryLimits::from_config(&config.query);
    let result = query::neighborhood(&graph, &request, &limits)?;

    if result.depth != depth {
        println!("(depth {} clamped to {})", depth, result.depth);
    }
    for node in &result.vertices {
        println!("{} {}", node.value.kind(), node);
    }
    for (from, to) in &result.edges {
        println!("{}->{}", from, to);
    }

    if export {
        let target = neighborhood_dir(snapshot, id)?;
        let hood = Neighborhood {
            vertices: result.vertices.into_iter().map(Arc::new).collect(),
            edges: result.edges,
        };
        let summary = export_neighborhood(&hood, &target)?;
        println!(
            "✓ Exported {} vertices, {} edges to {}",
            summary.vertices,
            summary.edges,
            target.display()
        );
    }
    Ok(())
}
