//
//  build.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use anyhow::Result;
use std::path::Path;

use crate::config::MovieGraphConfig;
use crate::graph::{build_graph, export_snapshot};

/// Ingest the configured dumps and persist the result to `snapshot`.
pub async fn build(config: &MovieGraphConfig, snapshot: &Path) -> Result<()> {
    println!(
        "Building graph from {} ({} workers)...",
        config.data.principals_path.display(),
        config.ingest.workers
    );

    let (graph, report) = build_graph(config).await?;

    println!(
        "Processed {} rows in {:.1}s: {} edges linked, {} lookup misses, {} malformed",
        report.rows_processed,
        report.elapsed.as_secs_f64(),
        report.edges_linked,
        report.lookup_misses,
        report.rows_skipped
    );

    let summary = export_snapshot(&graph, snapshot)?;
    println!(
        "✓ Snapshot written to {} ({} vertices, {} edges)",
        snapshot.display(),
        summary.vertices,
        summary.edges
    );
    if summary.skipped > 0 {
        println!("  {} vertices could not be encoded and were left out", summary.skipped);
    }

    Ok(())
}
