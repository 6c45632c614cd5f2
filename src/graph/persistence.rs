//
//  persistence.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::engine::Graph;
use super::query::Neighborhood;
use super::types::{Node, NodeValue};
use crate::error::{GraphError, Result};

/// Vertex file: `id,json` per row, no header.
pub const INDEX_FILE: &str = "Index.csv";
/// Edge file: `from,to` per directed adjacency entry, no header.
pub const EDGES_FILE: &str = "Edges.csv";

/// What a snapshot write or read touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub vertices: usize,
    pub edges: usize,
    /// Vertices left out because their value could not be encoded.
    pub skipped: usize,
}

// ─── Export ─────────────────────────────────────────────────────

/// Write the whole graph to `dir`, creating it if needed.
///
/// Rows are sorted by ID so repeated exports of the same graph are
/// byte-identical.
pub fn export_snapshot(graph: &Graph, dir: &Path) -> Result<SnapshotSummary> {
    let mut nodes = graph.nodes();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    let mut edges = graph.edges();
    edges.sort();

    let summary = write_snapshot(dir, &nodes, &edges, encode_value)?;
    info!(
        dir = %dir.display(),
        vertices = summary.vertices,
        edges = summary.edges,
        skipped = summary.skipped,
        "snapshot exported"
    );
    Ok(summary)
}

/// Write a neighborhood in snapshot format, edges in discovery order.
pub fn export_neighborhood(hood: &Neighborhood, dir: &Path) -> Result<SnapshotSummary> {
    let summary = write_snapshot(dir, &hood.vertices, &hood.edges, encode_value)?;
    info!(
        dir = %dir.display(),
        vertices = summary.vertices,
        edges = summary.edges,
        "neighborhood exported"
    );
    Ok(summary)
}

/// Directory for the neighborhood of `id` under `base`.
///
/// The ID must be a single plain path segment so the export stays inside `base`.
pub fn neighborhood_dir(base: &Path, id: &str) -> Result<PathBuf> {
    let invalid = |reason: &str| GraphError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    };
    if id.contains(['/', '\\']) {
        return Err(invalid("contains a path separator"));
    }
    let mut components = Path::new(id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(base.join(id)),
        _ => Err(invalid("not a plain directory name")),
    }
}

fn encode_value(node: &Node) -> Result<String> {
    serde_json::to_string(&node.value).map_err(|source| GraphError::Encoding {
        id: node.id.clone(),
        source,
    })
}

fn write_snapshot<F>(
    dir: &Path,
    nodes: &[Arc<Node>],
    edges: &[(String, String)],
    encode: F,
) -> Result<SnapshotSummary>
where
    F: Fn(&Node) -> Result<String> + Sync,
{
    fs::create_dir_all(dir).map_err(|e| GraphError::file_access(dir, e))?;

    let encoded: Vec<(&str, Result<String>)> = nodes
        .par_iter()
        .map(|node| (node.id.as_str(), encode(node)))
        .collect();

    let mut summary = SnapshotSummary::default();

    let mut index = create_writer(&dir.join(INDEX_FILE))?;
    for (id, json) in encoded {
        match json {
            Ok(json) => {
                index.write_record([id, json.as_str()])?;
                summary.vertices += 1;
            }
            Err(e) => {
                warn!(id, error = %e, "skipping vertex that failed to encode");
                summary.skipped += 1;
            }
        }
    }
    index.flush()?;

    let mut out = create_writer(&dir.join(EDGES_FILE))?;
    for (from, to) in edges {
        out.write_record([from.as_str(), to.as_str()])?;
        summary.edges += 1;
    }
    out.flush()?;

    Ok(summary)
}

fn create_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    let file = File::create(path).map_err(|e| GraphError::file_access(path, e))?;
    Ok(WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file)))
}

// ─── Import ─────────────────────────────────────────────────────

/// Rebuild a graph from a snapshot directory.
///
/// Every vertex must decode and every edge must name two known vertices;
/// the first violation aborts the import.
pub fn import_snapshot(dir: &Path) -> Result<Graph> {
    let rows = read_pairs(&dir.join(INDEX_FILE), INDEX_FILE)?;

    let nodes: Vec<Node> = rows
        .into_par_iter()
        .map(|(id, json)| match serde_json::from_str::<NodeValue>(&json) {
            Ok(value) => Ok(Node { id, value }),
            Err(source) => Err(GraphError::Encoding { id, source }),
        })
        .collect::<Result<Vec<_>>>()?;

    let graph = Graph::new();
    for node in nodes {
        graph.add_vertex(node);
    }

    let edges = read_pairs(&dir.join(EDGES_FILE), EDGES_FILE)?;
    let edge_rows = edges.len();
    for (from, to) in edges {
        let missing = [&from, &to]
            .into_iter()
            .find(|id| !graph.contains(id))
            .cloned();
        if let Some(missing) = missing {
            return Err(GraphError::ImportIntegrity { from, to, missing });
        }
        graph.add_edge(&from, &to, true);
    }

    info!(
        dir = %dir.display(),
        vertices = graph.vertex_count(),
        edges = edge_rows,
        "snapshot imported"
    );
    Ok(graph)
}

/// Read a two-column headerless file, rejecting rows of any other width.
fn read_pairs(path: &Path, name: &str) -> Result<Vec<(String, String)>> {
    let file = File::open(path).map_err(|e| GraphError::file_access(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        if record.len() != 2 {
            return Err(GraphError::MalformedSnapshot {
                file: name.to_string(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                reason: format!("expected 2 columns, found {}", record.len()),
            });
        }
        rows.push((record[0].to_string(), record[1].to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{Person, Title};
    use std::collections::{BTreeMap, BTreeSet};
    use tempfile::TempDir;

    fn person(id: &str, name: &str) -> Node {
        Node::person(Person {
            id: id.to_string(),
            primary_name: name.to_string(),
            birth_year: Some(1970),
            death_year: None,
            professions: vec!["actress".to_string()],
            known_for: vec![],
        })
    }

    fn title(id: &str, name: &str) -> Node {
        Node::title(Title {
            id: id.to_string(),
            title_type: "movie".to_string(),
            title: name.to_string(),
            original_title: name.to_string(),
            is_adult: false,
            start_year: Some(2001),
            end_year: None,
            runtime_minutes: Some(121),
            genres: vec!["Drama".to_string(), "Mystery".to_string()],
        })
    }

    fn adjacency_sets(graph: &Graph) -> BTreeMap<String, BTreeSet<String>> {
        let mut sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (from, to) in graph.edges() {
            sets.entry(from).or_default().insert(to);
        }
        sets
    }

    fn vertex_ids(graph: &Graph) -> BTreeSet<String> {
        graph.vertex_ids().into_iter().collect()
    }

    #[test]
    fn test_round_trip_preserves_vertices_and_adjacency() {
        let graph = Graph::new();
        graph.add_vertex(title("tt0166924", "Mulholland Drive"));
        graph.add_vertex(person("nm0915208", "Naomi Watts"));
        graph.add_vertex(person("nm0001356", "Laura Harring"));
        graph.add_edge("nm0001356", "tt0166924", false);
        graph.add_edge("nm0915208", "tt0166924", false);
        graph.add_edge("nm0915208", "nm0001356", true);

        let dir = TempDir::new().unwrap();
        let summary = export_snapshot(&graph, dir.path()).unwrap();
        assert_eq!(summary.vertices, 3);
        assert_eq!(summary.edges, 5);

        let restored = import_snapshot(dir.path()).unwrap();
        assert_eq!(vertex_ids(&restored), vertex_ids(&graph));
        assert_eq!(adjacency_sets(&restored), adjacency_sets(&graph));
        assert_eq!(
            restored.get_node("tt0166924").unwrap().value,
            graph.get_node("tt0166924").unwrap().value
        );
    }

    #[test]
    fn test_round_trip_keeps_unknown_payload() {
        let graph = Graph::new();
        let raw = serde_json::json!({ "kind": "Episode", "id": "tt9", "season": 2 });
        graph.add_vertex(Node::new("tt9", NodeValue::Unknown(raw.clone())));

        let dir = TempDir::new().unwrap();
        export_snapshot(&graph, dir.path()).unwrap();
        let restored = import_snapshot(dir.path()).unwrap();

        assert_eq!(
            restored.get_node("tt9").unwrap().value,
            NodeValue::Unknown(raw)
        );
    }

    #[test]
    fn test_unknown_payload_with_reserved_kind_is_skipped_on_export() {
        let graph = Graph::new();
        graph.add_vertex(person("nm1", "Typed"));
        graph.add_vertex(Node::new(
            "x1",
            NodeValue::Unknown(serde_json::json!({ "kind": "Person", "note": "partial" })),
        ));

        let dir = TempDir::new().unwrap();
        let summary = export_snapshot(&graph, dir.path()).unwrap();
        assert_eq!(summary.vertices, 1);
        assert_eq!(summary.skipped, 1);

        let restored = import_snapshot(dir.path()).unwrap();
        assert!(restored.contains("nm1"));
        assert!(!restored.contains("x1"));
    }

    #[test]
    fn test_export_creates_nested_directory() {
        let graph = Graph::new();
        graph.add_vertex(person("nm1", "A, with a comma"));

        let dir = TempDir::new().unwrap();
        let target = dir.path().join("export").join("run-1");
        export_snapshot(&graph, &target).unwrap();

        assert!(target.join(INDEX_FILE).exists());
        assert!(target.join(EDGES_FILE).exists());
        let restored = import_snapshot(&target).unwrap();
        assert_eq!(
            restored.get_node("nm1").unwrap().value.label(),
            Some("A, with a comma")
        );
    }

    #[test]
    fn test_export_skips_vertices_that_fail_to_encode() {
        let nodes = vec![Arc::new(person("nm1", "Kept")), Arc::new(person("nm2", "Dropped"))];
        let dir = TempDir::new().unwrap();

        let summary = write_snapshot(dir.path(), &nodes, &[], |node| {
            if node.id == "nm2" {
                let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                return Err(GraphError::Encoding {
                    id: node.id.clone(),
                    source,
                });
            }
            encode_value(node)
        })
        .unwrap();

        assert_eq!(summary.vertices, 1);
        assert_eq!(summary.skipped, 1);
        let restored = import_snapshot(dir.path()).unwrap();
        assert!(restored.contains("nm1"));
        assert!(!restored.contains("nm2"));
    }

    #[test]
    fn test_import_rejects_dangling_edge() {
        let dir = TempDir::new().unwrap();
        let json = serde_json::to_string(&person("nm1", "Solo").value).unwrap();
        let mut index = WriterBuilder::new()
            .has_headers(false)
            .from_path(dir.path().join(INDEX_FILE))
            .unwrap();
        index.write_record(["nm1", json.as_str()]).unwrap();
        index.flush().unwrap();
        fs::write(dir.path().join(EDGES_FILE), "nm1,tt404\n").unwrap();

        let err = import_snapshot(dir.path()).unwrap_err();
        match err {
            GraphError::ImportIntegrity { from, to, missing } => {
                assert_eq!(from, "nm1");
                assert_eq!(to, "tt404");
                assert_eq!(missing, "tt404");
            }
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_import_aborts_on_undecodable_value() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(INDEX_FILE),
            "nm1,\"{\"\"kind\"\":\"\"Person\"\"}\"\nnm2,not json\n",
        )
        .unwrap();
        fs::write(dir.path().join(EDGES_FILE), "").unwrap();

        let err = import_snapshot(dir.path()).unwrap_err();
        assert!(matches!(err, GraphError::Encoding { .. }));
    }

    #[test]
    fn test_import_rejects_wrong_width_row() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(INDEX_FILE), "nm1\n").unwrap();
        fs::write(dir.path().join(EDGES_FILE), "").unwrap();

        let err = import_snapshot(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            GraphError::MalformedSnapshot { ref file, line: 1, .. } if file == INDEX_FILE
        ));
    }

    #[test]
    fn test_import_missing_directory() {
        let err = import_snapshot(Path::new("/no/such/snapshot")).unwrap_err();
        assert!(matches!(err, GraphError::FileAccess { .. }));
    }

    #[test]
    fn test_neighborhood_dir_stays_inside_base() {
        let base = Path::new("/data/export");
        assert_eq!(
            neighborhood_dir(base, "nm0000206").unwrap(),
            PathBuf::from("/data/export/nm0000206")
        );
        for bad in ["../x", "..", ".", "", "a/b", "/etc", "a\\b"] {
            assert!(
                matches!(neighborhood_dir(base, bad), Err(GraphError::InvalidId { .. })),
                "{:?} must be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_neighborhood_export_keeps_discovery_edges() {
        let graph = Graph::new();
        graph.add_vertex(person("nm1", "Center"));
        graph.add_vertex(title("tt1", "One"));
        graph.add_vertex(title("tt2", "Two"));
        graph.add_edge("nm1", "tt1", false);
        graph.add_edge("nm1", "tt2", false);

        let hood = graph.bounded_neighborhood("nm1", 1);
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nm1");
        let summary = export_neighborhood(&hood, &target).unwrap();
        assert_eq!(summary.vertices, 3);
        assert_eq!(summary.edges, 2);

        let edges = fs::read_to_string(target.join(EDGES_FILE)).unwrap();
        assert_eq!(edges, "nm1,tt1\nnm1,tt2\n");
    }
}
