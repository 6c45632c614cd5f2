//
//  engine.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::types::*;

/// The shared graph: a vertex index plus per-vertex adjacency lists.
///
/// Safe to mutate from many tasks at once. The vertex index and the
/// adjacency map are separate lock domains; every check-then-insert runs
/// under a single write guard of its domain.
#[derive(Debug, Default)]
pub struct Graph {
    /// Index: vertex ID -> node.
    vertices: RwLock<HashMap<String, Arc<Node>>>,
    /// Adjacency: vertex ID -> neighbor IDs in insertion order, no duplicates.
    adjacency: RwLock<HashMap<String, Vec<String>>>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Node Operations ────────────────────────────────────────

    /// Insert a vertex unless its ID is already present.
    ///
    /// The first writer wins; later inserts with the same ID are ignored.
    /// Returns `true` if the vertex was inserted.
    pub fn add_vertex(&self, node: Node) -> bool {
        let mut vertices = self.write_vertices();
        if vertices.contains_key(&node.id) {
            return false;
        }
        vertices.insert(node.id.clone(), Arc::new(node));
        true
    }

    /// Look up a vertex by ID.
    pub fn get_node(&self, id: &str) -> Option<Arc<Node>> {
        self.read_vertices().get(id).cloned()
    }

    /// Check whether a vertex exists.
    pub fn contains(&self, id: &str) -> bool {
        self.read_vertices().contains_key(id)
    }

    // ─── Edge Operations ────────────────────────────────────────

    /// Link `from` to `to`. Undirected edges also link `to` back to `from`.
    ///
    /// Each direction is appended only if absent from the source's list.
    /// Returns `true` if at least one adjacency entry was added.
    pub fn add_edge(&self, from: &str, to: &str, directed: bool) -> bool {
        let mut adjacency = self.write_adjacency();
        let mut added = push_unique(&mut adjacency, from, to);
        if !directed {
            added |= push_unique(&mut adjacency, to, from);
        }
        added
    }

    /// Neighbor IDs of a vertex (empty if it has none).
    pub fn get_neighbors(&self, id: &str) -> Vec<String> {
        self.read_adjacency().get(id).cloned().unwrap_or_default()
    }

    // ─── Whole-graph Views ──────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.read_vertices().len()
    }

    /// Number of directed adjacency entries.
    pub fn edge_count(&self) -> usize {
        self.read_adjacency().values().map(Vec::len).sum()
    }

    /// Snapshot of every vertex currently indexed.
    pub fn nodes(&self) -> Vec<Arc<Node>> {
        self.read_vertices().values().cloned().collect()
    }

    /// Every vertex ID, in no particular order.
    pub fn vertex_ids(&self) -> Vec<String> {
        self.read_vertices().keys().cloned().collect()
    }

    /// Snapshot of every directed adjacency entry as `(from, to)`.
    pub fn edges(&self) -> Vec<(String, String)> {
        self.read_adjacency()
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from.clone(), to.clone())))
            .collect()
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats::default();
        for node in self.read_vertices().values() {
            match node.value {
                NodeValue::Person(_) => stats.persons += 1,
                NodeValue::Title(_) => stats.titles += 1,
                NodeValue::Unknown(_) => stats.unknown += 1,
            }
        }
        stats.total_vertices = stats.persons + stats.titles + stats.unknown;
        stats.total_edges = self.edge_count();
        stats
    }

    // ─── Internal Helpers ───────────────────────────────────────

    // A panicking writer cannot leave a half-applied insert behind, so a
    // poisoned lock still guards consistent data.
    fn read_vertices(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Node>>> {
        self.vertices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_vertices(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Node>>> {
        self.vertices.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_adjacency(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<String>>> {
        self.adjacency.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_adjacency(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<String>>> {
        self.adjacency.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn push_unique(adjacency: &mut HashMap<String, Vec<String>>, from: &str, to: &str) -> bool {
    let targets = adjacency.entry(from.to_string()).or_default();
    if targets.iter().any(|t| t == to) {
        return false;
    }
    targets.push(to.to_string());
    true
}
