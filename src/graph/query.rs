//
//  query.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

use super::engine::Graph;
use super::types::Node;

/// Result of a bounded breadth-first expansion.
#[derive(Debug, Clone, Default)]
pub struct Neighborhood {
    /// Every discovered vertex, `start` first, in discovery order.
    pub vertices: Vec<Arc<Node>>,
    /// First-discovery edge of each non-start vertex, as `(from, to)`.
    pub edges: Vec<(String, String)>,
}

impl Neighborhood {
    pub fn vertex_ids(&self) -> Vec<&str> {
        self.vertices.iter().map(|n| n.id.as_str()).collect()
    }
}

impl Graph {
    /// Find paths from `start` to `end` with a breadth-first search over partial paths.
    ///
    /// Intermediate vertices are claimed by the first path that reaches them.
    /// `end` itself is never marked visited, so every expansion that touches it
    /// records a path, including ones from deeper layers.
    pub fn all_paths(&self, start: &str, end: &str) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        let mut queue: VecDeque<Vec<String>> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        queue.push_back(vec![start.to_string()]);
        visited.insert(start.to_string());

        while let Some(path) = queue.pop_front() {
            let Some(current) = path.last() else {
                continue;
            };

            for neighbor in self.get_neighbors(current) {
                if neighbor == end {
                    let mut found = path.clone();
                    found.push(neighbor);
                    debug!(path = %format_path(&found), "path found");
                    paths.push(found);
                } else if visited.insert(neighbor.clone()) {
                    let mut next = path.clone();
                    next.push(neighbor);
                    queue.push_back(next);
                }
            }
        }

        paths
    }

    /// Collect everything within `depth` hops of `start`.
    ///
    /// Expands exactly `depth` layers; each vertex is discovered once and
    /// only its discovery edge is kept. Callers bound `depth`.
    pub fn bounded_neighborhood(&self, start: &str, depth: usize) -> Neighborhood {
        let mut result = Neighborhood::default();
        let Some(start_node) = self.get_node(start) else {
            return result;
        };

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.to_string());
        result.vertices.push(start_node);

        let mut frontier = vec![start.to_string()];
        for _ in 0..depth {
            let mut next = Vec::new();
            for id in &frontier {
                for neighbor in self.get_neighbors(id) {
                    if !visited.insert(neighbor.clone()) {
                        continue;
                    }
                    if let Some(node) = self.get_node(&neighbor) {
                        result.vertices.push(node);
                    }
                    result.edges.push((id.clone(), neighbor.clone()));
                    next.push(neighbor);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        result
    }
}

/// Render a path as `a->b->c`.
pub fn format_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("->")
}
