//! Query boundary over the graph.
//!
//! Validates requests coming from the CLI or the daemon and wraps
//! traversal results in JSON-serializable responses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::QueryConfig;
use crate::graph::{Graph, GraphStats, Node};

/// Input problems. Owned by the query layer, not by the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown start vertex: {0}")]
    UnknownStart(String),

    #[error("unknown end vertex: {0}")]
    UnknownEnd(String),

    #[error("depth {depth} outside allowed range {min}..={max}")]
    DepthOutOfRange { depth: usize, min: usize, max: usize },
}

/// Depth bounds applied before a neighborhood traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub min_depth: usize,
    pub max_depth: usize,
    /// Clamp out-of-range depths instead of rejecting them.
    pub clamp: bool,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}

impl QueryLimits {
    /// Clamping limits taken from the `[query]` section.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            min_depth: config.min_depth,
            max_depth: config.max_depth,
            clamp: true,
        }
    }

    /// Same bounds, rejecting out-of-range depths.
    pub fn strict(self) -> Self {
        Self {
            clamp: false,
            ..self
        }
    }

    pub fn resolve_depth(&self, depth: usize) -> Result<usize, QueryError> {
        if (self.min_depth..=self.max_depth).contains(&depth) {
            return Ok(depth);
        }
        if self.clamp {
            return Ok(depth.clamp(self.min_depth, self.max_depth));
        }
        Err(QueryError::DepthOutOfRange {
            depth,
            min: self.min_depth,
            max: self.max_depth,
        })
    }
}

fn default_depth() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodRequest {
    pub start: String,
    #[serde(default = "default_depth")]
    pub depth: usize,
}

/// Vertices and first-discovery edges around `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodResponse {
    pub start: String,
    /// Depth actually traversed, after limits were applied.
    pub depth: usize,
    pub vertices: Vec<Node>,
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsRequest {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsResponse {
    pub from: String,
    pub to: String,
    pub count: usize,
    pub paths: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub stats: GraphStats,
}

/// Answer a neighborhood request.
pub fn neighborhood(
    graph: &Graph,
    request: &NeighborhoodRequest,
    limits: &QueryLimits,
) -> Result<NeighborhoodResponse, QueryError> {
    if !graph.contains(&request.start) {
        return Err(QueryError::UnknownStart(request.start.clone()));
    }
    let depth = limits.resolve_depth(request.depth)?;
    let hood = graph.bounded_neighborhood(&request.start, depth);

    Ok(NeighborhoodResponse {
        start: request.start.clone(),
        depth,
        vertices: hood.vertices.iter().map(|n| Node::clone(n)).collect(),
        edges: hood.edges,
    })
}

/// Answer a paths request.
pub fn paths(graph: &Graph, request: &PathsRequest) -> Result<PathsResponse, QueryError> {
    if !graph.contains(&request.from) {
        return Err(QueryError::UnknownStart(request.from.clone()));
    }
    if !graph.contains(&request.to) {
        return Err(QueryError::UnknownEnd(request.to.clone()));
    }
    let paths = graph.all_paths(&request.from, &request.to);

    Ok(PathsResponse {
        from: request.from.clone(),
        to: request.to.clone(),
        count: paths.len(),
        paths,
    })
}

pub fn stats(graph: &Graph) -> StatsResponse {
    StatsResponse {
        stats: graph.stats(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeValue;

    fn graph() -> Graph {
        let graph = Graph::new();
        for id in ["X", "L1", "L2", "F"] {
            graph.add_vertex(Node::new(id, NodeValue::Unknown(serde_json::json!({}))));
        }
        graph.add_edge("X", "L1", false);
        graph.add_edge("X", "L2", false);
        graph.add_edge("L2", "F", false);
        graph
    }

    #[test]
    fn test_unknown_start_is_rejected() {
        let request = NeighborhoodRequest {
            start: "nope".to_string(),
            depth: 1,
        };
        let err = neighborhood(&graph(), &request, &QueryLimits::default()).unwrap_err();
        assert_eq!(err, QueryError::UnknownStart("nope".to_string()));
    }

    #[test]
    fn test_depth_is_clamped_by_default() {
        let request = NeighborhoodRequest {
            start: "X".to_string(),
            depth: 0,
        };
        let response = neighborhood(&graph(), &request, &QueryLimits::default()).unwrap();
        assert_eq!(response.depth, 1);
        assert_eq!(response.vertices.len(), 3);
        assert_eq!(response.edges.len(), 2);

        let deep = NeighborhoodRequest {
            start: "X".to_string(),
            depth: 99,
        };
        let response = neighborhood(&graph(), &deep, &QueryLimits::default()).unwrap();
        assert_eq!(response.depth, 5);
        assert_eq!(response.vertices.len(), 4);
    }

    #[test]
    fn test_strict_limits_reject_depth() {
        let limits = QueryLimits::default().strict();
        let request = NeighborhoodRequest {
            start: "X".to_string(),
            depth: 6,
        };
        let err = neighborhood(&graph(), &request, &limits).unwrap_err();
        assert_eq!(
            err,
            QueryError::DepthOutOfRange {
                depth: 6,
                min: 1,
                max: 5
            }
        );
    }

    #[test]
    fn test_request_depth_defaults_to_one() {
        let request: NeighborhoodRequest = serde_json::from_str(r#"{"start":"X"}"#).unwrap();
        assert_eq!(request.depth, 1);
    }

    #[test]
    fn test_paths_validates_both_ends() {
        let g = graph();
        let ok = paths(
            &g,
            &PathsRequest {
                from: "L1".to_string(),
                to: "F".to_string(),
            },
        )
        .unwrap();
        assert_eq!(ok.count, 1);
        assert_eq!(ok.paths[0], vec!["L1", "X", "L2", "F"]);

        let err = paths(
            &g,
            &PathsRequest {
                from: "L1".to_string(),
                to: "ghost".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err, QueryError::UnknownEnd("ghost".to_string()));
    }

    #[test]
    fn test_stats_response_serializes() {
        let json = serde_json::to_value(stats(&graph())).unwrap();
        assert_eq!(json["stats"]["total_vertices"], 4);
        assert_eq!(json["stats"]["unknown"], 4);
    }
}
