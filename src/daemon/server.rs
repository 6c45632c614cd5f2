//
//  server.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use anyhow::Result;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};

use crate::graph::Graph;
use crate::query::{self, NeighborhoodRequest, PathsRequest, QueryLimits};

use super::protocol::{Request, Response};

/// Serve queries against `graph` on a Unix socket until a `Shutdown` request.
///
/// The graph is read-only here; it is built or imported before serving.
pub fn start_daemon(socket: &Path, graph: Arc<Graph>, limits: QueryLimits) -> Result<()> {
    if let Some(parent) = socket.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Remove stale socket if exists
    if socket.exists() {
        std::fs::remove_file(socket)?;
    }

    let listener = UnixListener::bind(socket)?;
    let stats = graph.stats();
    info!(
        socket = %socket.display(),
        vertices = stats.total_vertices,
        edges = stats.total_edges,
        "daemon listening"
    );

    let shutdown = Arc::new(AtomicBool::new(false));

    for stream in listener.incoming() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match stream {
            Ok(stream) => {
                let graph = Arc::clone(&graph);
                let shutdown = Arc::clone(&shutdown);
                let socket = socket.to_path_buf();

                thread::spawn(move || {
                    if let Err(e) = handle_client(stream, &graph, &limits, &shutdown, &socket) {
                        debug!(error = %e, "client handler error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "accept error");
            }
        }
    }

    info!("daemon shutting down");
    let _ = std::fs::remove_file(socket);

    Ok(())
}

fn handle_client(
    stream: UnixStream,
    graph: &Graph,
    limits: &QueryLimits,
    shutdown: &AtomicBool,
    socket: &Path,
) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim().is_empty() {
        return Ok(());
    }

    let response = match serde_json::from_str::<Request>(&line) {
        Ok(request) => {
            debug!(?request, "received request");
            process_request(request, graph, limits, shutdown, socket)
        }
        Err(e) => Response::error(format!("invalid request: {}", e)),
    };

    let response_json = serde_json::to_string(&response)?;
    writeln!(writer, "{}", response_json)?;

    Ok(())
}

fn process_request(
    request: Request,
    graph: &Graph,
    limits: &QueryLimits,
    shutdown: &AtomicBool,
    socket: &Path,
) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Shutdown => {
            shutdown.store(true, Ordering::Relaxed);
            // Wake the blocking accept loop so it can observe shutdown and exit.
            let _ = UnixStream::connect(socket);
            Response::Goodbye
        }

        Request::Stats => Response::ok(query::stats(graph)),

        Request::Neighborhood { start, depth } => {
            let request = NeighborhoodRequest {
                start,
                depth: depth.unwrap_or(limits.min_depth),
            };
            match query::neighborhood(graph, &request, limits) {
                Ok(result) => Response::ok(result),
                Err(e) => Response::error(e.to_string()),
            }
        }

        Request::Paths { from, to } => match query::paths(graph, &PathsRequest { from, to }) {
            Ok(result) => Response::ok(result),
            Err(e) => Response::error(e.to_string()),
        },
    }
}

/// Check if a daemon answers on `socket`.
pub fn is_daemon_running(socket: &Path) -> bool {
    matches!(send_request(socket, Request::Ping), Ok(Response::Pong))
}

/// Send a request to the daemon and get a response.
pub fn send_request(socket: &Path, request: Request) -> Result<Response> {
    let mut stream = UnixStream::connect(socket)?;

    let request_json = serde_json::to_string(&request)?;
    writeln!(stream, "{}", request_json)?;

    let mut reader = BufReader::new(stream);
    let mut response_line = String::new();
    reader.read_line(&mut response_line)?;

    let response: Response = serde_json::from_str(&response_line)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeValue};
    use std::time::Duration;
    use tempfile::TempDir;

    fn star() -> Arc<Graph> {
        let graph = Graph::new();
        for id in ["X", "L1", "L2", "L3"] {
            graph.add_vertex(Node::new(id, NodeValue::Unknown(serde_json::json!({ "id": id }))));
        }
        for leaf in ["L1", "L2", "L3"] {
            graph.add_edge("X", leaf, false);
        }
        Arc::new(graph)
    }

    fn wait_until_up(socket: &Path) {
        for _ in 0..100 {
            if is_daemon_running(socket) {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("daemon did not come up");
    }

    #[test]
    fn test_daemon_round_trip() {
        let dir = TempDir::new().unwrap();
        let socket = dir.path().join("moviegraph.sock");

        let server = {
            let socket = socket.clone();
            thread::spawn(move || start_daemon(&socket, star(), QueryLimits::default().strict()))
        };
        wait_until_up(&socket);

        match send_request(&socket, Request::Stats).unwrap() {
            Response::Ok { data } => assert_eq!(data["stats"]["total_vertices"], 4),
            other => panic!("unexpected response: {:?}", other),
        }

        let hood = send_request(
            &socket,
            Request::Neighborhood {
                start: "X".to_string(),
                depth: Some(1),
            },
        )
        .unwrap();
        match hood {
            Response::Ok { data } => {
                assert_eq!(data["vertices"].as_array().unwrap().len(), 4);
                assert_eq!(data["edges"].as_array().unwrap().len(), 3);
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let too_deep = send_request(
            &socket,
            Request::Neighborhood {
                start: "X".to_string(),
                depth: Some(9),
            },
        )
        .unwrap();
        assert!(matches!(too_deep, Response::Error { .. }));

        let unknown = send_request(
            &socket,
            Request::Paths {
                from: "X".to_string(),
                to: "nowhere".to_string(),
            },
        )
        .unwrap();
        assert!(matches!(unknown, Response::Error { ref message } if message.contains("nowhere")));

        assert_eq!(send_request(&socket, Request::Shutdown).unwrap(), Response::Goodbye);
        server.join().unwrap().unwrap();
        assert!(!socket.exists());
    }
}
