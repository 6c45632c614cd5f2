//
//  daemon.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::config::MovieGraphConfig;
use crate::daemon::{is_daemon_running, send_request, start_daemon, Request, Response};
use crate::graph::import_snapshot;
use crate::query::QueryLimits;

/// Load the snapshot and serve it in the foreground.
pub async fn serve(snapshot: &Path, socket: &Path, config: &MovieGraphConfig) -> Result<()> {
    if is_daemon_running(socket) {
        println!("Daemon is already running.");
        return Ok(());
    }

    let graph = import_snapshot(snapshot)
        .with_context(|| format!("loading snapshot from {}", snapshot.display()))?;
    let limits = QueryLimits::from_config(&config.query).strict();

    println!(
        "Serving {} on {} (Ctrl+C to stop)...",
        snapshot.display(),
        socket.display()
    );
    let socket = socket.to_path_buf();
    tokio::task::spawn_blocking(move || start_daemon(&socket, Arc::new(graph), limits)).await?
}

/// Report whether a daemon answers on `socket`.
pub fn ping(socket: &Path) -> Result<()> {
    match send_request(socket, Request::Ping) {
        Ok(Response::Pong) => println!("Daemon is running and responsive."),
        Ok(_) => println!("Daemon is running but gave unexpected response."),
        Err(_) => println!("Daemon is not running."),
    }
    Ok(())
}

/// Ask the daemon on `socket` to shut down.
pub fn stop(socket: &Path) -> Result<()> {
    if !is_daemon_running(socket) {
        println!("Daemon is not running.");
        return Ok(());
    }
    match send_request(socket, Request::Shutdown) {
        Ok(Response::Goodbye) => println!("Daemon stopped."),
        Ok(_) => println!("Unexpected response from daemon."),
        Err(e) => println!("Failed to stop daemon: {}", e),
    }
    Ok(())
}
