//
//  lazy.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use csv::StringRecord;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use super::tsv::{check_width, open_tsv, SourceRecord};
use crate::error::{GraphError, Result};

/// Rows decoded before the default scan publishes progress.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Lifecycle of the background scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    NotStarted,
    Scanning,
    Complete,
    /// The source could not be opened or read; no further rows will arrive.
    Failed { kind: io::ErrorKind, message: String },
}

impl ScanState {
    /// Whether presence/absence of every key is final.
    pub fn is_finished(&self) -> bool {
        matches!(self, ScanState::Complete | ScanState::Failed { .. })
    }
}

/// Counters for one index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Distinct keys inserted.
    pub records: u64,
    /// Rows skipped for having the wrong shape.
    pub skipped: u64,
}

#[derive(Debug, Clone, Default)]
struct Progress {
    state: ScanState,
    stats: ScanStats,
}

struct Inner<R> {
    path: PathBuf,
    batch_size: usize,
    entries: RwLock<HashMap<String, Arc<R>>>,
    progress: watch::Sender<Progress>,
    started: Once,
}

/// Key lookup over a large delimited file, populated by one background scan.
///
/// The first `find` starts the scan; later callers share it. A caller whose
/// key has not shown up yet waits for the next batch of rows instead of
/// rescanning, and gets `None` once the scan has finished without it.
///
/// Clones share the same entries and scan.
pub struct LazyFileIndex<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for LazyFileIndex<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: SourceRecord> LazyFileIndex<R> {
    /// Create an index over `path`. Nothing is read until the first lookup.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_batch_size(path, DEFAULT_BATCH_SIZE)
    }

    /// Create an index that publishes progress every `batch_size` rows.
    pub fn with_batch_size(path: impl Into<PathBuf>, batch_size: usize) -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                batch_size: batch_size.max(1),
                entries: RwLock::new(HashMap::new()),
                progress,
                started: Once::new(),
            }),
        }
    }

    /// Resolve `key`, waiting on the scan if it has not finished yet.
    ///
    /// Returns `Ok(None)` once the scan has completed without the key.
    /// Must be called from within a tokio runtime.
    pub async fn find(&self, key: &str) -> Result<Option<Arc<R>>> {
        self.ensure_started();
        let mut progress = self.inner.progress.subscribe();

        loop {
            // Read the state before the map: rows are inserted before the
            // state they belong to is published.
            let state = progress.borrow_and_update().state.clone();

            if let Some(hit) = self.inner.get(key) {
                return Ok(Some(hit));
            }

            match state {
                ScanState::Complete => {
                    debug!(kind = R::KIND, key, "index complete, key not found");
                    return Ok(None);
                }
                ScanState::Failed { kind, message } => {
                    return Err(GraphError::file_access(
                        &self.inner.path,
                        io::Error::new(kind, message),
                    ));
                }
                ScanState::NotStarted | ScanState::Scanning => {}
            }

            if progress.changed().await.is_err() {
                return Ok(self.inner.get(key));
            }
        }
    }

    /// Start the scan if needed and wait for it to finish.
    pub async fn wait_until_complete(&self) -> Result<ScanStats> {
        self.ensure_started();
        let mut progress = self.inner.progress.subscribe();

        loop {
            let current = progress.borrow_and_update().clone();
            match current.state {
                ScanState::Complete => return Ok(current.stats),
                ScanState::Failed { kind, message } => {
                    return Err(GraphError::file_access(
                        &self.inner.path,
                        io::Error::new(kind, message),
                    ))
                }
                ScanState::NotStarted | ScanState::Scanning => {}
            }
            if progress.changed().await.is_err() {
                return Ok(self.stats());
            }
        }
    }

    /// Look at the entries without starting or waiting on the scan.
    pub fn peek(&self, key: &str) -> Option<Arc<R>> {
        self.inner.get(key)
    }

    pub fn state(&self) -> ScanState {
        self.inner.progress.borrow().state.clone()
    }

    pub fn stats(&self) -> ScanStats {
        self.inner.progress.borrow().stats
    }

    /// Number of entries indexed so far.
    pub fn len(&self) -> usize {
        self.inner.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn ensure_started(&self) {
        self.inner.started.call_once(|| {
            self.inner
                .progress
                .send_modify(|p| p.state = ScanState::Scanning);
            let inner = Arc::clone(&self.inner);
            tokio::task::spawn_blocking(move || inner.scan());
        });
    }
}

impl<R: SourceRecord> Inner<R> {
    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<R>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, key: &str) -> Option<Arc<R>> {
        self.read_entries().get(key).cloned()
    }

    /// Stream the whole file once, publishing after every batch.
    fn scan(&self) {
        info!(kind = R::KIND, path = %self.path.display(), "index scan started");

        let mut reader = match open_tsv(&self.path) {
            Ok(reader) => reader,
            Err(GraphError::FileAccess { source, .. }) => {
                self.fail(source.kind(), source.to_string());
                return;
            }
            Err(e) => {
                self.fail(io::ErrorKind::Other, e.to_string());
                return;
            }
        };

        let mut record = StringRecord::new();
        let mut batch: Vec<R> = Vec::with_capacity(self.batch_size);
        let mut skipped = 0u64;

        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_io_error() => {
                    self.flush(&mut batch, skipped);
                    self.fail(io::ErrorKind::Other, e.to_string());
                    return;
                }
                Err(e) => {
                    trace!(kind = R::KIND, error = %e, "skipping unreadable row");
                    skipped += 1;
                    continue;
                }
            }

            let line = record.position().map(|p| p.line()).unwrap_or(0);
            match check_width(&record, R::FIELD_COUNT, line) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => {
                    self.flush(&mut batch, skipped);
                    self.fail(io::ErrorKind::InvalidData, e.to_string());
                    return;
                }
                Err(e) => {
                    trace!(kind = R::KIND, error = %e, "skipping row");
                    skipped += 1;
                    continue;
                }
            }

            batch.push(R::from_record(&record));
            if batch.len() >= self.batch_size {
                self.flush(&mut batch, skipped);
                skipped = 0;
            }
        }

        self.flush(&mut batch, skipped);
        self.progress.send_modify(|p| p.state = ScanState::Complete);

        let stats = self.progress.borrow().stats;
        info!(
            kind = R::KIND,
            records = stats.records,
            skipped = stats.skipped,
            "index scan complete"
        );
    }

    /// Insert a batch under one write lock, then wake waiting callers.
    fn flush(&self, batch: &mut Vec<R>, skipped: u64) {
        let mut inserted = 0u64;
        if !batch.is_empty() {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            for value in batch.drain(..) {
                // First row for a key wins; later duplicates are dropped.
                if let Entry::Vacant(slot) = entries.entry(value.key().to_string()) {
                    slot.insert(Arc::new(value));
                    inserted += 1;
                }
            }
        }
        self.progress.send_modify(|p| {
            p.stats.records += inserted;
            p.stats.skipped += skipped;
        });
    }

    fn fail(&self, kind: io::ErrorKind, message: String) {
        warn!(kind = R::KIND, path = %self.path.display(), error = %message, "index scan failed");
        self.progress
            .send_modify(|p| p.state = ScanState::Failed { kind, message });
    }
}
