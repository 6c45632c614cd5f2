//
//  builder.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use csv::StringRecord;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::engine::Graph;
use super::types::{Node, Person, Title};
use crate::config::MovieGraphConfig;
use crate::error::Result;
use crate::index::tsv::open_tsv;
use crate::index::{NameIndex, PrincipalRow, RecordLookup, TitleIndex};

/// Worker pool and queue sizing for one ingestion run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of worker tasks, independent of core count.
    pub workers: usize,
    /// Rows buffered between the reader and the workers.
    pub queue_capacity: usize,
    /// How often to log progress. Zero disables the progress log.
    pub progress_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 16,
            queue_capacity: 1024,
            progress_interval: Duration::from_secs(15),
        }
    }
}

impl PipelineConfig {
    pub fn from_config(config: &MovieGraphConfig) -> Self {
        Self {
            workers: config.ingest.workers,
            queue_capacity: config.ingest.queue_capacity,
            progress_interval: Duration::from_secs(config.ingest.progress_interval_secs),
        }
    }
}

/// Live counters, readable while the pipeline runs.
#[derive(Debug, Default)]
pub struct Progress {
    rows_read: AtomicU64,
    rows_enqueued: AtomicU64,
    rows_processed: AtomicU64,
    rows_skipped: AtomicU64,
    lookup_misses: AtomicU64,
    edges_linked: AtomicU64,
}

impl Progress {
    /// Rows pulled off the relation file, well-formed or not.
    pub fn rows_read(&self) -> u64 {
        self.rows_read.load(Ordering::Relaxed)
    }

    /// Rows handed to the job queue.
    pub fn rows_enqueued(&self) -> u64 {
        self.rows_enqueued.load(Ordering::Relaxed)
    }

    /// Rows a worker has finished with, linked or not.
    pub fn rows_processed(&self) -> u64 {
        self.rows_processed.load(Ordering::Relaxed)
    }

    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped.load(Ordering::Relaxed)
    }

    pub fn lookup_misses(&self) -> u64 {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    pub fn edges_linked(&self) -> u64 {
        self.edges_linked.load(Ordering::Relaxed)
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Summary of a finished ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub rows_read: u64,
    pub rows_processed: u64,
    /// Rows dropped for having the wrong column count.
    pub rows_skipped: u64,
    /// Rows whose person or title was not found.
    pub lookup_misses: u64,
    pub edges_linked: u64,
    pub elapsed: Duration,
}

/// Turns a principals file into person <-> title edges.
///
/// One blocking reader feeds a bounded queue; a fixed pool of workers
/// resolves both ends of each row and links them in the shared graph.
pub struct Pipeline<P, T> {
    graph: Arc<Graph>,
    names: Arc<P>,
    titles: Arc<T>,
    config: PipelineConfig,
    progress: Arc<Progress>,
}

impl<P, T> Pipeline<P, T>
where
    P: RecordLookup<Person>,
    T: RecordLookup<Title>,
{
    pub fn new(graph: Arc<Graph>, names: P, titles: T, config: PipelineConfig) -> Self {
        Self {
            graph,
            names: Arc::new(names),
            titles: Arc::new(titles),
            config,
            progress: Arc::new(Progress::default()),
        }
    }

    /// Counters shared with the running pipeline.
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Ingest every row of `principals`.
    ///
    /// Returns once the reader has hit end of input and every queued row
    /// has been handled. Failing to open the file, or an index failing to
    /// open its own source, aborts the run.
    pub async fn run(&self, principals: &Path) -> Result<IngestReport> {
        let started = Instant::now();
        let reader = open_tsv(principals)?;

        let workers = self.config.workers.max(1);
        let (tx, rx) = mpsc::channel(self.config.queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        info!(
            path = %principals.display(),
            workers,
            queue_capacity = self.config.queue_capacity,
            "ingestion started"
        );

        let progress = Arc::clone(&self.progress);
        let reader_handle = tokio::task::spawn_blocking(move || read_rows(reader, tx, &progress));

        let worker_handles: Vec<JoinHandle<Result<()>>> = (0..workers)
            .map(|id| {
                tokio::spawn(work(
                    id,
                    Arc::clone(&rx),
                    Arc::clone(&self.names),
                    Arc::clone(&self.titles),
                    Arc::clone(&self.graph),
                    Arc::clone(&self.progress),
                ))
            })
            .collect();
        // Only workers hold the receiver, so the reader stops if they all exit.
        drop(rx);

        let reporter = (!self.config.progress_interval.is_zero()).then(|| {
            tokio::spawn(report_progress(
                Arc::clone(&self.progress),
                self.config.progress_interval,
                started,
            ))
        });

        let mut first_error = None;
        for handle in worker_handles {
            if let Err(e) = flatten(handle.await) {
                first_error.get_or_insert(e);
            }
        }
        if let Err(e) = flatten(reader_handle.await) {
            first_error.get_or_insert(e);
        }
        if let Some(reporter) = reporter {
            reporter.abort();
        }

        if let Some(e) = first_error {
            warn!(error = %e, "ingestion aborted");
            return Err(e);
        }

        let report = self.report(started.elapsed());
        info!(
            rows_read = report.rows_read,
            rows_processed = report.rows_processed,
            rows_skipped = report.rows_skipped,
            lookup_misses = report.lookup_misses,
            edges_linked = report.edges_linked,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "ingestion complete"
        );
        Ok(report)
    }

    fn report(&self, elapsed: Duration) -> IngestReport {
        IngestReport {
            rows_read: self.progress.rows_read(),
            rows_processed: self.progress.rows_processed(),
            rows_skipped: self.progress.rows_skipped(),
            lookup_misses: self.progress.lookup_misses(),
            edges_linked: self.progress.edges_linked(),
            elapsed,
        }
    }
}

/// Build a graph from the three source files named in `config`.
pub async fn build_graph(config: &MovieGraphConfig) -> Result<(Arc<Graph>, IngestReport)> {
    let batch = config.ingest.scan_batch_size;
    let names = NameIndex::with_batch_size(&config.data.names_path, batch);
    let titles = TitleIndex::with_batch_size(&config.data.titles_path, batch);

    let graph = Arc::new(Graph::new());
    let pipeline = Pipeline::new(
        Arc::clone(&graph),
        names,
        titles,
        PipelineConfig::from_config(config),
    );
    let report = pipeline.run(&config.data.principals_path).await?;
    Ok((graph, report))
}

// ─── Tasks ──────────────────────────────────────────────────────

fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    joined?
}

/// Reader: stream rows into the queue, blocking while it is full.
fn read_rows(
    mut reader: csv::Reader<std::io::BufReader<std::fs::File>>,
    tx: mpsc::Sender<PrincipalRow>,
    progress: &Progress,
) -> Result<()> {
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                Progress::bump(&progress.rows_read);
                Progress::bump(&progress.rows_skipped);
                trace!(error = %e, "skipping unreadable principal row");
                continue;
            }
        }
        Progress::bump(&progress.rows_read);

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = match PrincipalRow::from_record(&record, line) {
            Ok(row) => row,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                Progress::bump(&progress.rows_skipped);
                trace!(error = %e, "skipping principal row");
                continue;
            }
        };

        if tx.blocking_send(row).is_err() {
            debug!("job queue closed, reader stopping");
            break;
        }
        Progress::bump(&progress.rows_enqueued);
    }
    Ok(())
}

/// Worker: resolve both ends of a row and link them.
async fn work<P, T>(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<PrincipalRow>>>,
    names: Arc<P>,
    titles: Arc<T>,
    graph: Arc<Graph>,
    progress: Arc<Progress>,
) -> Result<()>
where
    P: RecordLookup<Person>,
    T: RecordLookup<Title>,
{
    loop {
        let next = rx.lock().await.recv().await;
        let Some(row) = next else {
            break;
        };

        let (person, title) = tokio::join!(
            names.lookup(&row.person_id),
            titles.lookup(&row.title_id)
        );

        match (person?, title?) {
            (Some(person), Some(title)) => {
                if !graph.contains(&person.id) {
                    graph.add_vertex(Node::person(Person::clone(&person)));
                }
                if !graph.contains(&title.id) {
                    graph.add_vertex(Node::title(Title::clone(&title)));
                }
                graph.add_edge(&person.id, &title.id, false);
                Progress::bump(&progress.edges_linked);
            }
            (person, title) => {
                debug!(
                    worker = id,
                    person = %row.person_id,
                    title = %row.title_id,
                    person_found = person.is_some(),
                    title_found = title.is_some(),
                    "lookup miss, row skipped"
                );
                Progress::bump(&progress.lookup_misses);
            }
        }
        Progress::bump(&progress.rows_processed);
    }
    trace!(worker = id, "worker finished");
    Ok(())
}

async fn report_progress(progress: Arc<Progress>, every: Duration, started: Instant) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        info!(
            rows_read = progress.rows_read(),
            rows_processed = progress.rows_processed(),
            edges_linked = progress.edges_linked(),
            elapsed_secs = started.elapsed().as_secs(),
            "ingestion progress"
        );
    }
}
