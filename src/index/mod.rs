//! Lazy lookup indexes over the tab-separated source dumps.
//!
//! `tsv` knows the row layouts; `lazy` turns a dump into a key -> record
//! map that fills in the background while callers wait on it.

pub mod lazy;
pub mod tsv;

use std::future::Future;
use std::sync::Arc;

pub use lazy::{LazyFileIndex, ScanState, ScanStats, DEFAULT_BATCH_SIZE};
pub use tsv::{PrincipalRow, SourceRecord, NULL_FIELD};

use crate::error::Result;
use crate::graph::types::{Person, Title};

/// Index over `name.basics.tsv`.
pub type NameIndex = LazyFileIndex<Person>;

/// Index over `title.basics.tsv`.
pub type TitleIndex = LazyFileIndex<Title>;

/// Something that resolves a key to a record, possibly after waiting.
///
/// The ingestion pipeline only needs this much of an index.
pub trait RecordLookup<R>: Send + Sync + 'static {
    fn lookup(&self, key: &str) -> impl Future<Output = Result<Option<Arc<R>>>> + Send;
}

impl<R: SourceRecord> RecordLookup<R> for LazyFileIndex<R> {
    async fn lookup(&self, key: &str) -> Result<Option<Arc<R>>> {
        self.find(key).await
    }
}
