//! Decoding of the tab-separated source dumps.
//!
//! All three dumps share the same conventions: one header row, `\N` for
//! null, comma-separated list fields, no quoting.

use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{GraphError, Result};
use crate::graph::types::{Person, Title};

/// Literal null marker used by the dumps.
pub const NULL_FIELD: &str = "\\N";

/// A row type that can be decoded from a source dump and looked up by key.
pub trait SourceRecord: Sized + Send + Sync + 'static {
    /// Exact number of columns a well-formed row has.
    const FIELD_COUNT: usize;

    /// Short name used in log lines.
    const KIND: &'static str;

    /// Key the record is indexed under.
    fn key(&self) -> &str;

    /// Decode a row whose width has already been checked.
    fn from_record(record: &StringRecord) -> Self;
}

/// Open a dump for streaming. The header row is consumed by the reader.
pub fn open_tsv(path: &Path) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| GraphError::file_access(path, e))?;
    Ok(ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::with_capacity(1 << 20, file)))
}

/// Reject rows whose width differs from `expected`.
pub fn check_width(record: &StringRecord, expected: usize, line: u64) -> Result<()> {
    if record.len() != expected {
        return Err(GraphError::RecordFormat {
            line,
            reason: format!("expected {} fields, found {}", expected, record.len()),
        });
    }
    Ok(())
}

/// Parse an optional integer; null or unparsable text is `None`.
pub fn parse_optional_int(field: &str) -> Option<i32> {
    if field == NULL_FIELD {
        return None;
    }
    field.trim().parse().ok()
}

/// Split a comma-separated list field; null is the empty list.
pub fn parse_list(field: &str) -> Vec<String> {
    if field == NULL_FIELD || field.is_empty() {
        return Vec::new();
    }
    field.split(',').map(str::to_string).collect()
}

fn text(record: &StringRecord, idx: usize) -> String {
    match record.get(idx) {
        Some(NULL_FIELD) | None => String::new(),
        Some(value) => value.to_string(),
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or(NULL_FIELD)
}

// ─── name.basics ────────────────────────────────────────────────

impl SourceRecord for Person {
    const FIELD_COUNT: usize = 6;
    const KIND: &'static str = "name";

    fn key(&self) -> &str {
        &self.id
    }

    fn from_record(record: &StringRecord) -> Self {
        Person {
            id: text(record, 0),
            primary_name: text(record, 1),
            birth_year: parse_optional_int(field(record, 2)),
            death_year: parse_optional_int(field(record, 3)),
            professions: parse_list(field(record, 4)),
            known_for: parse_list(field(record, 5)),
        }
    }
}

// ─── title.basics ───────────────────────────────────────────────

impl SourceRecord for Title {
    const FIELD_COUNT: usize = 9;
    const KIND: &'static str = "title";

    fn key(&self) -> &str {
        &self.id
    }

    fn from_record(record: &StringRecord) -> Self {
        Title {
            id: text(record, 0),
            title_type: text(record, 1),
            title: text(record, 2),
            original_title: text(record, 3),
            is_adult: field(record, 4) == "1",
            start_year: parse_optional_int(field(record, 5)),
            end_year: parse_optional_int(field(record, 6)),
            runtime_minutes: parse_optional_int(field(record, 7)),
            genres: parse_list(field(record, 8)),
        }
    }
}

// ─── title.principals ───────────────────────────────────────────

/// One credit: a person attached to a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRow {
    pub title_id: String,
    pub person_id: String,
    pub category: String,
}

impl PrincipalRow {
    /// tconst, ordering, nconst, category, job, characters.
    pub const FIELD_COUNT: usize = 6;

    pub fn from_record(record: &StringRecord, line: u64) -> Result<Self> {
        check_width(record, Self::FIELD_COUNT, line)?;
        Ok(Self {
            title_id: text(record, 0),
            person_id: text(record, 2),
            category: text(record, 3),
        })
    }
}
