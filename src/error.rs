//! Error types for MovieGraph.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for MovieGraph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while building, persisting or querying the graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A source or snapshot file could not be opened or read.
    #[error("cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source row had the wrong shape. Scans skip these and keep going.
    #[error("malformed record at line {line}: {reason}")]
    RecordFormat { line: u64, reason: String },

    /// An edge in Edges.csv names a vertex that Index.csv does not contain.
    #[error("edge {from} -> {to} references unknown vertex {missing}")]
    ImportIntegrity {
        from: String,
        to: String,
        missing: String,
    },

    /// A vertex value failed to serialize or deserialize.
    #[error("cannot encode value of vertex {id}: {source}")]
    Encoding {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A snapshot row had the wrong number of columns.
    #[error("invalid row in {file} at line {line}: {reason}")]
    MalformedSnapshot {
        file: String,
        line: u64,
        reason: String,
    },

    /// A vertex ID that cannot be used as a single directory name.
    #[error("invalid vertex id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A background reader or worker task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GraphError {
    /// Wrap an IO error with the path that produced it.
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GraphError::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the surrounding operation.
    ///
    /// Row-level format problems are recoverable; everything else is fatal
    /// to the run that produced it.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GraphError::RecordFormat { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_format_is_recoverable() {
        let err = GraphError::RecordFormat {
            line: 7,
            reason: "expected 6 fields, found 3".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "malformed record at line 7: expected 6 fields, found 3"
        );
    }

    #[test]
    fn test_integrity_error_message() {
        let err = GraphError::ImportIntegrity {
            from: "nm1".to_string(),
            to: "tt9".to_string(),
            missing: "tt9".to_string(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("unknown vertex tt9"));
    }

    #[test]
    fn test_file_access_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = GraphError::file_access("/data/name.basics.tsv", io);
        assert!(err.to_string().contains("/data/name.basics.tsv"));
    }
}
