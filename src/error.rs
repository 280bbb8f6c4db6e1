//! Error types.
//!
//! Each stage of the pipeline has its own error type. Wrappers always keep the
//! underlying cause as their `source`, so the full chain is available when the
//! binary reports a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Expanding a glob pattern failed.
#[derive(Debug, Error)]
pub enum EnumerationError {
    #[error("glob pattern must not be empty")]
    EmptyPattern,

    #[error("invalid glob pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("directory '{}' does not exist", root.display())]
    MissingRoot { root: PathBuf },

    #[error("could not read '{}' while expanding pattern", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single file could not be read.
#[derive(Debug, Error)]
#[error("failed to read '{}'", path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Building a snapshot failed.
///
/// The `Read` variant is the aggregate failure of the concurrent batch: the
/// first read error observed aborts the whole build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("creating backup file map")]
    Enumerate(#[source] EnumerationError),

    #[error("encountered error reading and encoding files")]
    Read(#[source] ReadError),
}

/// The destination file could not be written.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("could not resolve output path '{}'", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize snapshot")]
    Serialize(#[source] serde_json::Error),

    #[error("could not write '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Missing or invalid command-line input.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("a glob pattern is required")]
    MissingPattern,

    #[error("an output file is required")]
    MissingOutFile,

    #[error("unsupported format '{0}' (expected json, csv or tsv)")]
    UnsupportedFormat(String),
}
