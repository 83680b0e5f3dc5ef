// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, resolving, or joining dataset tables.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// None of the candidate encodings decoded the file.
    #[error("could not decode {}: tried {}", path.display(), attempted.join(", "))]
    Decode {
        path: PathBuf,
        attempted: Vec<String>,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The inner join produced no rows at all.
    #[error(
        "join on `region` produced no rows ({unmatched_left} unmatched left, {unmatched_right} unmatched right)"
    )]
    JoinEmpty {
        unmatched_left: usize,
        unmatched_right: usize,
    },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("reading spreadsheet {}: {detail}", path.display())]
    Sheet { path: PathBuf, detail: String },

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

/// A required canonical column could not be produced from the source headers.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("no column for `{field}`; columns present: {columns:?}")]
    Unresolved { field: String, columns: Vec<String> },

    #[error("column `{column}` (for `{field}`) has non-numeric value {value:?} at row {row}")]
    NotNumeric {
        field: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("canonical table invariant violated: {detail}")]
    Invariant { detail: String },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
