use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: wrong file format (expected at least {expected} tab-separated fields, found {found})")]
    Format {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid {field} {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
}
