// File: src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading resources or assembling a simplifier.
///
/// Data conditions met during simplification (out-of-vocabulary words,
/// unknown taxonomy terms, empty candidate sets) are never errors; they
/// produce empty results instead.
#[derive(Debug, Error)]
pub enum SimplifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary decode error: {0}")]
    Decode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A filter or ranker needs an oracle that was not supplied.
    #[error("missing resource: {0}")]
    MissingResource(&'static str),

    /// The requested pipeline combination is declared unsupported.
    #[error("not implemented for this configuration: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, SimplifyError>;
