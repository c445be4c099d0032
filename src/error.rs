//! Typed failures surfaced by the scoring library.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a quantity string could not be normalised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("`{0}` is not a number")]
    InvalidNumber(String),
    #[error("unrecognised unit `{0}`")]
    UnknownUnit(String),
    #[error("`{0}` is missing a unit")]
    MissingUnit(String),
    #[error("`{0}` is not a recognised label")]
    InvalidLabel(String),
}

/// Library error type; the binary wraps these in `anyhow`.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("malformed row {line} in {source_name}: {reason}")]
    MalformedRow {
        source_name: String,
        line: u64,
        reason: String,
    },
    #[error(transparent)]
    Quantity(#[from] QuantityError),
    #[error("gold set from {source_name} is empty")]
    EmptyGoldSet { source_name: String },
    #[error("ambiguous unit tokens {0:?}")]
    AmbiguousUnit(Vec<String>),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EvalError {
    pub fn malformed(source_name: impl Into<String>, line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            source_name: source_name.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = EvalError> = std::result::Result<T, E>;
