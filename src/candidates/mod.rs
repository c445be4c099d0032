//! Candidate exports from the extraction framework and their mapping to entities.

pub mod mapper;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EvalError, Result};

/// The narrow view of a framework candidate that entity mapping needs.
pub trait Candidate {
    /// Name of the source document.
    fn document_id(&self) -> &str;
    /// Text of the span at `index`, if the candidate has one.
    fn span_text(&self, index: usize) -> Option<&str>;
    /// Tokens sharing a table row with the span at `index`.
    fn row_context(&self, index: usize) -> Option<&[String]>;
}

/// One mention span as exported by the framework.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordedSpan {
    pub text: String,
    #[serde(default)]
    pub row_ngrams: Vec<String>,
}

/// A candidate read back from a JSON-lines export, with its marginal.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RecordedCandidate {
    pub document: String,
    pub spans: Vec<RecordedSpan>,
    pub probability: f64,
}

impl Candidate for RecordedCandidate {
    fn document_id(&self) -> &str {
        &self.document
    }

    fn span_text(&self, index: usize) -> Option<&str> {
        self.spans.get(index).map(|s| s.text.as_str())
    }

    fn row_context(&self, index: usize) -> Option<&[String]> {
        self.spans.get(index).map(|s| s.row_ngrams.as_slice())
    }
}

/// Load a JSON-lines candidate export; undecodable lines are logged and skipped.
pub fn read_candidates(path: &Path) -> Result<Vec<RecordedCandidate>> {
    let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
    let source_name = path.display().to_string();
    let mut candidates = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| EvalError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RecordedCandidate>(&line) {
            Ok(candidate) => candidates.push(candidate),
            Err(err) => {
                let err = EvalError::malformed(&source_name, idx as u64 + 1, err.to_string());
                warn!(%err, "skipping candidate");
            }
        }
    }
    info!(source = %source_name, candidates = candidates.len(), "loaded candidates");
    Ok(candidates)
}
