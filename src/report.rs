//! Score banners, JSON summaries and discrepancy CSVs.

use std::{collections::HashMap, fmt, path::Path};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    data::probs::WriteMode,
    entity::Entity,
    error::{EvalError, Result},
    scoring::{sweep::SweepOutcome, Score},
};

pub const DISCREPANCY_HEADER: [&str; 4] = ["document", "type", "value", "matched_value"];

/// Which side of the confusion matrix a mismatch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mismatch {
    #[serde(rename = "FP")]
    FalsePositive,
    #[serde(rename = "FN")]
    FalseNegative,
}

impl Mismatch {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FalsePositive => "FP",
            Self::FalseNegative => "FN",
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write one mismatch class to `path`.
///
/// `matched` maps each document to the values on the other side: gold values
/// for false positives, predicted values for false negatives. Rows are sorted
/// so reports diff cleanly between runs.
pub fn write_discrepancies<'a, I>(
    path: &Path,
    entities: I,
    kind: Mismatch,
    matched: &HashMap<String, Vec<String>>,
    mode: WriteMode,
) -> Result<usize>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let mut entities: Vec<&Entity> = entities.into_iter().collect();
    entities.sort();

    let (file, write_header) = mode.open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if write_header {
        writer.write_record(DISCREPANCY_HEADER)?;
    }
    for entity in &entities {
        let matched_value = matched
            .get(&entity.document)
            .map(|values| values.join("; "))
            .unwrap_or_default();
        writer.write_record([
            entity.document.as_str(),
            kind.as_str(),
            entity.value.to_string().as_str(),
            matched_value.as_str(),
        ])?;
    }
    writer.flush().map_err(|e| EvalError::io(path, e))?;
    info!(path = %path.display(), %kind, rows = entities.len(), "wrote discrepancies");
    Ok(entities.len())
}

/// Log the score banner for a chosen threshold.
pub fn log_score(label: &str, threshold: f64, score: &Score) {
    info!("===================================================");
    info!("Scoring {label} on entity-level gold data with b={threshold:.3}");
    info!("===================================================");
    info!("Corpus Precision {:.3}", score.precision);
    info!("Corpus Recall    {:.3}", score.recall);
    info!("Corpus F1        {:.3}", score.f1);
    info!("---------------------------------------------------");
    info!(
        "TP: {} | FP: {} | FN: {}",
        score.true_positives.len(),
        score.false_positives.len(),
        score.false_negatives.len()
    );
    info!("===================================================");
}

/// Serializable digest of a sweep, without the entity lists.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSummary {
    pub label: String,
    pub threshold: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub evaluated: usize,
    pub aborted: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl ScoreSummary {
    pub fn from_outcome(label: impl Into<String>, outcome: &SweepOutcome) -> Self {
        Self {
            label: label.into(),
            threshold: outcome.threshold,
            precision: outcome.score.precision,
            recall: outcome.score.recall,
            f1: outcome.score.f1,
            true_positives: outcome.score.true_positives.len(),
            false_positives: outcome.score.false_positives.len(),
            false_negatives: outcome.score.false_negatives.len(),
            evaluated: outcome.evaluated,
            aborted: outcome.aborted.clone(),
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
