//! Probability dumps: `(document, normalized_value, probability)` CSV rows.

use std::{
    fs::{File, OpenOptions},
    path::Path,
};

use serde::Serialize;
use tracing::{error, info};

use crate::{
    entity::{Attribute, Entity, EntityValue},
    error::{EvalError, Result},
    quantity::{self, Quantity},
};

/// An entity together with the model's probability for its candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntity {
    pub entity: Entity,
    pub probability: f64,
}

/// Whether a CSV writer truncates or extends its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

impl WriteMode {
    pub fn from_append(append: bool) -> Self {
        if append {
            Self::Append
        } else {
            Self::Overwrite
        }
    }

    /// Open `path`; `true` in the second slot means a header should be written.
    pub fn open(self, path: &Path) -> Result<(File, bool)> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
        match self {
            Self::Overwrite => {
                let file = File::create(path).map_err(|e| EvalError::io(path, e))?;
                Ok((file, true))
            }
            Self::Append => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| EvalError::io(path, e))?;
                let empty = file.metadata().map(|m| m.len() == 0).unwrap_or(true);
                Ok((file, empty))
            }
        }
    }
}

fn parse_row(
    record: &csv::StringRecord,
    attribute: Attribute,
    source_name: &str,
) -> Result<ScoredEntity> {
    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let malformed = |reason: String| EvalError::malformed(source_name, line, reason);
    if record.len() != 3 {
        return Err(malformed(format!("expected 3 columns, found {}", record.len())));
    }
    let document = record[0].trim();
    if document.is_empty() {
        return Err(malformed("empty document name".to_string()));
    }
    let probability = quantity::parse_number(&record[2])
        .map_err(|_| malformed(format!("probability `{}` is not a finite number", &record[2])))?;
    let entity = match attribute.report_unit() {
        Some(unit) => {
            let value = quantity::parse_number(&record[1])?;
            Entity::quantity(document, Quantity::try_new(value, unit)?)
        }
        None => Entity::label(document, &record[1]),
    };
    Ok(ScoredEntity {
        entity,
        probability,
    })
}

/// Load a probability dump; malformed rows are logged and skipped.
pub fn read_probabilities(path: &Path, attribute: Attribute) -> Result<Vec<ScoredEntity>> {
    let source_name = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                error!(source = %source_name, %err, "while getting entity set");
                continue;
            }
        };
        match parse_row(&record, attribute, &source_name) {
            Ok(row) => rows.push(row),
            Err(err) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                error!(source = %source_name, line, %err, "while getting entity set");
            }
        }
    }
    info!(source = %source_name, %attribute, rows = rows.len(), "loaded probability dump");
    Ok(rows)
}

/// Render an entity value in the attribute's report unit.
pub fn normalized_value(entity: &Entity, attribute: Attribute) -> String {
    match (&entity.value, attribute.report_unit()) {
        (EntityValue::Quantity(q), Some(unit)) => q
            .value_in(unit)
            .map(|v| v.to_string())
            .unwrap_or_else(|| q.to_string()),
        (value, _) => value.to_string(),
    }
}

/// Write scored entities without a header, matching what [`read_probabilities`] reads.
pub fn write_probabilities(
    path: &Path,
    rows: &[ScoredEntity],
    attribute: Attribute,
    mode: WriteMode,
) -> Result<usize> {
    let (file, _) = mode.open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    for row in rows {
        writer.write_record([
            row.entity.document.as_str(),
            normalized_value(&row.entity, attribute).as_str(),
            row.probability.to_string().as_str(),
        ])?;
    }
    writer
        .flush()
        .map_err(|e| EvalError::io(path, e))?;
    info!(path = %path.display(), rows = rows.len(), "wrote probability dump");
    Ok(rows.len())
}
