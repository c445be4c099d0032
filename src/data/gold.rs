//! Gold annotation loading.
//!
//! Gold CSVs carry `(document, part, attribute, value)` rows without a header.
//! Values are normalised per attribute, `±` readings are expanded according to
//! [`GoldPolicy`], and the result is a set of [`Entity`] keyed by upper-cased
//! document names.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    path::Path,
    str::FromStr,
};

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    data::normalize::{self, GoldValue},
    entity::{Attribute, Entity},
    error::{EvalError, Result},
    quantity::Quantity,
};

/// How gain and supply-current readings of one document are paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Pairing {
    /// Every gain with every current of the document. Over-approximates.
    #[default]
    CrossProduct,
    /// Only readings annotated on the same part number.
    SamePart,
}

impl FromStr for Pairing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cross-product" | "cross_product" => Ok(Self::CrossProduct),
            "same-part" | "same_part" => Ok(Self::SamePart),
            other => Err(format!("unknown pairing `{other}`")),
        }
    }
}

/// Domain rules applied while building gold and predicted entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoldPolicy {
    /// `±x` admits both `x` and `2x`.
    pub plus_minus_doubling: bool,
    pub pairing: Pairing,
}

impl Default for GoldPolicy {
    fn default() -> Self {
        Self {
            plus_minus_doubling: true,
            pairing: Pairing::CrossProduct,
        }
    }
}

/// One raw row of a gold CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldRow {
    pub document: String,
    pub part: String,
    pub attribute: String,
    pub value: String,
}

/// Immutable reference set for one scoring run.
#[derive(Debug, Clone, Default)]
pub struct GoldSet {
    source: String,
    entities: HashSet<Entity>,
}

impl GoldSet {
    pub fn new(source: impl Into<String>, entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            source: source.into(),
            entities: entities.into_iter().collect(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn entities(&self) -> &HashSet<Entity> {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        self.entities.contains(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn documents(&self) -> BTreeSet<String> {
        self.entities.iter().map(|e| e.document.clone()).collect()
    }

    /// Keep only entities whose document is in `documents`.
    pub fn filter_documents(&self, documents: &HashSet<String>) -> GoldSet {
        let entities: HashSet<Entity> = self
            .entities
            .iter()
            .filter(|e| documents.contains(&e.document))
            .cloned()
            .collect();
        if entities.is_empty() {
            error!(
                source = %self.source,
                documents = self.documents().len(),
                "filtering gold documents turned up empty"
            );
        }
        GoldSet {
            source: self.source.clone(),
            entities,
        }
    }

    /// Gold sets must never be empty when a run starts scoring.
    pub fn ensure_non_empty(self) -> Result<Self> {
        if self.is_empty() {
            error!(source = %self.source, "gold set is empty");
            return Err(EvalError::EmptyGoldSet {
                source_name: self.source,
            });
        }
        Ok(self)
    }
}

/// Read raw gold rows, skipping any with the wrong column count.
pub fn read_gold_rows(path: &Path) -> Result<Vec<GoldRow>> {
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
                warn!(source = %source_name, %err, "unreadable gold row, skipping");
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.len() != 4 {
            let err = EvalError::malformed(
                &source_name,
                line,
                format!("expected 4 columns, found {}", record.len()),
            );
            warn!(%err, "skipping gold row");
            continue;
        }
        rows.push(GoldRow {
            document: record[0].trim().to_string(),
            part: record[1].trim().to_string(),
            attribute: record[2].trim().to_string(),
            value: record[3].trim().to_string(),
        });
    }
    info!(source = %source_name, rows = rows.len(), "loaded gold rows");
    Ok(rows)
}

fn in_corpus(document: &str, documents: Option<&HashSet<String>>) -> bool {
    documents.map_or(true, |docs| docs.contains(&document.to_uppercase()))
}

fn source_label<P: AsRef<Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|p| p.as_ref().display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn normalize_row(row: &GoldRow, attribute: Attribute, policy: &GoldPolicy) -> Option<GoldValue> {
    match normalize::normalize_gold_value(attribute, &row.value, policy.plus_minus_doubling) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(document = %row.document, %attribute, value = %row.value, %err, "skipping gold value");
            None
        }
    }
}

/// Gold entities `(document, value)` for a single attribute.
pub fn load_attribute_gold<P: AsRef<Path>>(
    paths: &[P],
    attribute: Attribute,
    documents: Option<&HashSet<String>>,
    policy: &GoldPolicy,
) -> Result<GoldSet> {
    let mut entities = HashSet::new();
    for path in paths {
        for row in read_gold_rows(path.as_ref())? {
            if row.attribute != attribute.as_str() || !in_corpus(&row.document, documents) {
                continue;
            }
            match normalize_row(&row, attribute, policy) {
                Some(GoldValue::Quantities(values)) => {
                    entities.extend(values.into_iter().map(|q| Entity::quantity(&row.document, q)));
                }
                Some(GoldValue::Label(label)) => {
                    entities.insert(Entity::label(&row.document, &label));
                }
                None => {}
            }
        }
    }
    let gold = GoldSet::new(source_label(paths), entities);
    info!(source = %gold.source(), %attribute, entities = gold.len(), "built gold set");
    Ok(gold)
}

#[derive(Debug, Default)]
struct PartReadings {
    gains: Vec<Quantity>,
    currents: Vec<Quantity>,
}

/// Gold `(document, gain, current)` tuples for op-amps.
///
/// Pairing follows `policy.pairing`; the default cross product treats every
/// gain/current combination of a datasheet as valid, which is known to be broad.
pub fn load_paired_gold<P: AsRef<Path>>(
    paths: &[P],
    documents: Option<&HashSet<String>>,
    policy: &GoldPolicy,
) -> Result<GoldSet> {
    let mut by_document: IndexMap<String, IndexMap<String, PartReadings>> = IndexMap::new();
    for path in paths {
        for row in read_gold_rows(path.as_ref())? {
            let attribute = match row.attribute.parse::<Attribute>() {
                Ok(attr @ (Attribute::TypGbp | Attribute::TypSupplyCurrent)) => attr,
                _ => continue,
            };
            if !in_corpus(&row.document, documents) {
                continue;
            }
            let Some(GoldValue::Quantities(values)) = normalize_row(&row, attribute, policy) else {
                continue;
            };
            let readings = by_document
                .entry(row.document.to_uppercase())
                .or_default()
                .entry(normalize::part_normalizer(&row.part))
                .or_default();
            match attribute {
                Attribute::TypGbp => readings.gains.extend(values),
                _ => readings.currents.extend(values),
            }
        }
    }

    let mut entities = HashSet::new();
    for (document, parts) in &by_document {
        match policy.pairing {
            Pairing::CrossProduct => {
                let gains: Vec<&Quantity> = parts.values().flat_map(|p| p.gains.iter()).collect();
                let currents: Vec<&Quantity> =
                    parts.values().flat_map(|p| p.currents.iter()).collect();
                for gain in &gains {
                    for current in &currents {
                        entities.insert(Entity::pair(document, **gain, **current));
                    }
                }
            }
            Pairing::SamePart => {
                for readings in parts.values() {
                    for gain in &readings.gains {
                        for current in &readings.currents {
                            entities.insert(Entity::pair(document, *gain, *current));
                        }
                    }
                }
            }
        }
    }
    let gold = GoldSet::new(source_label(paths), entities);
    info!(
        source = %gold.source(),
        pairing = ?policy.pairing,
        documents = by_document.len(),
        entities = gold.len(),
        "built paired gold set"
    );
    Ok(gold)
}

/// Group entity values by document, for annotating discrepancy reports.
pub fn values_by_document<'a, I>(entities: I) -> HashMap<String, Vec<String>>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for entity in entities {
        map.entry(entity.document.clone())
            .or_default()
            .push(entity.value.to_string());
    }
    for values in map.values_mut() {
        values.sort();
        values.dedup();
    }
    map
}
