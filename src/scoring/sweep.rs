//! Decision-threshold sweep.
//!
//! Every grid point is scored; the best F1 wins and ties keep the lower
//! threshold. A malformed item stops the sweep but keeps the best result so far.

use std::collections::HashSet;

use ndarray::Array1;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::{
    data::gold::GoldSet,
    entity::Entity,
    error::{EvalError, Result},
    scoring::{self, Score},
};

pub const DEFAULT_POINTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepConfig {
    /// Number of evenly spaced thresholds over `[0, 1]`.
    pub points: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
        }
    }
}

impl SweepConfig {
    pub fn grid(&self) -> Array1<f64> {
        threshold_grid(self.points)
    }
}

/// `points` thresholds evenly spaced over `[0, 1]`, endpoints included.
pub fn threshold_grid(points: usize) -> Array1<f64> {
    Array1::linspace(0.0, 1.0, points)
}

/// Best threshold found and how the sweep went.
#[derive(Debug, Clone, Serialize)]
pub struct SweepOutcome {
    pub threshold: f64,
    pub score: Score,
    /// Entities predicted at the chosen threshold.
    #[serde(skip)]
    pub predictions: HashSet<Entity>,
    /// Thresholds actually scored.
    pub evaluated: usize,
    /// Why the sweep stopped before the end of the grid, if it did.
    pub aborted: Option<String>,
}

/// Entities of every item whose probability exceeds `threshold`.
pub fn accepted_entities<T, P, M>(
    items: &[T],
    threshold: f64,
    probability: &P,
    to_entities: &mut M,
) -> Result<HashSet<Entity>>
where
    P: Fn(&T) -> f64,
    M: FnMut(&T) -> Result<Vec<Entity>>,
{
    let mut entities = HashSet::new();
    for (idx, item) in items.iter().enumerate() {
        let p = probability(item);
        if !p.is_finite() {
            return Err(EvalError::malformed(
                "probabilities",
                idx as u64,
                format!("probability {p} is not finite"),
            ));
        }
        if p > threshold {
            entities.extend(to_entities(item)?);
        }
    }
    Ok(entities)
}

/// Sweep the grid of `config` and keep the threshold with the highest F1.
///
/// Fails up front on an empty gold set.
pub fn sweep<T, P, M>(
    items: &[T],
    probability: P,
    mut to_entities: M,
    gold: &GoldSet,
    config: &SweepConfig,
) -> Result<SweepOutcome>
where
    P: Fn(&T) -> f64,
    M: FnMut(&T) -> Result<Vec<Entity>>,
{
    if gold.is_empty() {
        error!(source = %gold.source(), "gold set is empty");
        return Err(EvalError::EmptyGoldSet {
            source_name: gold.source().to_string(),
        });
    }

    let mut outcome = SweepOutcome {
        threshold: 0.0,
        score: Score::zero(),
        predictions: HashSet::new(),
        evaluated: 0,
        aborted: None,
    };

    info!(items = items.len(), points = config.points, "determining best threshold");
    for &threshold in config.grid().iter() {
        let predicted = match accepted_entities(items, threshold, &probability, &mut to_entities) {
            Ok(predicted) => predicted,
            Err(err) => {
                error!(threshold, %err, "aborting threshold sweep");
                outcome.aborted = Some(err.to_string());
                break;
            }
        };
        let result = scoring::score(&predicted, gold.entities());
        outcome.evaluated += 1;
        debug!(
            threshold,
            f1 = result.f1,
            precision = result.precision,
            recall = result.recall,
            "scored threshold"
        );

        if result.f1 > outcome.score.f1 {
            outcome.score = result;
            outcome.threshold = threshold;
            outcome.predictions = predicted;
        }
    }
    Ok(outcome)
}
