//! Entity-level scoring against gold.

pub mod sweep;

use std::collections::HashSet;

use serde::Serialize;

use crate::entity::Entity;

/// Precision/recall/F1 with the literal TP/FP/FN sets, sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Score {
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
    pub true_positives: Vec<Entity>,
    pub false_positives: Vec<Entity>,
    pub false_negatives: Vec<Entity>,
}

impl Score {
    /// Starting point of a sweep: every real F1 beats it.
    pub fn zero() -> Self {
        Self {
            f1: 0.0,
            precision: 0.0,
            recall: 0.0,
            true_positives: Vec::new(),
            false_positives: Vec::new(),
            false_negatives: Vec::new(),
        }
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::zero()
    }
}

/// `(TP, FP, FN)` as plain set intersection and differences.
pub fn confusion_matrix<'a>(
    predicted: &'a HashSet<Entity>,
    gold: &'a HashSet<Entity>,
) -> (Vec<&'a Entity>, Vec<&'a Entity>, Vec<&'a Entity>) {
    let tp = predicted.intersection(gold).collect();
    let fp = predicted.difference(gold).collect();
    let fn_ = gold.difference(predicted).collect();
    (tp, fp, fn_)
}

fn sorted(mut entities: Vec<&Entity>) -> Vec<Entity> {
    entities.sort();
    entities.into_iter().cloned().collect()
}

/// Score `predicted` against `gold`.
///
/// Precision is NaN with no predictions, recall is NaN with no gold, and F1 is
/// NaN unless precision + recall is positive.
pub fn score(predicted: &HashSet<Entity>, gold: &HashSet<Entity>) -> Score {
    let (tp, fp, fn_) = confusion_matrix(predicted, gold);
    let (n_tp, n_fp, n_fn) = (tp.len() as f64, fp.len() as f64, fn_.len() as f64);

    let precision = if n_tp + n_fp > 0.0 {
        n_tp / (n_tp + n_fp)
    } else {
        f64::NAN
    };
    let recall = if n_tp + n_fn > 0.0 {
        n_tp / (n_tp + n_fn)
    } else {
        f64::NAN
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * (precision * recall) / (precision + recall)
    } else {
        f64::NAN
    };

    Score {
        f1,
        precision,
        recall,
        true_positives: sorted(tp),
        false_positives: sorted(fp),
        false_negatives: sorted(fn_),
    }
}
