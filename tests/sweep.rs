use std::collections::HashSet;

use datasheet_eval::{
    scoring::sweep::{accepted_entities, threshold_grid},
    score, sweep, Entity, EvalError, GoldSet, Quantity, SweepConfig, Unit,
};
use proptest::prelude::*;

type Item = (Entity, f64);

fn khz(document: &str, value: f64) -> Entity {
    Entity::quantity(document, Quantity::new(value, Unit::KILOHERTZ))
}

fn probability(item: &Item) -> f64 {
    item.1
}

fn gold(entities: &[Entity]) -> GoldSet {
    GoldSet::new("test gold", entities.iter().cloned())
}

#[test]
fn grid_includes_both_endpoints() {
    let grid = threshold_grid(5);
    assert_eq!(grid.to_vec(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(SweepConfig::default().grid().len(), 100);
}

#[test]
fn three_point_sweep_picks_best_threshold() {
    let gold = gold(&[khz("A", 1.0), khz("A", 2.0), khz("B", 1.0)]);
    let items: Vec<Item> = vec![
        (khz("A", 1.0), 0.9),
        (khz("A", 2.0), 0.4),
        (khz("C", 1.0), 0.6),
    ];
    let outcome = sweep(
        &items,
        probability,
        |item: &Item| Ok(vec![item.0.clone()]),
        &gold,
        &SweepConfig { points: 3 },
    )
    .unwrap();

    // t=0: P=R=2/3; t=0.5: P=1/2, R=1/3; t=1: nothing accepted.
    assert_eq!(outcome.threshold, 0.0);
    assert!((outcome.score.f1 - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(outcome.score.false_positives, vec![khz("C", 1.0)]);
    assert_eq!(outcome.score.false_negatives, vec![khz("B", 1.0)]);
    assert_eq!(outcome.evaluated, 3);
    assert!(outcome.aborted.is_none());
    assert_eq!(outcome.predictions.len(), 3);
}

#[test]
fn ties_keep_the_lower_threshold() {
    let gold = gold(&[khz("A", 1.0)]);
    let items: Vec<Item> = vec![(khz("A", 1.0), 0.9)];
    let outcome = sweep(
        &items,
        probability,
        |item: &Item| Ok(vec![item.0.clone()]),
        &gold,
        &SweepConfig { points: 5 },
    )
    .unwrap();
    assert_eq!(outcome.threshold, 0.0);
    assert_eq!(outcome.score.f1, 1.0);
}

#[test]
fn nothing_better_than_zero_keeps_the_initial_result() {
    let gold = gold(&[khz("A", 1.0)]);
    let items: Vec<Item> = vec![(khz("Z", 9.0), 0.7)];
    let outcome = sweep(
        &items,
        probability,
        |item: &Item| Ok(vec![item.0.clone()]),
        &gold,
        &SweepConfig { points: 4 },
    )
    .unwrap();
    assert_eq!(outcome.threshold, 0.0);
    assert_eq!(outcome.score.f1, 0.0);
    assert!(outcome.predictions.is_empty());
    assert_eq!(outcome.evaluated, 4);
}

#[test]
fn empty_gold_is_rejected() {
    let items: Vec<Item> = vec![(khz("A", 1.0), 0.7)];
    let result = sweep(
        &items,
        probability,
        |item: &Item| Ok(vec![item.0.clone()]),
        &gold(&[]),
        &SweepConfig::default(),
    );
    assert!(matches!(result, Err(EvalError::EmptyGoldSet { .. })));
}

#[test]
fn malformed_item_stops_the_sweep_but_keeps_the_best() {
    let gold = gold(&[khz("A", 1.0), khz("A", 2.0)]);
    let items: Vec<Item> = vec![(khz("A", 1.0), 0.9), (khz("A", 2.0), 0.4)];
    let mut calls = 0;
    let outcome = sweep(
        &items,
        probability,
        |item: &Item| {
            calls += 1;
            if calls > 2 {
                Err(EvalError::malformed("test", calls, "mapping failed"))
            } else {
                Ok(vec![item.0.clone()])
            }
        },
        &gold,
        &SweepConfig { points: 3 },
    )
    .unwrap();
    assert_eq!(outcome.evaluated, 1);
    assert_eq!(outcome.threshold, 0.0);
    assert_eq!(outcome.score.f1, 1.0);
    assert!(outcome.aborted.is_some());
}

#[test]
fn non_finite_probability_aborts() {
    let gold = gold(&[khz("A", 1.0)]);
    let items: Vec<Item> = vec![(khz("A", 1.0), f64::NAN)];
    let outcome = sweep(
        &items,
        probability,
        |item: &Item| Ok(vec![item.0.clone()]),
        &gold,
        &SweepConfig { points: 3 },
    )
    .unwrap();
    assert_eq!(outcome.evaluated, 0);
    assert!(outcome.aborted.is_some());
    assert_eq!(outcome.score.f1, 0.0);
}

proptest! {
    #[test]
    fn best_f1_dominates_every_grid_point(
        raw in prop::collection::vec((0u8..3, 0u8..5, 0.0f64..1.0), 1..25),
        gold_raw in prop::collection::vec((0u8..3, 0u8..5), 1..10),
        points in 1usize..12,
    ) {
        let items: Vec<Item> = raw
            .iter()
            .map(|(doc, value, p)| (khz(&format!("D{doc}"), f64::from(*value)), *p))
            .collect();
        let gold_entities: Vec<Entity> = gold_raw
            .iter()
            .map(|(doc, value)| khz(&format!("D{doc}"), f64::from(*value)))
            .collect();
        let gold = gold(&gold_entities);
        let config = SweepConfig { points };

        let outcome = sweep(
            &items,
            probability,
            |item: &Item| Ok(vec![item.0.clone()]),
            &gold,
            &config,
        )
        .unwrap();
        prop_assert!(outcome.evaluated <= points);
        prop_assert!(outcome.aborted.is_none());

        let mut to_entities =
            |item: &Item| -> datasheet_eval::error::Result<Vec<Entity>> { Ok(vec![item.0.clone()]) };
        for &threshold in threshold_grid(points).iter() {
            let accepted: HashSet<Entity> =
                accepted_entities(&items, threshold, &probability, &mut to_entities).unwrap();
            let result = score(&accepted, gold.entities());
            if !result.f1.is_nan() {
                prop_assert!(outcome.score.f1 >= result.f1);
            }
        }
    }
}
