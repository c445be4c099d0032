use datasheet_eval::{
    candidates::{mapper::Relation, RecordedSpan},
    data::{gold, probs::WriteMode},
    report::{self, Mismatch},
    sweep, Attribute, Entity, EntityMapper, GoldPolicy, GoldSet, Quantity, RecordedCandidate,
    SweepConfig, Unit,
};
use tempfile::TempDir;

fn volts(document: &str, value: f64) -> Entity {
    Entity::quantity(document, Quantity::new(value, Unit::VOLT))
}

fn transistor(part: &str, value: &str, row: &[&str], probability: f64) -> RecordedCandidate {
    RecordedCandidate {
        document: part.to_lowercase(),
        spans: vec![
            RecordedSpan {
                text: part.to_string(),
                row_ngrams: Vec::new(),
            },
            RecordedSpan {
                text: value.to_string(),
                row_ngrams: row.iter().map(|t| t.to_string()).collect(),
            },
        ],
        probability,
    }
}

#[test]
fn candidates_sweep_into_a_discrepancy_report() {
    let gold_set = GoldSet::new(
        "ce_v_max gold",
        [volts("Q1", 45.0), volts("Q1", 90.0), volts("Q2", 30.0)],
    );
    let candidates = vec![
        transistor("Q1", "±45", &["V"], 0.9),
        // Two voltage units in one row: no entity.
        transistor("Q2", "30", &["V", "mV"], 0.8),
        transistor("Q2", "60", &["V"], 0.6),
        // No unit token: the attribute default applies.
        transistor("Q2", "25", &[], 0.3),
    ];
    let mapper = EntityMapper::new(Relation::single(Attribute::CeVMax), &GoldPolicy::default());

    let outcome = sweep(
        &candidates,
        |c| c.probability,
        |c| mapper.map(c),
        &gold_set,
        &SweepConfig { points: 3 },
    )
    .unwrap();

    // t=0: P=1/2, R=2/3; t=0.5: P=R=2/3; t=1: nothing accepted.
    assert_eq!(outcome.threshold, 0.5);
    assert_eq!(outcome.evaluated, 3);
    assert!(outcome.aborted.is_none());
    let third = 2.0 / 3.0;
    assert!((outcome.score.precision - third).abs() < 1e-12);
    assert!((outcome.score.recall - third).abs() < 1e-12);
    assert!((outcome.score.f1 - third).abs() < 1e-12);
    assert_eq!(
        outcome.score.true_positives,
        vec![volts("Q1", 45.0), volts("Q1", 90.0)]
    );
    assert_eq!(outcome.score.false_positives, vec![volts("Q2", 60.0)]);
    assert_eq!(outcome.score.false_negatives, vec![volts("Q2", 30.0)]);

    let sources = mapper.candidates_for(&volts("Q2", 60.0), &candidates);
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].probability, 0.6);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ce_v_max_discrepancies.csv");
    report::write_discrepancies(
        &path,
        &outcome.score.false_positives,
        Mismatch::FalsePositive,
        &gold::values_by_document(gold_set.iter()),
        WriteMode::Overwrite,
    )
    .unwrap();
    report::write_discrepancies(
        &path,
        &outcome.score.false_negatives,
        Mismatch::FalseNegative,
        &gold::values_by_document(&outcome.predictions),
        WriteMode::Append,
    )
    .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(contents, @r"
    document,type,value,matched_value
    Q2,FP,60 V,30 V
    Q2,FN,30 V,60 V
    ");
}
