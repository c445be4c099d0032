use std::{collections::HashSet, fs};

use datasheet_eval::{
    candidates::{read_candidates, Candidate},
    data::{
        documents,
        probs::{self, ScoredEntity, WriteMode},
    },
    Attribute, Entity, Quantity, Unit,
};
use tempfile::TempDir;

#[test]
fn pdf_directory_lists_upper_cased_stems() {
    let dir = TempDir::new().unwrap();
    for name in ["ad8001.pdf", "LM358.PDF", "notes.txt"] {
        fs::write(dir.path().join(name), b"").unwrap();
    }
    let names = documents::filenames_from_dir(dir.path()).unwrap();
    let expected: HashSet<String> = ["AD8001", "LM358"].iter().map(|s| s.to_string()).collect();
    assert_eq!(names, expected);
}

#[test]
fn filename_csv_or_directory_both_resolve() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("filenames.csv");
    fs::write(&csv, "bc547,extra\nbc548\n\n").unwrap();
    let names = documents::load_documents(&csv).unwrap();
    assert_eq!(names.len(), 2);
    assert!(names.contains("BC547"));
}

#[test]
fn candidate_export_skips_undecodable_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("candidates.jsonl");
    fs::write(
        &path,
        concat!(
            r#"{"document":"ad8001","spans":[{"text":"1.3","row_ngrams":["MHz"]}],"probability":0.8}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"document":"lm358","spans":[{"text":"450"}],"probability":0.2}"#,
            "\n",
        ),
    )
    .unwrap();

    let candidates = read_candidates(&path).unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].document_id(), "ad8001");
    assert_eq!(candidates[0].row_context(0).unwrap(), ["MHz".to_string()]);
    assert!(candidates[1].row_context(0).unwrap().is_empty());
    assert_eq!(candidates[1].span_text(1), None);
}

#[test]
fn probability_dump_is_read_back_in_report_units() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gain_dev_probs.csv");
    let rows = vec![
        ScoredEntity {
            entity: Entity::quantity("ad8001", Quantity::new(1.3, Unit::MEGAHERTZ)),
            probability: 0.75,
        },
        ScoredEntity {
            entity: Entity::quantity("lm358", Quantity::new(1.0, Unit::MEGAHERTZ)),
            probability: 0.25,
        },
    ];
    probs::write_probabilities(&path, &rows, Attribute::TypGbp, WriteMode::Overwrite).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("AD8001,1300,0.75\n"));

    let read = probs::read_probabilities(&path, Attribute::TypGbp).unwrap();
    assert_eq!(read, rows);
}

#[test]
fn malformed_dump_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probs.csv");
    fs::write(&path, "bc547,npn,0.9\nbc548,pnp\n,npn,0.4\nbc549,pnp,high\n").unwrap();
    let read = probs::read_probabilities(&path, Attribute::Polarity).unwrap();
    assert_eq!(
        read,
        vec![ScoredEntity {
            entity: Entity::label("BC547", "NPN"),
            probability: 0.9,
        }]
    );
}

#[test]
fn non_finite_dump_values_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gain_dev_probs.csv");
    fs::write(
        &path,
        "ad8001,nan,0.9\nad8001,NaN,0.8\nad8001,inf,0.7\nad8001,1e308,0.6\nad8001,1300,nan\nlm358,1000,0.5\n",
    )
    .unwrap();
    let read = probs::read_probabilities(&path, Attribute::TypGbp).unwrap();
    assert_eq!(
        read,
        vec![ScoredEntity {
            entity: Entity::quantity("lm358", Quantity::new(1.0, Unit::MEGAHERTZ)),
            probability: 0.5,
        }]
    );
}

#[test]
fn append_mode_extends_a_dump() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("probs.csv");
    let row = ScoredEntity {
        entity: Entity::quantity("q1", Quantity::new(45.0, Unit::VOLT)),
        probability: 0.5,
    };
    for mode in [WriteMode::Overwrite, WriteMode::Append] {
        probs::write_probabilities(&path, std::slice::from_ref(&row), Attribute::CeVMax, mode)
            .unwrap();
    }
    let read = probs::read_probabilities(&path, Attribute::CeVMax).unwrap();
    assert_eq!(read.len(), 2);
}
