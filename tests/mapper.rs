use datasheet_eval::{
    candidates::{
        mapper::{self, Relation},
        RecordedSpan,
    },
    quantity::OCR_MICRO,
    Attribute, EntityMapper, Entity, EvalError, GoldPolicy, Quantity, RecordedCandidate, Unit,
};

fn span(text: &str, row: &[&str]) -> RecordedSpan {
    RecordedSpan {
        text: text.to_string(),
        row_ngrams: row.iter().map(|t| t.to_string()).collect(),
    }
}

fn candidate(document: &str, spans: Vec<RecordedSpan>) -> RecordedCandidate {
    RecordedCandidate {
        document: document.to_string(),
        spans,
        probability: 0.9,
    }
}

fn single(attribute: Attribute) -> EntityMapper {
    EntityMapper::new(Relation::single(attribute), &GoldPolicy::default())
}

#[test]
fn row_unit_scales_the_span() {
    let c = candidate("ad8001", vec![span("1,300", &["GBW", "kHz", "typ"])]);
    let entities = single(Attribute::TypGbp).map(&c).unwrap();
    assert_eq!(
        entities,
        vec![Entity::quantity("AD8001", Quantity::new(1.3, Unit::MEGAHERTZ))]
    );
}

#[test]
fn ambiguous_row_yields_nothing() {
    let c = candidate("ad8001", vec![span("1.3", &["MHz", "kHz"])]);
    assert!(single(Attribute::TypGbp).map(&c).unwrap().is_empty());

    let context = vec!["mA".to_string(), "μA".to_string()];
    assert!(matches!(
        mapper::row_unit(&context, Attribute::TypSupplyCurrent),
        Err(EvalError::AmbiguousUnit(tokens)) if tokens.len() == 2
    ));
}

#[test]
fn ocr_micro_is_read_as_micro() {
    let ocr = format!("{OCR_MICRO}A");
    let c = candidate("lm358", vec![span("450", &[ocr.as_str()])]);
    let entities = single(Attribute::TypSupplyCurrent).map(&c).unwrap();
    assert_eq!(
        entities,
        vec![Entity::quantity("LM358", Quantity::new(450.0, Unit::MICROAMPERE))]
    );
}

#[test]
fn ocr_and_greek_micro_in_one_row_are_one_unit() {
    let ocr = format!("{OCR_MICRO}A");
    let context = vec![ocr, "μA".to_string()];
    let unit = mapper::row_unit(&context, Attribute::TypSupplyCurrent).unwrap();
    assert_eq!(unit, Some(Unit::MICROAMPERE));
}

#[test]
fn missing_unit_falls_back_to_attribute_default() {
    let c = candidate("bc547", vec![span("BC547", &[]), span("-55", &["Tstg"])]);
    let entities = single(Attribute::StgTempMin).map(&c).unwrap();
    assert_eq!(
        entities,
        vec![Entity::quantity("BC547", Quantity::new(-55.0, Unit::CELSIUS))]
    );

    let gbp = candidate("ad8001", vec![span("1.3", &["GBW"])]);
    assert!(single(Attribute::TypGbp).map(&gbp).unwrap().is_empty());
}

#[test]
fn plus_minus_span_yields_both_readings() {
    let c = candidate("bc547", vec![span("BC547", &[]), span("±45", &["V"])]);
    let mut entities = single(Attribute::CeVMax).map(&c).unwrap();
    entities.sort();
    assert_eq!(
        entities,
        vec![
            Entity::quantity("BC547", Quantity::new(45.0, Unit::VOLT)),
            Entity::quantity("BC547", Quantity::new(90.0, Unit::VOLT)),
        ]
    );

    let nominal_only = GoldPolicy {
        plus_minus_doubling: false,
        ..GoldPolicy::default()
    };
    let mapper = EntityMapper::new(Relation::single(Attribute::CeVMax), &nominal_only);
    assert_eq!(mapper.map(&c).unwrap().len(), 1);
}

#[test]
fn polarity_becomes_a_label() {
    let c = candidate("bc547", vec![span("BC547", &[]), span("npn", &[])]);
    assert_eq!(
        single(Attribute::Polarity).map(&c).unwrap(),
        vec![Entity::label("BC547", "NPN")]
    );
}

#[test]
fn gain_current_candidates_map_to_pairs() {
    let c = candidate(
        "ad8001",
        vec![span("1.3", &["MHz"]), span("450", &["μA"])],
    );
    let mapper = EntityMapper::new(Relation::GainCurrent, &GoldPolicy::default());
    assert_eq!(
        mapper.map(&c).unwrap(),
        vec![Entity::pair(
            "AD8001",
            Quantity::new(1300.0, Unit::KILOHERTZ),
            Quantity::new(0.45, Unit::MILLIAMPERE),
        )]
    );
}

#[test]
fn malformed_candidates_are_errors() {
    let no_document = candidate("  ", vec![span("1.3", &["MHz"])]);
    assert!(matches!(
        single(Attribute::TypGbp).map(&no_document),
        Err(EvalError::MalformedRow { .. })
    ));

    let missing_span = candidate("bc547", vec![span("BC547", &[])]);
    assert!(matches!(
        single(Attribute::CeVMax).map(&missing_span),
        Err(EvalError::MalformedRow { .. })
    ));
}

#[test]
fn candidates_for_finds_every_source_of_an_entity() {
    let candidates = vec![
        candidate("bc547", vec![span("BC547", &[]), span("±45", &["V"])]),
        candidate("bc547", vec![span("BC547", &[]), span("90", &["V"])]),
        candidate("bc547", vec![span("BC547", &[]), span("90", &["V", "mV"])]),
        candidate("bc548", vec![span("BC548", &[]), span("90", &["V"])]),
        candidate("bc547", vec![span("BC547", &[])]),
    ];
    let mapper = single(Attribute::CeVMax);

    let doubled = Entity::quantity("BC547", Quantity::new(90.0, Unit::VOLT));
    let sources = mapper.candidates_for(&doubled, &candidates);
    assert_eq!(sources.len(), 2);
    assert!(std::ptr::eq(sources[0], &candidates[0]));
    assert!(std::ptr::eq(sources[1], &candidates[1]));

    let unseen = Entity::quantity("BC547", Quantity::new(30.0, Unit::VOLT));
    assert!(mapper.candidates_for(&unseen, &candidates).is_empty());
}
