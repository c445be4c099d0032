//! Candidate → entity mapping.
//!
//! A candidate yields zero, one or two entities. Its unit comes from the tokens
//! in the same table row as the numeric span, and a row naming more than one
//! unit is ambiguous and yields nothing.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    candidates::Candidate,
    data::{gold::GoldPolicy, normalize},
    entity::{Attribute, Entity},
    error::{EvalError, QuantityError, Result},
    quantity::{self, Quantity, Unit},
};

/// What a candidate's spans stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Gain-bandwidth span at 0, supply-current span at 1.
    GainCurrent,
    /// One attribute read from the span at `span`.
    Single { attribute: Attribute, span: usize },
}

impl Relation {
    /// Op-amp candidates carry only the value span; transistor candidates
    /// lead with the part number.
    pub fn single(attribute: Attribute) -> Self {
        let span = match attribute {
            Attribute::TypGbp | Attribute::TypSupplyCurrent => 0,
            _ => 1,
        };
        Self::Single { attribute, span }
    }
}

/// Maps candidates to entities under a fixed [`GoldPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct EntityMapper {
    relation: Relation,
    plus_minus_doubling: bool,
}

impl EntityMapper {
    pub fn new(relation: Relation, policy: &GoldPolicy) -> Self {
        Self {
            relation,
            plus_minus_doubling: policy.plus_minus_doubling,
        }
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// The candidates that map to `entity`. Malformed candidates are skipped.
    pub fn candidates_for<'a, C: Candidate>(
        &self,
        entity: &Entity,
        candidates: &'a [C],
    ) -> Vec<&'a C> {
        candidates
            .iter()
            .filter(|candidate| match self.map(*candidate) {
                Ok(entities) => entities.contains(entity),
                Err(err) => {
                    debug!(%err, "skipping candidate");
                    false
                }
            })
            .collect()
    }

    /// Entities for one candidate.
    ///
    /// Ambiguous units and unparseable spans give an empty list. A candidate
    /// with no document or without the expected spans is a malformed row.
    pub fn map<C: Candidate + ?Sized>(&self, candidate: &C) -> Result<Vec<Entity>> {
        let document = candidate.document_id().trim();
        if document.is_empty() {
            return Err(EvalError::malformed("candidate", 0, "empty document id"));
        }
        match self.relation {
            Relation::GainCurrent => {
                let gains = self.quantities_at(candidate, 0, Attribute::TypGbp)?;
                if gains.is_empty() {
                    return Ok(Vec::new());
                }
                let currents = self.quantities_at(candidate, 1, Attribute::TypSupplyCurrent)?;
                Ok(gains
                    .iter()
                    .flat_map(|gain| {
                        currents
                            .iter()
                            .map(move |current| Entity::pair(document, *gain, *current))
                    })
                    .collect())
            }
            Relation::Single {
                attribute: Attribute::Polarity,
                span,
            } => {
                let text = span_text(candidate, document, span)?;
                Ok(normalize::polarity_normalizer(text)
                    .map(|label| vec![Entity::label(document, &label)])
                    .unwrap_or_default())
            }
            Relation::Single { attribute, span } => Ok(self
                .quantities_at(candidate, span, attribute)?
                .into_iter()
                .map(|q| Entity::quantity(document, q))
                .collect()),
        }
    }

    fn quantities_at<C: Candidate + ?Sized>(
        &self,
        candidate: &C,
        index: usize,
        attribute: Attribute,
    ) -> Result<Vec<Quantity>> {
        let document = candidate.document_id();
        let text = span_text(candidate, document, index)?;
        let context = candidate.row_context(index).unwrap_or_default();
        let unit = match row_unit(context, attribute) {
            Ok(Some(unit)) => unit,
            Ok(None) => return Ok(Vec::new()),
            Err(EvalError::AmbiguousUnit(tokens)) => {
                debug!(%document, %attribute, ?tokens, "ambiguous unit tokens");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        match span_quantities(text, unit, self.plus_minus_doubling) {
            Ok(quantities) => Ok(quantities),
            Err(err) => {
                debug!(%document, %attribute, span = %text, %err, "span is not a valid quantity");
                Ok(Vec::new())
            }
        }
    }
}

fn span_text<'c, C: Candidate + ?Sized>(
    candidate: &'c C,
    document: &str,
    index: usize,
) -> Result<&'c str> {
    candidate.span_text(index).ok_or_else(|| {
        EvalError::malformed(
            format!("candidate in {document}"),
            0,
            format!("missing span {index}"),
        )
    })
}

/// Resolve the unit named in a span's row.
///
/// `Ok(None)` means the row names no usable unit and the attribute has no
/// default; [`EvalError::AmbiguousUnit`] means it names more than one.
pub fn row_unit(context: &[String], attribute: Attribute) -> Result<Option<Unit>> {
    let tokens: BTreeSet<String> = context
        .iter()
        .map(|token| token.replace(quantity::OCR_MICRO, "μ"))
        .filter(|token| attribute.is_unit_token(token))
        .collect();
    if tokens.len() > 1 {
        return Err(EvalError::AmbiguousUnit(tokens.into_iter().collect()));
    }
    match tokens.into_iter().next() {
        Some(token) => match Unit::parse(&token) {
            Ok(unit) if Some(unit.dimension) == attribute.dimension() => Ok(Some(unit)),
            _ => {
                debug!(%token, %attribute, "unit token does not parse");
                Ok(None)
            }
        },
        None => Ok(attribute.default_unit()),
    }
}

/// Quantities for one span, applying `±` expansion when enabled.
pub fn span_quantities(
    text: &str,
    unit: Unit,
    plus_minus_doubling: bool,
) -> Result<Vec<Quantity>, QuantityError> {
    match normalize::symmetric_value(text) {
        Some(sym) => {
            let [nominal, doubled] = normalize::expand_symmetric(&sym.magnitude, unit)?;
            Ok(if plus_minus_doubling {
                vec![doubled, nominal]
            } else {
                vec![nominal]
            })
        }
        None => Ok(vec![Quantity::try_new(parse_span_number(text)?, unit)?]),
    }
}

fn parse_span_number(text: &str) -> Result<f64, QuantityError> {
    let cleaned = text.trim().replace(',', "");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(QuantityError::InvalidNumber(text.to_string())),
    }
}
