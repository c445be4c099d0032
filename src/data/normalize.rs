//! Normalisers applied to raw gold annotations before they become entities.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    entity::Attribute,
    error::QuantityError,
    quantity::{self, Quantity, Unit},
};

static PLUS_MINUS_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^±\s+").expect("valid regex"));

/// A value split from its `@ condition` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCondition {
    pub value: String,
    pub condition: Option<String>,
}

/// Split `XXX @ YYY` into value and condition; conditions are currently ignored.
pub fn split_val_condition(input: &str) -> ValueCondition {
    match input.split_once('@') {
        Some((value, condition)) => ValueCondition {
            value: value.trim().to_string(),
            condition: Some(condition.trim().to_string()),
        },
        None => ValueCondition {
            value: input.trim().to_string(),
            condition: None,
        },
    }
}

/// Part numbers compare without whitespace and case.
pub fn part_normalizer(part: &str) -> String {
    part.split_whitespace().collect::<String>().to_uppercase()
}

/// A `±`-prefixed number with its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Symmetric {
    pub magnitude: String,
    pub unit: String,
}

/// Recognise `±5 V` (or `± 5 V`) and return the unsigned magnitude.
pub fn symmetric_value(value: &str) -> Option<Symmetric> {
    let collapsed = PLUS_MINUS_GAP.replace(value.trim(), "±");
    let rest = collapsed.strip_prefix('±')?;
    let (magnitude, unit) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Some(Symmetric {
        magnitude: magnitude.to_string(),
        unit: unit.trim().to_string(),
    })
}

/// Expand a symmetric reading into the nominal and doubled quantities.
///
/// A `±5 V` supply means both `5 V` and the `10 V` span are valid readings.
pub fn expand_symmetric(magnitude: &str, unit: Unit) -> Result<[Quantity; 2], QuantityError> {
    let number = quantity::parse_number(magnitude)?;
    let invalid = |_| QuantityError::InvalidNumber(magnitude.to_string());
    let nominal = Quantity::try_new(number, unit).map_err(invalid)?;
    let doubled = Quantity::try_new(number * 2.0, unit).map_err(invalid)?;
    Ok([nominal, doubled])
}

/// Normalised gold reading for one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum GoldValue {
    Quantities(Vec<Quantity>),
    Label(String),
}

/// Turn a raw gold cell into its comparable form.
///
/// `plus_minus_doubling` controls whether `±x` also admits `2x`.
pub fn normalize_gold_value(
    attribute: Attribute,
    raw: &str,
    plus_minus_doubling: bool,
) -> Result<GoldValue, QuantityError> {
    let parsed = split_val_condition(raw);
    if attribute == Attribute::Polarity {
        return polarity_normalizer(&parsed.value).map(GoldValue::Label);
    }
    if let Some(sym) = symmetric_value(&parsed.value) {
        let unit = match attribute.default_unit() {
            Some(default) if sym.unit.is_empty() => default,
            _ => Unit::parse(&sym.unit)?,
        };
        let [nominal, doubled] = expand_symmetric(&sym.magnitude, unit)?;
        let values = if plus_minus_doubling {
            vec![doubled, nominal]
        } else {
            vec![nominal]
        };
        return Ok(GoldValue::Quantities(values));
    }
    let quantity = match attribute {
        Attribute::StgTempMin
        | Attribute::StgTempMax
        | Attribute::OpTempMin
        | Attribute::OpTempMax => temperature_normalizer(&parsed.value)?,
        Attribute::CeVMax => voltage_normalizer(&parsed.value)?,
        _ => parsed.value.parse()?,
    };
    Ok(GoldValue::Quantities(vec![quantity]))
}

/// Temperatures are `"<int> C"`; any other unit is rejected.
pub fn temperature_normalizer(temperature: &str) -> Result<Quantity, QuantityError> {
    let (temp, unit) = temperature
        .trim()
        .rsplit_once(' ')
        .ok_or_else(|| QuantityError::MissingUnit(temperature.to_string()))?;
    let unit = Unit::parse(unit)?;
    if unit != Unit::CELSIUS {
        return Err(QuantityError::UnknownUnit(temperature.to_string()));
    }
    Quantity::parse(temp, "C")
}

pub fn polarity_normalizer(polarity: &str) -> Result<String, QuantityError> {
    let upper = polarity.trim().to_uppercase();
    match upper.as_str() {
        "NPN" | "PNP" => Ok(upper),
        _ => Err(QuantityError::InvalidLabel(polarity.to_string())),
    }
}

/// Collector-emitter ratings are stored unsigned, with a `k` suffix expanded.
pub fn voltage_normalizer(voltage: &str) -> Result<Quantity, QuantityError> {
    let number = voltage
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .replace('-', "");
    match number.strip_suffix(['k', 'K']) {
        Some(thousands) => Quantity::parse(thousands, "kV"),
        None => Quantity::parse(&number, "V"),
    }
}
