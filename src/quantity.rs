//! Unit-aware physical quantities used as the unit of comparison.
//!
//! Every quantity is stored in its base unit (Hz, A, V or °C), so `12.5 kHz`
//! and `0.0125 MHz` compare and hash identically.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::QuantityError;

/// Private-use code point that PDF converters emit in place of the micro sign.
pub const OCR_MICRO: char = '\u{f06d}';

/// Significant digits kept when comparing magnitudes.
const SIGNIFICANT_DIGITS: usize = 12;

/// Physical dimension of a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Frequency,
    Current,
    Voltage,
    Temperature,
}

impl Dimension {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Frequency => "Hz",
            Self::Current => "A",
            Self::Voltage => "V",
            Self::Temperature => "C",
        }
    }
}

/// A concrete unit: a dimension plus the factor to its base unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub dimension: Dimension,
    pub scale: f64,
}

impl Unit {
    pub const HERTZ: Unit = Unit::new(Dimension::Frequency, 1.0);
    pub const KILOHERTZ: Unit = Unit::new(Dimension::Frequency, 1e3);
    pub const MEGAHERTZ: Unit = Unit::new(Dimension::Frequency, 1e6);
    pub const GIGAHERTZ: Unit = Unit::new(Dimension::Frequency, 1e9);
    pub const AMPERE: Unit = Unit::new(Dimension::Current, 1.0);
    pub const MILLIAMPERE: Unit = Unit::new(Dimension::Current, 1e-3);
    pub const MICROAMPERE: Unit = Unit::new(Dimension::Current, 1e-6);
    pub const NANOAMPERE: Unit = Unit::new(Dimension::Current, 1e-9);
    pub const PICOAMPERE: Unit = Unit::new(Dimension::Current, 1e-12);
    pub const VOLT: Unit = Unit::new(Dimension::Voltage, 1.0);
    pub const MILLIVOLT: Unit = Unit::new(Dimension::Voltage, 1e-3);
    pub const KILOVOLT: Unit = Unit::new(Dimension::Voltage, 1e3);
    pub const CELSIUS: Unit = Unit::new(Dimension::Temperature, 1.0);

    pub const fn new(dimension: Dimension, scale: f64) -> Self {
        Self { dimension, scale }
    }

    /// Parse a unit token such as `kHz`, `μA`, `uA` or `°C`.
    pub fn parse(token: &str) -> Result<Self, QuantityError> {
        let normalized = normalize_micro(token.trim());
        let normalized = normalized.trim_start_matches('°').replace('℃', "C");
        let unit = match normalized.as_str() {
            "Hz" => Self::HERTZ,
            "kHz" | "KHz" => Self::KILOHERTZ,
            "MHz" => Self::MEGAHERTZ,
            "GHz" => Self::GIGAHERTZ,
            "A" => Self::AMPERE,
            "mA" => Self::MILLIAMPERE,
            "uA" => Self::MICROAMPERE,
            "nA" => Self::NANOAMPERE,
            "pA" => Self::PICOAMPERE,
            "V" => Self::VOLT,
            "mV" => Self::MILLIVOLT,
            "kV" | "KV" => Self::KILOVOLT,
            "C" => Self::CELSIUS,
            _ => return Err(QuantityError::UnknownUnit(token.to_string())),
        };
        Ok(unit)
    }
}

impl FromStr for Unit {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Fold every spelling of "micro" (ASCII `u`, U+00B5, U+03BC, OCR U+F06D) to `u`.
pub fn normalize_micro(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            'µ' | 'μ' | OCR_MICRO => 'u',
            other => other,
        })
        .collect()
}

/// Immutable magnitude in base units, tagged with its dimension.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    magnitude: f64,
    dimension: Dimension,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self {
            magnitude: value * unit.scale,
            dimension: unit.dimension,
        }
    }

    /// Like [`Quantity::new`], but the scaled magnitude must stay finite.
    pub fn try_new(value: f64, unit: Unit) -> Result<Self, QuantityError> {
        let quantity = Self::new(value, unit);
        if quantity.magnitude.is_finite() {
            Ok(quantity)
        } else {
            Err(QuantityError::InvalidNumber(value.to_string()))
        }
    }

    /// Parse a number and a unit that the caller has already split apart.
    pub fn parse(value: &str, unit: &str) -> Result<Self, QuantityError> {
        let number = parse_number(value)?;
        let unit = Unit::parse(unit)?;
        Self::try_new(number, unit).map_err(|_| QuantityError::InvalidNumber(value.to_string()))
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Magnitude in base units, rounded to the comparison precision.
    pub fn canonical(&self) -> f64 {
        let rounded = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, self.magnitude)
            .parse::<f64>()
            .unwrap_or(self.magnitude);
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    /// Express the quantity in `unit`, or `None` when dimensions differ.
    pub fn value_in(&self, unit: Unit) -> Option<f64> {
        (unit.dimension == self.dimension).then(|| self.canonical() / unit.scale)
    }
}

/// Parse a finite float; `nan` and `inf` are rejected.
pub fn parse_number(value: &str) -> Result<f64, QuantityError> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(QuantityError::InvalidNumber(value.to_string())),
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.canonical() == other.canonical()
    }
}

impl Eq for Quantity {}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension.hash(state);
        self.canonical().to_bits().hash(state);
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dimension
            .cmp(&other.dimension)
            .then_with(|| self.canonical().total_cmp(&other.canonical()))
    }
}

static QUANTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(\S*)\s*$")
        .expect("valid quantity regex")
});

impl FromStr for Quantity {
    type Err = QuantityError;

    /// Parse `"<number> <unit>"`; the space between the two is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = QUANTITY_PATTERN
            .captures(s)
            .ok_or_else(|| QuantityError::InvalidNumber(s.to_string()))?;
        let unit = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        if unit.is_empty() {
            return Err(QuantityError::MissingUnit(s.to_string()));
        }
        Self::parse(&captures[1], unit)
    }
}

const PREFIXES: &[(i32, &str)] = &[
    (9, "G"),
    (6, "M"),
    (3, "k"),
    (0, ""),
    (-3, "m"),
    (-6, "u"),
    (-9, "n"),
    (-12, "p"),
];

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.canonical();
        let symbol = self.dimension.symbol();
        if !value.is_finite() {
            return write!(f, "{value} {symbol}");
        }
        if self.dimension == Dimension::Temperature || value == 0.0 {
            return write!(f, "{} {symbol}", trim_float(value));
        }
        // Clamp before the cast so `* 3` cannot overflow.
        let exponent = (value.abs().log10() / 3.0).floor().clamp(-4.0, 3.0) as i32 * 3;
        let prefix = PREFIXES
            .iter()
            .find(|(exp, _)| *exp == exponent)
            .map(|(_, p)| *p)
            .unwrap_or_default();
        let mantissa = value / 10f64.powi(exponent);
        write!(f, "{} {prefix}{symbol}", trim_float(mantissa))
    }
}

fn trim_float(value: f64) -> f64 {
    let rounded = (value * 1e9).round() / 1e9;
    if !rounded.is_finite() {
        value
    } else if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
