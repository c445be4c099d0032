//! Extracted attributes and the entities that get scored against gold.

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::Serialize;

use crate::quantity::{Dimension, Quantity, Unit};

/// Datasheet attribute an extraction run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Attribute {
    /// Op-amp typical gain-bandwidth product.
    TypGbp,
    /// Op-amp typical quiescent supply current.
    TypSupplyCurrent,
    StgTempMin,
    StgTempMax,
    OpTempMin,
    OpTempMax,
    /// Transistor polarity (`NPN` or `PNP`).
    Polarity,
    /// Maximum collector-emitter voltage.
    CeVMax,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Self::TypGbp,
        Self::TypSupplyCurrent,
        Self::StgTempMin,
        Self::StgTempMax,
        Self::OpTempMin,
        Self::OpTempMax,
        Self::Polarity,
        Self::CeVMax,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypGbp => "typ_gbp",
            Self::TypSupplyCurrent => "typ_supply_current",
            Self::StgTempMin => "stg_temp_min",
            Self::StgTempMax => "stg_temp_max",
            Self::OpTempMin => "op_temp_min",
            Self::OpTempMax => "op_temp_max",
            Self::Polarity => "polarity",
            Self::CeVMax => "ce_v_max",
        }
    }

    /// Physical dimension, or `None` for categorical attributes.
    pub fn dimension(self) -> Option<Dimension> {
        match self {
            Self::TypGbp => Some(Dimension::Frequency),
            Self::TypSupplyCurrent => Some(Dimension::Current),
            Self::StgTempMin | Self::StgTempMax | Self::OpTempMin | Self::OpTempMax => {
                Some(Dimension::Temperature)
            }
            Self::CeVMax => Some(Dimension::Voltage),
            Self::Polarity => None,
        }
    }

    /// Unit that probability dumps and reports express values in.
    pub fn report_unit(self) -> Option<Unit> {
        match self {
            Self::TypGbp => Some(Unit::KILOHERTZ),
            Self::TypSupplyCurrent => Some(Unit::MICROAMPERE),
            Self::StgTempMin | Self::StgTempMax | Self::OpTempMin | Self::OpTempMax => {
                Some(Unit::CELSIUS)
            }
            Self::CeVMax => Some(Unit::VOLT),
            Self::Polarity => None,
        }
    }

    /// Unit assumed when a candidate row carries no unit token at all.
    pub fn default_unit(self) -> Option<Unit> {
        match self {
            Self::TypGbp | Self::TypSupplyCurrent | Self::Polarity => None,
            Self::CeVMax => Some(Unit::VOLT),
            _ => Some(Unit::CELSIUS),
        }
    }

    /// Whether a row-level token names a unit for this attribute.
    pub fn is_unit_token(self, token: &str) -> bool {
        match self.dimension() {
            Some(Dimension::Frequency) => matches!(token, "kHz" | "MHz" | "GHz"),
            Some(Dimension::Current) => !token.is_empty() && token.ends_with('A'),
            Some(Dimension::Temperature) => matches!(token, "°C" | "C" | "℃"),
            Some(Dimension::Voltage) => matches!(token, "V" | "mV" | "kV"),
            None => false,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str() == s.trim())
            .ok_or_else(|| format!("unknown attribute `{s}`"))
    }
}

/// The value half of an entity tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum EntityValue {
    Quantity(Quantity),
    Pair { gain: Quantity, current: Quantity },
    Label(String),
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quantity(q) => write!(f, "{q}"),
            Self::Pair { gain, current } => write!(f, "{gain} / {current}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// A normalised fact for one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Entity {
    pub document: String,
    pub value: EntityValue,
}

impl Entity {
    pub fn quantity(document: &str, value: Quantity) -> Self {
        Self {
            document: document.to_uppercase(),
            value: EntityValue::Quantity(value),
        }
    }

    pub fn pair(document: &str, gain: Quantity, current: Quantity) -> Self {
        Self {
            document: document.to_uppercase(),
            value: EntityValue::Pair { gain, current },
        }
    }

    pub fn label(document: &str, label: &str) -> Self {
        Self {
            document: document.to_uppercase(),
            value: EntityValue::Label(label.trim().to_uppercase()),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.document, self.value)
    }
}
