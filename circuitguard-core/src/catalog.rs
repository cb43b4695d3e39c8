//! Parameter catalog
//!
//! Maps the short tokens operators type ("V", "I", "FP", "F", "THD") to the
//! five measured parameters, and each parameter to its fixed safe range.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::conformance::Direction;
use crate::constants::*;

/// A measured electrical quantity
///
/// Variant order is the order parameters appear in stored snapshots and
/// reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "tensao")]
    Voltage,
    #[serde(rename = "corrente")]
    Current,
    #[serde(rename = "fator_potencia")]
    PowerFactor,
    #[serde(rename = "frequencia")]
    Frequency,
    #[serde(rename = "thd")]
    HarmonicDistortion,
}

impl Parameter {
    /// Every parameter, in display order
    pub const ALL: [Parameter; 5] = [
        Parameter::Voltage,
        Parameter::Current,
        Parameter::PowerFactor,
        Parameter::Frequency,
        Parameter::HarmonicDistortion,
    ];

    /// Short token accepted on input lines (matched case-insensitively)
    pub const fn token(&self) -> &'static str {
        match self {
            Parameter::Voltage => "V",
            Parameter::Current => "I",
            Parameter::PowerFactor => "FP",
            Parameter::Frequency => "F",
            Parameter::HarmonicDistortion => "THD",
        }
    }

    /// Key used for this parameter in snapshots
    pub const fn canonical_name(&self) -> &'static str {
        match self {
            Parameter::Voltage => "tensao",
            Parameter::Current => "corrente",
            Parameter::PowerFactor => "fator_potencia",
            Parameter::Frequency => "frequencia",
            Parameter::HarmonicDistortion => "thd",
        }
    }

    /// Human-readable name for reports
    pub const fn label(&self) -> &'static str {
        match self {
            Parameter::Voltage => "Voltage",
            Parameter::Current => "Current",
            Parameter::PowerFactor => "Power factor",
            Parameter::Frequency => "Frequency",
            Parameter::HarmonicDistortion => "THD",
        }
    }

    /// Unit suffix; power factor is dimensionless
    pub const fn unit(&self) -> &'static str {
        match self {
            Parameter::Voltage => "V",
            Parameter::Current => "A",
            Parameter::PowerFactor => "",
            Parameter::Frequency => "Hz",
            Parameter::HarmonicDistortion => "%",
        }
    }

    /// Reverse of [`canonical_name`](Self::canonical_name)
    pub fn from_canonical_name(name: &str) -> Option<Parameter> {
        Self::ALL.into_iter().find(|p| p.canonical_name() == name)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Inclusive `[min, max]` band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeRange {
    pub min: f64,
    pub max: f64,
}

impl SafeRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `None` when the value conforms, otherwise which bound it crossed
    pub fn classify(&self, value: f64) -> Option<Direction> {
        if value < self.min {
            Some(Direction::BelowMin)
        } else if value > self.max {
            Some(Direction::AboveMax)
        } else {
            None
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.classify(value).is_none()
    }
}

/// Resolve an input token to a parameter, ignoring case and surrounding space
pub fn resolve_token(token: &str) -> Option<Parameter> {
    let token = token.trim();
    Parameter::ALL
        .into_iter()
        .find(|p| p.token().eq_ignore_ascii_case(token))
}

/// Safe range for a parameter
pub const fn range_of(parameter: Parameter) -> SafeRange {
    match parameter {
        Parameter::Voltage => SafeRange::new(VOLTAGE_MIN_V, VOLTAGE_MAX_V),
        Parameter::Current => SafeRange::new(CURRENT_MIN_A, CURRENT_MAX_A),
        Parameter::PowerFactor => SafeRange::new(POWER_FACTOR_MIN, POWER_FACTOR_MAX),
        Parameter::Frequency => SafeRange::new(FREQUENCY_MIN_HZ, FREQUENCY_MAX_HZ),
        Parameter::HarmonicDistortion => SafeRange::new(THD_MIN_PCT, THD_MAX_PCT),
    }
}
