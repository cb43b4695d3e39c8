//! Conformance Evaluation
//!
//! ## Two Paths
//!
//! Range violations are handled two different ways:
//!
//! ### Bulk pass: [`evaluate_all`]
//! Informational. Walks every circuit and every stored parameter, compares it
//! to the catalog range and returns a fresh list of findings. Nothing is
//! persisted; ask again and it is recomputed from the store.
//!
//! ### Harmonic alert: [`evaluate_harmonics`]
//! Safety-critical. Fires as soon as a single reading carries a THD value
//! strictly above [`THD_MAX_PCT`], independently of any report being
//! requested. Every firing produces one [`HarmonicAlert`] destined for the
//! append-only alert log. There is no suppression of repeats.
//!
//! Harmonic distortion is therefore excluded from the bulk pass so a THD
//! violation is reported through exactly one channel.
//!
//! ## Boundaries
//!
//! Ranges are inclusive. A value exactly on `min` or `max` conforms:
//! ```text
//! min ──────────────── max
//!  ^ conforms          ^ conforms
//! ```

use core::fmt;

use chrono::NaiveDateTime;

use crate::catalog::{range_of, Parameter, SafeRange};
use crate::constants::{CURRENT_MAX_A, THD_MAX_PCT};
use crate::store::{CircuitStore, MeasurementSet};

/// Which bound a reading crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    BelowMin,
    AboveMax,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::BelowMin => f.write_str("below minimum"),
            Direction::AboveMax => f.write_str("above maximum"),
        }
    }
}

/// One out-of-range reading
#[derive(Debug, Clone, PartialEq)]
pub struct ConformanceFinding {
    pub circuit: String,
    pub parameter: Parameter,
    pub value: f64,
    pub direction: Direction,
    /// Range the value was checked against
    pub range: SafeRange,
}

impl ConformanceFinding {
    /// The bound that was crossed
    pub fn limit(&self) -> f64 {
        match self.direction {
            Direction::BelowMin => self.range.min,
            Direction::AboveMax => self.range.max,
        }
    }
}

/// A THD reading above the alert threshold
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicAlert {
    pub circuit: String,
    /// Measured THD (%)
    pub thd: f64,
    /// Every value the circuit held when the alert fired
    pub measurements: MeasurementSet,
    pub raised_at: NaiveDateTime,
}

/// Check every stored reading except THD against its range
///
/// Findings come out in circuit-name order, then catalog order.
pub fn evaluate_all(store: &CircuitStore) -> Vec<ConformanceFinding> {
    let mut findings = Vec::new();

    for (circuit, measurements) in store {
        for (parameter, value) in measurements.iter() {
            if parameter == Parameter::HarmonicDistortion {
                continue;
            }

            let range = range_of(parameter);
            if let Some(direction) = range.classify(value) {
                findings.push(ConformanceFinding {
                    circuit: circuit.to_string(),
                    parameter,
                    value,
                    direction,
                    range,
                });
            }
        }
    }

    findings
}

/// `true` when a THD value must raise an alert
pub fn thd_exceeds_limit(thd: f64) -> bool {
    thd > THD_MAX_PCT
}

/// Raise an alert when `trigger` carries THD above the limit
///
/// `trigger` is the reading that was just submitted; `snapshot` is the full
/// set recorded in the alert (usually the circuit's values after the merge).
pub fn evaluate_harmonics(
    circuit: &str,
    trigger: &MeasurementSet,
    snapshot: &MeasurementSet,
    raised_at: NaiveDateTime,
) -> Option<HarmonicAlert> {
    let thd = trigger.get(Parameter::HarmonicDistortion)?;
    if !thd_exceeds_limit(thd) {
        return None;
    }

    log_warn!(
        "Harmonic distortion alert on {:?}: THD {}% exceeds {}%",
        circuit,
        thd,
        THD_MAX_PCT
    );
    Some(HarmonicAlert {
        circuit: circuit.to_string(),
        thd,
        measurements: snapshot.clone(),
        raised_at,
    })
}

/// Circuits called out at the top of the non-conformance report
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Highlights<'a> {
    /// Circuit and power factor, see [`lowest_power_factor`]
    pub lowest_power_factor: Option<(&'a str, f64)>,
    /// Circuit and load fraction, see [`most_loaded`]
    pub most_loaded: Option<(&'a str, f64)>,
}

impl<'a> Highlights<'a> {
    pub fn of(store: &'a CircuitStore) -> Self {
        Self {
            lowest_power_factor: lowest_power_factor(store),
            most_loaded: most_loaded(store),
        }
    }
}

/// Circuit with the smallest power factor reading
///
/// Circuits without a power factor are skipped. Ties go to the first name.
pub fn lowest_power_factor(store: &CircuitStore) -> Option<(&str, f64)> {
    let mut lowest: Option<(&str, f64)> = None;

    for (circuit, measurements) in store {
        let Some(power_factor) = measurements.get(Parameter::PowerFactor) else {
            continue;
        };
        if lowest.map_or(true, |(_, min)| power_factor < min) {
            lowest = Some((circuit, power_factor));
        }
    }

    lowest
}

/// Circuit drawing the largest share of [`CURRENT_MAX_A`]
///
/// Load is `I / CURRENT_MAX_A`, so 1.0 is a circuit at its limit. Only a
/// positive load qualifies; circuits without a current reading are skipped.
/// Ties go to the first name.
pub fn most_loaded(store: &CircuitStore) -> Option<(&str, f64)> {
    let mut heaviest: Option<(&str, f64)> = None;

    for (circuit, measurements) in store {
        let Some(current) = measurements.get(Parameter::Current) else {
            continue;
        };
        let load = current / CURRENT_MAX_A;
        if load > heaviest.map_or(0.0, |(_, max)| max) {
            heaviest = Some((circuit, load));
        }
    }

    heaviest
}

/// Run the harmonic check over every stored circuit
pub fn sweep_harmonics(store: &CircuitStore, raised_at: NaiveDateTime) -> Vec<HarmonicAlert> {
    store
        .iter()
        .filter_map(|(circuit, measurements)| {
            evaluate_harmonics(circuit, measurements, measurements, raised_at)
        })
        .collect()
}
