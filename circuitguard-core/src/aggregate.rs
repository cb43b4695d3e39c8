//! Apparent power totals
//!
//! S = V × I per circuit, in volt-amperes, phase not accounted for. Circuits
//! lacking either reading are listed as incomplete and left out of the sum.
//! So is a circuit whose product (or its addition to the total) would not be
//! a finite number.

use crate::catalog::Parameter;
use crate::store::CircuitStore;

/// Per-circuit contribution to the total
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitPower {
    Complete {
        circuit: String,
        /// Apparent power in VA
        apparent_va: f64,
    },
    Incomplete {
        circuit: String,
        missing_voltage: bool,
        missing_current: bool,
    },
    /// V × I does not fit in an `f64`
    Overflow { circuit: String },
}

impl CircuitPower {
    pub fn circuit(&self) -> &str {
        match self {
            CircuitPower::Complete { circuit, .. }
            | CircuitPower::Incomplete { circuit, .. }
            | CircuitPower::Overflow { circuit } => circuit,
        }
    }
}

/// Breakdown plus grand total
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApparentPowerSummary {
    /// One entry per stored circuit, in name order
    pub circuits: Vec<CircuitPower>,
    /// Sum over complete circuits (VA)
    pub total_va: f64,
}

impl ApparentPowerSummary {
    pub fn total_kva(&self) -> f64 {
        self.total_va / 1000.0
    }

    pub fn complete_count(&self) -> usize {
        self.circuits
            .iter()
            .filter(|c| matches!(c, CircuitPower::Complete { .. }))
            .count()
    }

    pub fn incomplete(&self) -> impl Iterator<Item = &CircuitPower> {
        self.circuits
            .iter()
            .filter(|c| matches!(c, CircuitPower::Incomplete { .. }))
    }
}

pub fn total_apparent_power(store: &CircuitStore) -> ApparentPowerSummary {
    let mut summary = ApparentPowerSummary::default();

    for (circuit, measurements) in store {
        let voltage = measurements.get(Parameter::Voltage);
        let current = measurements.get(Parameter::Current);

        let entry = match (voltage, current) {
            (Some(v), Some(i)) => {
                let apparent_va = v * i;
                let total_va = summary.total_va + apparent_va;
                if total_va.is_finite() {
                    summary.total_va = total_va;
                    CircuitPower::Complete {
                        circuit: circuit.to_string(),
                        apparent_va,
                    }
                } else {
                    log_warn!("Apparent power of {:?} is out of range and was skipped", circuit);
                    CircuitPower::Overflow {
                        circuit: circuit.to_string(),
                    }
                }
            }
            _ => CircuitPower::Incomplete {
                circuit: circuit.to_string(),
                missing_voltage: voltage.is_none(),
                missing_current: current.is_none(),
            },
        };
        summary.circuits.push(entry);
    }

    summary
}
