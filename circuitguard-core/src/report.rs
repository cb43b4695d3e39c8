//! Plain-text reports
//!
//! Rendering only: every function here takes already-computed data and
//! returns the text. Each dated report carries two stamps, when it was
//! generated and when the data it describes was last saved.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::aggregate::{ApparentPowerSummary, CircuitPower};
use crate::catalog::Parameter;
use crate::conformance::{ConformanceFinding, HarmonicAlert, Highlights};
use crate::constants::{CURRENT_MAX_A, REPORT_RULE_WIDTH, THD_MAX_PCT};
use crate::errors::{PersistenceError, PersistenceResult};
use crate::store::{CircuitStore, SaveStamp};
use crate::time::human;

const NOT_AVAILABLE: &str = "not available";

/// Shortest decimal form of a reading (`220`, `0.95`)
pub fn format_value(value: f64) -> String {
    format!("{}", value)
}

fn rule() -> String {
    "=".repeat(REPORT_RULE_WIDTH)
}

fn header(title: &str, generated_at: &NaiveDateTime, data_saved: &SaveStamp) -> String {
    format!(
        "--- {title} ---\nGenerated at:   {}\nData saved at:  {}\n{}\n\n",
        human(generated_at),
        data_saved,
        rule()
    )
}

fn footer() -> String {
    format!("{}\nEnd of report.\n", rule())
}

fn highlight_lines(highlights: &Highlights<'_>) -> String {
    let lowest = match highlights.lowest_power_factor {
        Some((circuit, power_factor)) => format!("{} - {}", circuit, format_value(power_factor)),
        None => NOT_AVAILABLE.to_string(),
    };
    let loaded = match highlights.most_loaded {
        Some((circuit, load)) => format!(
            "{} - {:.1}% of the {} A limit",
            circuit,
            load * 100.0,
            format_value(CURRENT_MAX_A)
        ),
        None => NOT_AVAILABLE.to_string(),
    };

    format!("Lowest power factor:  {lowest}
Most loaded circuit:  {loaded}

")
}

/// Out-of-range readings, one block per finding
///
/// The highlight lines (lowest power factor, most loaded circuit) come right
/// after the header.
pub fn render_nonconformance(
    findings: &[ConformanceFinding],
    highlights: &Highlights<'_>,
    data_saved: &SaveStamp,
    generated_at: &NaiveDateTime,
) -> String {
    let mut out = header("NON-CONFORMANCE REPORT", generated_at, data_saved);
    out.push_str(&highlight_lines(highlights));

    if findings.is_empty() {
        out.push_str("Status: OK. All readings are within their safe ranges.\n\n");
    } else {
        let mut circuits: Vec<&str> = findings.iter().map(|f| f.circuit.as_str()).collect();
        circuits.dedup();
        out.push_str(&format!(
            "{} non-conformance(s) across {} circuit(s).\n\n",
            findings.len(),
            circuits.len()
        ));

        for finding in findings {
            out.push_str(&format!("[ALERT] Circuit: {}\n", finding.circuit));
            out.push_str(&format!("  - Parameter: {}\n", finding.parameter.label()));
            out.push_str(&format!("  - Measured value: {}\n", format_value(finding.value)));
            out.push_str(&format!(
                "  - Status: {} (limit {})\n\n",
                finding.direction,
                format_value(finding.limit())
            ));
        }
    }

    out.push_str(&footer());
    out
}

/// All five parameters for every circuit
pub fn render_summary(store: &CircuitStore, generated_at: &NaiveDateTime) -> String {
    let mut out = header("ELECTRICAL SUMMARY", generated_at, store.last_saved());

    if store.is_empty() {
        out.push_str("No circuits recorded.\n\n");
    }

    for (circuit, measurements) in store {
        out.push_str(&format!("[Circuit: {}]\n", circuit));
        for parameter in Parameter::ALL {
            let value = match measurements.get(parameter) {
                Some(value) => with_unit(value, parameter),
                None => NOT_AVAILABLE.to_string(),
            };
            out.push_str(&format!("  - {}: {}\n", parameter.label(), value));
        }
        out.push('\n');
    }

    out.push_str(&footer());
    out
}

/// Alerts raised by a harmonics sweep
pub fn render_harmonics(
    alerts: &[HarmonicAlert],
    data_saved: &SaveStamp,
    generated_at: &NaiveDateTime,
) -> String {
    let mut out = header("HARMONICS ANALYSIS", generated_at, data_saved);

    if alerts.is_empty() {
        out.push_str(&format!(
            "Status: OK. No circuit exceeds {}% THD.\n\n",
            format_value(THD_MAX_PCT)
        ));
    } else {
        out.push_str(&format!(
            "{} circuit(s) exceed {}% THD:\n\n",
            alerts.len(),
            format_value(THD_MAX_PCT)
        ));
        for alert in alerts {
            out.push_str(&format!(
                "[CRITICAL] Circuit: {} - THD {}%\n",
                alert.circuit,
                format_value(alert.thd)
            ));
        }
        out.push('\n');
    }

    out.push_str(&footer());
    out
}

/// Apparent power breakdown and total
pub fn render_aggregate(summary: &ApparentPowerSummary) -> String {
    let mut out = String::from("--- APPARENT POWER (S = V x I) ---\n");

    if summary.circuits.is_empty() {
        out.push_str("No circuits recorded.\n");
        return out;
    }

    for entry in &summary.circuits {
        match entry {
            CircuitPower::Complete {
                circuit,
                apparent_va,
            } => out.push_str(&format!("  - {}: {:.2} VA\n", circuit, apparent_va)),
            CircuitPower::Incomplete {
                circuit,
                missing_voltage,
                missing_current,
            } => {
                let missing = match (missing_voltage, missing_current) {
                    (true, true) => "V and I",
                    (true, false) => "V",
                    _ => "I",
                };
                out.push_str(&format!(
                    "  - {}: incomplete data ({} missing)\n",
                    circuit, missing
                ));
            }
            CircuitPower::Overflow { circuit } => {
                out.push_str(&format!("  - {}: V x I out of range, not counted\n", circuit));
            }
        }
    }

    out.push_str(&"-".repeat(30));
    out.push('\n');
    out.push_str(&format!(
        "Total apparent power: {:.2} VA ({:.2} kVA)\n",
        summary.total_va,
        summary.total_kva()
    ));
    out
}

/// Value followed by the parameter's unit, if it has one
pub(crate) fn with_unit(value: f64, parameter: Parameter) -> String {
    match parameter.unit() {
        "" => format_value(value),
        "%" => format!("{}%", format_value(value)),
        unit => format!("{} {}", format_value(value), unit),
    }
}

/// Write a rendered report into `dir`, replacing any previous one
pub fn write_report(dir: &Path, file_name: &str, contents: &str) -> PersistenceResult<PathBuf> {
    let path = dir.join(file_name);
    fs::write(&path, contents).map_err(|source| PersistenceError::write(&path, source))?;
    log_info!("Wrote report {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::total_apparent_power;
    use crate::conformance::evaluate_all;
    use crate::parser::parse_line;
    use crate::time::{Clock, FixedClock};

    fn store_with(lines: &[&str]) -> CircuitStore {
        let mut store = CircuitStore::new();
        for line in lines {
            let parsed = parse_line(line).unwrap();
            store.merge(&parsed.circuit, &parsed.measurements);
        }
        store
    }

    #[test]
    fn nonconformance_lists_each_finding() {
        let clock = FixedClock::at_date(2025, 11, 5);
        let store = store_with(&["Motor; V=200; fp=0.78", "Panel; V=220"]);
        let text = render_nonconformance(
            &evaluate_all(&store),
            &Highlights::of(&store),
            store.last_saved(),
            &clock.now(),
        );

        assert!(text.starts_with("--- NON-CONFORMANCE REPORT ---\n"));
        assert!(text.contains("Generated at:   2025-11-05 00:00:00"));
        assert!(text.contains("Data saved at:  N/A (data not saved yet)"));
        assert!(text.contains("Lowest power factor:  Motor - 0.78\n"));
        assert!(text.contains("Most loaded circuit:  not available\n"));
        assert!(text.contains("2 non-conformance(s) across 1 circuit(s)."));
        assert!(text.contains("  - Parameter: Voltage\n  - Measured value: 200\n  - Status: below minimum (limit 210)"));
        assert!(text.contains("  - Status: below minimum (limit 0.92)"));
        assert!(text.ends_with("End of report.\n"));
    }

    #[test]
    fn nonconformance_reports_ok_when_clean() {
        let clock = FixedClock::at_date(2025, 11, 5);
        let text = render_nonconformance(
            &[],
            &Highlights::default(),
            &SaveStamp::NewFile,
            &clock.now(),
        );
        assert!(text.contains("Status: OK."));
        assert!(text.contains("N/A (new file)"));
        assert!(text.contains("Lowest power factor:  not available\n"));
    }

    #[test]
    fn nonconformance_highlights_load_as_share_of_limit() {
        let clock = FixedClock::at_date(2025, 11, 5);
        let store = store_with(&["Motor; I=45; fp=0.95", "Panel; I=5", "Spare; V=220"]);
        let text = render_nonconformance(
            &evaluate_all(&store),
            &Highlights::of(&store),
            store.last_saved(),
            &clock.now(),
        );

        assert!(text.contains("Lowest power factor:  Motor - 0.95\n"));
        assert!(text.contains("Most loaded circuit:  Motor - 90.0% of the 50 A limit\n"));
        assert!(text.contains("Status: OK."));
    }

    #[test]
    fn summary_marks_missing_parameters() {
        let clock = FixedClock::at_date(2025, 11, 5);
        let store = store_with(&["Q1; V=220; THD=3"]);
        let text = render_summary(&store, &clock.now());

        assert!(text.contains("[Circuit: Q1]\n  - Voltage: 220 V\n  - Current: not available\n"));
        assert!(text.contains("  - Power factor: not available\n"));
        assert!(text.contains("  - THD: 3%\n"));
    }

    #[test]
    fn summary_of_empty_store() {
        let clock = FixedClock::at_date(2025, 11, 5);
        let text = render_summary(&CircuitStore::new(), &clock.now());
        assert!(text.contains("No circuits recorded."));
    }

    #[test]
    fn aggregate_shows_breakdown_and_total() {
        let store = store_with(&["A; V=220; I=10", "B; V=220"]);
        let text = render_aggregate(&total_apparent_power(&store));

        assert!(text.contains("  - A: 2200.00 VA\n"));
        assert!(text.contains("  - B: incomplete data (I missing)\n"));
        assert!(text.contains("Total apparent power: 2200.00 VA (2.20 kVA)"));
    }

    #[test]
    fn aggregate_never_prints_infinity() {
        let store = store_with(&["A; V=220; I=10", "Huge; V=1e200; I=1e200"]);
        let text = render_aggregate(&total_apparent_power(&store));

        assert!(text.contains("  - Huge: V x I out of range, not counted\n"));
        assert!(text.contains("Total apparent power: 2200.00 VA (2.20 kVA)"));
        assert!(!text.contains("inf"));
    }

    #[test]
    fn report_write_failure_is_reported() {
        let err = write_report(Path::new("/nonexistent-dir/for/sure"), "r.txt", "x").unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
    }
}
