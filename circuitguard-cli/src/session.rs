//! Interactive menu loop
//!
//! Console glue only: reads operator input, calls into the monitor and prints
//! what came back. Persistence failures are shown and the loop carries on;
//! only a broken console ends it early.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use circuitguard_core::alerts::AlertSink;
use circuitguard_core::constants::{
    HARMONICS_REPORT_FILE, NONCONFORMANCE_REPORT_FILE, SUMMARY_REPORT_FILE,
};
use circuitguard_core::report::write_report;
use circuitguard_core::time::Clock;
use circuitguard_core::{Monitor, ParseError};

use crate::menu::{ends_session, MenuAction};

const RULE_WIDTH: usize = 35;

pub fn announce<W: Write>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "{message}").context("failed to write to console")
}

/// Run the menu until the operator exits or input ends
///
/// Both paths attempt one final save.
pub fn run<A, C, R, W>(
    monitor: &mut Monitor<A, C>,
    report_dir: &Path,
    input: &mut R,
    out: &mut W,
) -> Result<()>
where
    A: AlertSink,
    C: Clock,
    R: BufRead,
    W: Write,
{
    loop {
        print_menu(out)?;
        let Some(choice) = read_line(input)? else {
            announce(out, "")?;
            save(monitor, out)?;
            break;
        };

        match choice.parse::<MenuAction>() {
            Ok(MenuAction::Record) => record_session(monitor, input, out)?,
            Ok(MenuAction::Save) => save(monitor, out)?,
            Ok(MenuAction::NonConformanceReport) => {
                let findings = monitor.nonconformance().len();
                if findings == 0 {
                    announce(out, "Status: OK. No non-conformance found.")?;
                } else {
                    announce(out, &format!("Found {findings} non-conformance(s)."))?;
                }
                write_file(
                    out,
                    report_dir,
                    NONCONFORMANCE_REPORT_FILE,
                    &monitor.nonconformance_report(),
                )?;
            }
            Ok(MenuAction::Summary) => {
                if monitor.store().is_empty() {
                    announce(out, "No circuits recorded.")?;
                }
                write_file(out, report_dir, SUMMARY_REPORT_FILE, &monitor.summary_report())?;
            }
            Ok(MenuAction::HarmonicsAnalysis) => {
                let outcome = monitor.harmonics_analysis();
                for alert in &outcome.alerts {
                    announce(
                        out,
                        &format!("CRITICAL: {} has THD {}%.", alert.circuit, alert.thd),
                    )?;
                }
                for (circuit, err) in &outcome.append_errors {
                    announce(out, &format!("Could not log alert for {circuit}: {err}"))?;
                }
                if outcome.alerts.is_empty() {
                    announce(out, "No harmonic distortion above the limit.")?;
                }
                write_file(out, report_dir, HARMONICS_REPORT_FILE, &outcome.report)?;
            }
            Ok(MenuAction::Aggregate) => announce(out, &monitor.aggregate_report())?,
            Ok(MenuAction::ExitAndSave) => {
                save(monitor, out)?;
                announce(out, "System shut down.")?;
                break;
            }
            Err(reason) => announce(out, &format!("Invalid choice: {reason}. Try again."))?,
        }
    }

    Ok(())
}

fn print_menu<W: Write>(out: &mut W) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);
    announce(out, &format!("\n{rule}\n   Electrical Monitoring System\n{rule}"))?;
    for action in MenuAction::ALL {
        announce(out, &format!("{} - {}", action.key(), action.description()))?;
    }
    announce(out, &"-".repeat(RULE_WIDTH))?;
    prompt(out, "Choice: ")
}

fn prompt<W: Write>(out: &mut W, text: &str) -> Result<()> {
    write!(out, "{text}").context("failed to write to console")?;
    out.flush().context("failed to flush console")
}

/// Next input line without its terminator; `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from console")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn record_session<A, C, R, W>(monitor: &mut Monitor<A, C>, input: &mut R, out: &mut W) -> Result<()>
where
    A: AlertSink,
    C: Clock,
    R: BufRead,
    W: Write,
{
    announce(out, "\n--- Record measurements ---")?;
    announce(out, "Format: Name; V=...; I=...; FP=...; F=...; THD=...")?;
    announce(out, "Enter an empty line or 'done' to return to the menu.")?;

    loop {
        prompt(out, "Measurement: ")?;
        let Some(line) = read_line(input)? else {
            break;
        };
        if ends_session(&line) {
            break;
        }

        match monitor.record_line(&line) {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    announce(out, &format!("Warning: {warning}"))?;
                }
                let verb = if outcome.created { "created" } else { "updated" };
                announce(
                    out,
                    &format!(
                        "Recorded {} value(s) for '{}' ({verb}).",
                        outcome.merged.len(),
                        outcome.circuit
                    ),
                )?;
                if let Some(alert) = &outcome.alert {
                    announce(
                        out,
                        &format!(
                            "CRITICAL: THD {}% on '{}' exceeds the limit; alert logged.",
                            alert.thd, alert.circuit
                        ),
                    )?;
                }
                if let Some(err) = &outcome.alert_error {
                    announce(out, &format!("Error: alert could not be logged: {err}"))?;
                }
            }
            Err(ParseError::EmptyCircuitName { .. }) => {
                announce(out, "Error: circuit name cannot be empty. Line ignored.")?;
            }
        }
    }

    announce(out, "Leaving record mode.")
}

fn save<A: AlertSink, C: Clock, W: Write>(monitor: &mut Monitor<A, C>, out: &mut W) -> Result<()> {
    match monitor.save() {
        Ok(snapshot) => announce(
            out,
            &format!(
                "Saved {} circuit(s) to '{}' at {}.",
                snapshot.circuits.len(),
                monitor.snapshot_file().path().display(),
                monitor.store().last_saved()
            ),
        ),
        Err(err) => announce(out, &format!("Error: save failed: {err}")),
    }
}

fn write_file<W: Write>(out: &mut W, dir: &Path, file_name: &str, contents: &str) -> Result<()> {
    match write_report(dir, file_name, contents) {
        Ok(path) => announce(out, &format!("Report written to '{}'.", path.display())),
        Err(err) => announce(out, &format!("Error: report not written: {err}")),
    }
}
