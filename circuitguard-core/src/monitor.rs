//! Application state
//!
//! [`Monitor`] owns the circuit store together with its collaborators (the
//! snapshot file, the alert sink and the clock) and is passed by reference
//! to whatever front end drives it. There is no global state.
//!
//! ## Recording Flow
//!
//! ```text
//! raw line ─► parse_line ─► store.merge ─► evaluate_harmonics ─► alert sink
//!               │ warnings                       │ none
//!               ▼                                ▼
//!          RecordOutcome ◄───────────────────────┘
//! ```
//!
//! A failed alert append is reported in the outcome; the merged values stay
//! in the store either way.

use std::path::PathBuf;

use crate::aggregate::{total_apparent_power, ApparentPowerSummary};
use crate::alerts::{AlertLog, AlertSink};
use crate::conformance::{
    evaluate_all, evaluate_harmonics, sweep_harmonics, ConformanceFinding, HarmonicAlert,
    Highlights,
};
use crate::constants::{DEFAULT_ALERT_LOG, DEFAULT_DATA_FILE};
use crate::errors::{ParseResult, ParseWarning, PersistenceError, PersistenceResult};
use crate::parser::parse_line;
use crate::report;
use crate::snapshot::{Snapshot, SnapshotFile};
use crate::store::{CircuitStore, LoadOutcome, MeasurementSet};
use crate::time::{Clock, SystemClock};

/// File locations used by a monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Snapshot JSON
    pub data_file: PathBuf,
    /// Append-only harmonic alert log
    pub alert_log: PathBuf,
    /// Directory reports are written into
    pub report_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            alert_log: PathBuf::from(DEFAULT_ALERT_LOG),
            report_dir: PathBuf::from("."),
        }
    }
}

/// Result of recording one accepted line
#[derive(Debug)]
pub struct RecordOutcome {
    pub circuit: String,
    /// Whether the circuit did not exist before this line
    pub created: bool,
    /// Values merged from this line
    pub merged: MeasurementSet,
    /// Segments that were dropped
    pub warnings: Vec<ParseWarning>,
    /// Alert raised by this line, if any
    pub alert: Option<HarmonicAlert>,
    /// Set when the alert could not be appended to the log
    pub alert_error: Option<PersistenceError>,
}

/// Result of a full harmonics sweep
#[derive(Debug)]
pub struct HarmonicsOutcome {
    pub alerts: Vec<HarmonicAlert>,
    /// Alerts that could not be appended, with the reason
    pub append_errors: Vec<(String, PersistenceError)>,
    pub report: String,
}

/// The circuit store plus everything it needs to persist and alert
pub struct Monitor<A, C> {
    store: CircuitStore,
    snapshot_file: SnapshotFile,
    alerts: A,
    clock: C,
}

impl Monitor<AlertLog, SystemClock> {
    /// Monitor over the configured files, with the store loaded from disk
    pub fn open(config: &MonitorConfig) -> (Self, LoadOutcome) {
        let mut monitor = Monitor::new(
            SnapshotFile::new(&config.data_file),
            AlertLog::new(&config.alert_log),
            SystemClock,
        );
        let outcome = monitor.load();
        (monitor, outcome)
    }
}

impl<A: AlertSink, C: Clock> Monitor<A, C> {
    /// Monitor with an empty store; call [`load`](Self::load) to populate it
    pub fn new(snapshot_file: SnapshotFile, alerts: A, clock: C) -> Self {
        Self {
            store: CircuitStore::new(),
            snapshot_file,
            alerts,
            clock,
        }
    }

    /// Replace the store with the snapshot on disk, degrading to empty
    pub fn load(&mut self) -> LoadOutcome {
        self.store.load(self.snapshot_file.read())
    }

    /// Parse a line, merge it and run the harmonic check on what it carried
    pub fn record_line(&mut self, line: &str) -> ParseResult<RecordOutcome> {
        let parsed = parse_line(line)?;

        let created = !self.store.contains(&parsed.circuit);
        let stored = self.store.merge(&parsed.circuit, &parsed.measurements);
        let alert = evaluate_harmonics(
            &parsed.circuit,
            &parsed.measurements,
            stored,
            self.clock.now(),
        );

        let alert_error = match &alert {
            Some(alert) => self.append_alert(alert).err(),
            None => None,
        };

        Ok(RecordOutcome {
            circuit: parsed.circuit,
            created,
            merged: parsed.measurements,
            warnings: parsed.warnings,
            alert,
            alert_error,
        })
    }

    /// Write the store to the snapshot file
    ///
    /// On failure the in-memory store and its save stamp are unchanged.
    pub fn save(&mut self) -> PersistenceResult<Snapshot> {
        let file = &self.snapshot_file;
        self.store.save(&self.clock, |snapshot| file.write(snapshot))
    }

    /// Fresh out-of-range list over the whole store
    pub fn nonconformance(&self) -> Vec<ConformanceFinding> {
        evaluate_all(&self.store)
    }

    pub fn nonconformance_report(&self) -> String {
        report::render_nonconformance(
            &self.nonconformance(),
            &Highlights::of(&self.store),
            self.store.last_saved(),
            &self.clock.now(),
        )
    }

    pub fn summary_report(&self) -> String {
        report::render_summary(&self.store, &self.clock.now())
    }

    /// Sweep every circuit for THD violations, appending one alert per hit
    pub fn harmonics_analysis(&mut self) -> HarmonicsOutcome {
        let now = self.clock.now();
        let alerts = sweep_harmonics(&self.store, now);

        let mut append_errors = Vec::new();
        for alert in &alerts {
            if let Err(err) = self.append_alert(alert) {
                append_errors.push((alert.circuit.clone(), err));
            }
        }

        let report = report::render_harmonics(&alerts, self.store.last_saved(), &now);
        HarmonicsOutcome {
            alerts,
            append_errors,
            report,
        }
    }

    pub fn apparent_power(&self) -> ApparentPowerSummary {
        total_apparent_power(&self.store)
    }

    pub fn aggregate_report(&self) -> String {
        report::render_aggregate(&self.apparent_power())
    }

    pub fn store(&self) -> &CircuitStore {
        &self.store
    }

    pub fn alert_sink(&self) -> &A {
        &self.alerts
    }

    pub fn snapshot_file(&self) -> &SnapshotFile {
        &self.snapshot_file
    }

    fn append_alert(&mut self, alert: &HarmonicAlert) -> PersistenceResult<()> {
        self.alerts.append(alert).map_err(|err| {
            log_warn!("Could not append alert for {:?}: {}", alert.circuit, err);
            err
        })
    }
}
