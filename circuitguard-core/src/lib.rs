//! Measurement ingestion and conformance engine for CircuitGuard
//!
//! Turns hand-typed circuit measurement lines into per-circuit records,
//! checks them against fixed safe ranges, and raises an append-only alert
//! whenever harmonic distortion crosses its threshold.
//!
//! Key properties:
//! - A bad token never costs the rest of the line
//! - Loading never fails; a missing or corrupt snapshot yields an empty store
//! - Writes either complete or leave memory untouched
//!
//! ```no_run
//! use circuitguard_core::{Monitor, MonitorConfig};
//!
//! let (mut monitor, _loaded) = Monitor::open(&MonitorConfig::default());
//!
//! let outcome = monitor.record_line("Panel A; V=220; I=10; fp=0,95; f=60; THD=9.5")?;
//! if outcome.alert.is_some() {
//!     // THD above 8% was appended to the alert log
//! }
//!
//! println!("{}", monitor.nonconformance_report());
//! monitor.save()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod aggregate;
pub mod alerts;
pub mod catalog;
pub mod conformance;
pub mod constants;
pub mod errors;
pub mod monitor;
pub mod parser;
pub mod report;
pub mod snapshot;
pub mod store;
pub mod time;

// Public API
pub use aggregate::{total_apparent_power, ApparentPowerSummary, CircuitPower};
pub use alerts::{AlertLog, AlertSink, MemoryAlertSink};
pub use catalog::{range_of, resolve_token, Parameter, SafeRange};
pub use conformance::{
    evaluate_all, evaluate_harmonics, lowest_power_factor, most_loaded, sweep_harmonics,
    ConformanceFinding, Direction, HarmonicAlert, Highlights,
};
pub use errors::{ParseError, ParseWarning, PersistenceError, SnapshotError};
pub use monitor::{HarmonicsOutcome, Monitor, MonitorConfig, RecordOutcome};
pub use parser::{parse_line, ParsedLine};
pub use snapshot::{DecodedSnapshot, Snapshot, SnapshotFile, SnapshotFormat};
pub use store::{CircuitStore, LoadOutcome, MeasurementSet, SaveStamp};
pub use time::{Clock, FixedClock, SystemClock};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
