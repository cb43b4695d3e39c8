//! Safe Operating Ranges and Defaults
//!
//! All numeric limits used by the conformance pass are defined here, once.
//! Bounds are inclusive: a reading exactly on a limit conforms.

// ===== VOLTAGE =====

/// Lowest acceptable line voltage (V).
///
/// Nominal 220 V supply with a -10 V band.
pub const VOLTAGE_MIN_V: f64 = 210.0;

/// Highest acceptable line voltage (V).
///
/// Nominal 220 V supply with a +10 V band.
pub const VOLTAGE_MAX_V: f64 = 230.0;

// ===== CURRENT =====

/// Lowest acceptable current (A). Negative readings indicate a wiring or probe fault.
pub const CURRENT_MIN_A: f64 = 0.0;

/// Highest acceptable current per circuit (A).
pub const CURRENT_MAX_A: f64 = 50.0;

// ===== POWER FACTOR =====

/// Minimum power factor before a circuit is considered poorly compensated.
pub const POWER_FACTOR_MIN: f64 = 0.92;

/// Power factor cannot exceed unity.
pub const POWER_FACTOR_MAX: f64 = 1.0;

// ===== FREQUENCY =====

/// Lowest acceptable grid frequency (Hz) for a 60 Hz system.
pub const FREQUENCY_MIN_HZ: f64 = 59.5;

/// Highest acceptable grid frequency (Hz) for a 60 Hz system.
pub const FREQUENCY_MAX_HZ: f64 = 60.5;

// ===== HARMONIC DISTORTION =====

/// THD lower bound (%).
pub const THD_MIN_PCT: f64 = 0.0;

/// THD alert threshold (%).
///
/// Readings strictly above this raise a harmonic alert. A reading of exactly
/// 8.0 conforms.
pub const THD_MAX_PCT: f64 = 8.0;

// ===== FILES =====

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "circuits_data.json";

/// Default append-only harmonic alert log.
pub const DEFAULT_ALERT_LOG: &str = "harmonic_alerts.log";

/// Report file names, written inside the report directory.
pub const NONCONFORMANCE_REPORT_FILE: &str = "nonconformance_report.txt";
pub const SUMMARY_REPORT_FILE: &str = "electrical_summary.txt";
pub const HARMONICS_REPORT_FILE: &str = "harmonics_report.txt";

// ===== FORMATTING =====

/// Timestamp format used in report headers and alert blocks.
pub const HUMAN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format written into snapshots (ISO-8601, local time, microseconds).
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Width of the `=` rule separating report sections.
pub const REPORT_RULE_WIDTH: usize = 45;
