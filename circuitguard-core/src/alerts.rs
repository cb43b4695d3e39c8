//! Harmonic alert log
//!
//! Alerts are appended, one self-contained text block each, and never
//! rewritten, truncated or deduplicated. Two sinks share the [`AlertSink`]
//! trait:
//! - [`AlertLog`] appends to a file
//! - [`MemoryAlertSink`] keeps blocks in memory for testing

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::catalog::Parameter;
use crate::conformance::HarmonicAlert;
use crate::constants::{REPORT_RULE_WIDTH, THD_MAX_PCT};
use crate::errors::{PersistenceError, PersistenceResult};
use crate::report::{format_value, with_unit};
use crate::time::human;

/// Destination for harmonic alerts
pub trait AlertSink {
    /// Durably append one alert
    fn append(&mut self, alert: &HarmonicAlert) -> PersistenceResult<()>;
}

/// Render one alert as a standalone block
pub fn format_alert(alert: &HarmonicAlert) -> String {
    let rule = "=".repeat(REPORT_RULE_WIDTH);
    let mut block = String::new();

    block.push_str(&rule);
    block.push('\n');
    block.push_str(&format!("[HARMONIC ALERT] {}\n", human(&alert.raised_at)));
    block.push_str(&format!("Circuit: {}\n", alert.circuit));
    block.push_str(&format!(
        "THD: {}% (limit {}%)\n",
        format_value(alert.thd),
        format_value(THD_MAX_PCT)
    ));
    block.push_str("Measurements at time of alert:\n");
    for parameter in Parameter::ALL {
        if let Some(value) = alert.measurements.get(parameter) {
            block.push_str(&format!(
                "  - {}: {}\n",
                parameter.label(),
                with_unit(value, parameter)
            ));
        }
    }
    block.push_str(&rule);
    block.push_str("\n\n");
    block
}

/// Append-only alert file
#[derive(Debug, Clone)]
pub struct AlertLog {
    path: PathBuf,
}

impl AlertLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlertSink for AlertLog {
    fn append(&mut self, alert: &HarmonicAlert) -> PersistenceResult<()> {
        let block = format_alert(alert);

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                // Single write so each block lands whole
                file.write_all(block.as_bytes())?;
                file.flush()
            })
            .map_err(|source| PersistenceError::write(&self.path, source))
    }
}

/// In-memory sink for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryAlertSink {
    alerts: Vec<HarmonicAlert>,
    /// When set, every append fails with this message
    fail_with: Option<String>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose appends always fail, for exercising error paths
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            alerts: Vec::new(),
            fail_with: Some(message.into()),
        }
    }

    pub fn alerts(&self) -> &[HarmonicAlert] {
        &self.alerts
    }

    /// Everything appended so far, rendered as it would be on disk
    pub fn contents(&self) -> String {
        self.alerts.iter().map(format_alert).collect()
    }
}

impl AlertSink for MemoryAlertSink {
    fn append(&mut self, alert: &HarmonicAlert) -> PersistenceResult<()> {
        if let Some(message) = &self.fail_with {
            return Err(PersistenceError::write(
                "<memory>",
                std::io::Error::new(std::io::ErrorKind::Other, message.clone()),
            ));
        }
        self.alerts.push(alert.clone());
        Ok(())
    }
}

impl<S: AlertSink + ?Sized> AlertSink for &mut S {
    fn append(&mut self, alert: &HarmonicAlert) -> PersistenceResult<()> {
        (**self).append(alert)
    }
}
