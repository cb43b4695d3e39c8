//! Persistence Integration Tests
//!
//! Exercise the monitor against real files: snapshot round-trips, legacy and
//! corrupt snapshots, the append-only alert log and report output.

use std::fs;

use circuitguard_core::{
    constants::NONCONFORMANCE_REPORT_FILE,
    report::write_report,
    AlertLog, FixedClock, LoadOutcome, MemoryAlertSink, Monitor, Parameter, SaveStamp,
    SnapshotError, SnapshotFile, SnapshotFormat,
};
use tempfile::TempDir;

fn monitor_in(dir: &TempDir) -> Monitor<AlertLog, FixedClock> {
    Monitor::new(
        SnapshotFile::new(dir.path().join("circuits_data.json")),
        AlertLog::new(dir.path().join("harmonic_alerts.log")),
        FixedClock::at_date(2025, 11, 5),
    )
}

#[test]
fn test_save_then_load_restores_store() {
    let dir = TempDir::new().unwrap();

    let mut first = monitor_in(&dir);
    first.record_line("Panel A; V=220; I=10; fp=0.95; f=60").unwrap();
    first.record_line("Motor; I=14; fp=0,78").unwrap();
    first.record_line("Panel A; I=12").unwrap();
    let saved = first.save().unwrap();
    assert_eq!(
        first.store().last_saved(),
        &SaveStamp::Saved("2025-11-05T00:00:00.000000".into())
    );

    let mut second = monitor_in(&dir);
    let outcome = second.load();
    assert!(matches!(
        outcome,
        LoadOutcome::Loaded {
            circuits: 2,
            format: SnapshotFormat::Wrapped
        }
    ));

    let restored: Vec<_> = second
        .store()
        .iter()
        .map(|(name, set)| (name.to_string(), set.clone()))
        .collect();
    let original: Vec<_> = saved.circuits.into_iter().collect();
    assert_eq!(restored, original);
    assert_eq!(
        second.store().get("Panel A").unwrap().get(Parameter::Current),
        Some(12.0)
    );
    // Loaded snapshots adopt the stamp they were saved with
    assert_eq!(second.store().last_saved(), first.store().last_saved());
}

#[test]
fn test_missing_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    let mut monitor = monitor_in(&dir);

    let outcome = monitor.load();
    assert!(matches!(
        outcome,
        LoadOutcome::Degraded(SnapshotError::NotFound { .. })
    ));
    assert!(monitor.store().is_empty());
    assert_eq!(monitor.store().last_saved(), &SaveStamp::NewFile);
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("circuits_data.json"), "{\"circuits\": {\"A\": ").unwrap();

    let mut monitor = monitor_in(&dir);
    assert!(matches!(
        monitor.load(),
        LoadOutcome::Degraded(SnapshotError::Corrupt { .. })
    ));
    assert!(monitor.store().is_empty());
    assert_eq!(monitor.store().last_saved(), &SaveStamp::Corrupt);

    // Still fully usable afterwards
    monitor.record_line("A; V=220").unwrap();
    assert!(monitor.save().is_ok());
}

#[test]
fn test_legacy_snapshot_loads_with_sentinel() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("circuits_data.json"),
        r#"{"Panel A": {"tensao": 220}}"#,
    )
    .unwrap();

    let mut monitor = monitor_in(&dir);
    assert!(matches!(
        monitor.load(),
        LoadOutcome::Loaded {
            circuits: 1,
            format: SnapshotFormat::Legacy
        }
    ));
    assert_eq!(
        monitor.store().get("Panel A").unwrap().get(Parameter::Voltage),
        Some(220.0)
    );
    assert_eq!(monitor.store().last_saved(), &SaveStamp::Legacy);

    // Saving upgrades the file to the wrapped form
    monitor.save().unwrap();
    let text = fs::read_to_string(dir.path().join("circuits_data.json")).unwrap();
    assert!(text.contains("\"lastSavedTimestamp\""));
    assert!(text.contains("\"circuits\""));
}

#[test]
fn test_save_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let mut monitor = monitor_in(&dir);
    monitor.record_line("A; V=220").unwrap();
    monitor.save().unwrap();

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, ["circuits_data.json"]);
}

#[test]
fn test_alert_log_is_append_only() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("harmonic_alerts.log");

    let mut first = monitor_in(&dir);
    assert_eq!(first.alert_sink().path(), log_path.as_path());
    first.record_line("Panel A; V=220; THD=9.5").unwrap();
    first.record_line("Panel A; THD=8.0").unwrap();
    let after_first = fs::read_to_string(&log_path).unwrap();
    assert_eq!(after_first.matches("[HARMONIC ALERT]").count(), 1);

    // A new process appends after what is already there
    let mut second = monitor_in(&dir);
    second.record_line("Panel A; THD=8.1").unwrap();
    second.harmonics_analysis();

    let after_second = fs::read_to_string(&log_path).unwrap();
    assert!(after_second.starts_with(&after_first));
    assert_eq!(after_second.matches("[HARMONIC ALERT]").count(), 3);
    assert!(after_second.contains("THD: 8.1% (limit 8%)"));
}

#[test]
fn test_scenario_full_line_with_high_thd() {
    let dir = TempDir::new().unwrap();
    let mut monitor = Monitor::new(
        SnapshotFile::new(dir.path().join("circuits_data.json")),
        MemoryAlertSink::new(),
        FixedClock::at_date(2025, 11, 5),
    );

    let outcome = monitor
        .record_line("Panel A; V=220; I=10; fp=0.95; f=60; THD=9.5")
        .unwrap();

    assert_eq!(monitor.store().get("Panel A").unwrap().len(), 5);
    assert!(monitor.nonconformance().is_empty());
    assert_eq!(outcome.alert.map(|alert| alert.thd), Some(9.5));
    assert_eq!(monitor.alert_sink().alerts().len(), 1);
    assert!(monitor.alert_sink().contents().contains("Circuit: Panel A"));
}

#[test]
fn test_reports_are_written_to_directory() {
    let dir = TempDir::new().unwrap();
    let mut monitor = monitor_in(&dir);
    monitor.record_line("Motor; V=200; I=60").unwrap();

    let path = write_report(
        dir.path(),
        NONCONFORMANCE_REPORT_FILE,
        &monitor.nonconformance_report(),
    )
    .unwrap();

    let text = fs::read_to_string(path).unwrap();
    assert!(text.contains("Most loaded circuit:  Motor - 120.0% of the 50 A limit"));
    assert!(text.contains("2 non-conformance(s) across 1 circuit(s)."));
    assert!(text.contains("above maximum (limit 50)"));
}
