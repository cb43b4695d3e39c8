//! Durable snapshots of the circuit store
//!
//! ## Formats
//!
//! Current (written by every save):
//! ```json
//! {
//!     "lastSavedTimestamp": "2025-11-05T10:32:00.123456",
//!     "circuits": {
//!         "Panel A": { "tensao": 220.0, "corrente": 10.0 }
//!     }
//! }
//! ```
//!
//! Legacy (accepted on load only): the bare `circuits` mapping with no
//! wrapper and no timestamp. The older wrapper keys `ultimo_salvamento` and
//! `circuitos` are also accepted.
//!
//! A top-level object is treated as the wrapper when it has a `circuits` (or
//! `circuitos`) key, and as a legacy mapping otherwise.
//!
//! ## Atomic Writes
//!
//! [`SnapshotFile::write`] encodes first, writes a sibling temporary file and
//! renames it into place, so a failed save never leaves a half-written file
//! where the previous snapshot used to be.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{PersistenceError, PersistenceResult, SnapshotError, SnapshotResult};
use crate::store::MeasurementSet;

const WRAPPER_KEYS: [&str; 2] = ["circuits", "circuitos"];

/// Save timestamp plus the full store content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(
        default,
        alias = "ultimo_salvamento",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_saved_timestamp: Option<String>,

    #[serde(alias = "circuitos")]
    pub circuits: BTreeMap<String, MeasurementSet>,
}

/// Which on-disk shape a snapshot was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// `{ lastSavedTimestamp, circuits }`
    Wrapped,
    /// Bare circuit mapping
    Legacy,
}

/// A decoded snapshot and the shape it came in
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSnapshot {
    pub snapshot: Snapshot,
    pub format: SnapshotFormat,
}

/// Decode snapshot JSON, accepting both the current and the legacy shape
pub fn decode(text: &str) -> SnapshotResult<DecodedSnapshot> {
    let value: Value = serde_json::from_str(text).map_err(corrupt)?;

    let Value::Object(object) = &value else {
        return Err(SnapshotError::Corrupt {
            reason: "top-level value is not an object".to_string(),
        });
    };

    if WRAPPER_KEYS.iter().any(|key| object.contains_key(*key)) {
        let snapshot: Snapshot = serde_json::from_value(value).map_err(corrupt)?;
        Ok(DecodedSnapshot {
            snapshot,
            format: SnapshotFormat::Wrapped,
        })
    } else {
        log_warn!("Snapshot is in the legacy format; save to upgrade it");
        let circuits: BTreeMap<String, MeasurementSet> =
            serde_json::from_value(value).map_err(corrupt)?;
        Ok(DecodedSnapshot {
            snapshot: Snapshot {
                last_saved_timestamp: None,
                circuits,
            },
            format: SnapshotFormat::Legacy,
        })
    }
}

/// Encode a snapshot as pretty-printed JSON with 4-space indentation
pub fn encode(snapshot: &Snapshot) -> PersistenceResult<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    snapshot.serialize(&mut serializer)?;
    out.push(b'\n');
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn corrupt(err: serde_json::Error) -> SnapshotError {
    SnapshotError::Corrupt {
        reason: err.to_string(),
    }
}

/// Snapshot stored at a filesystem path
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode, telling "missing" apart from "unreadable" and "corrupt"
    pub fn read(&self) -> SnapshotResult<DecodedSnapshot> {
        let text = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SnapshotError::NotFound {
                    path: self.path.clone(),
                }
            } else if source.kind() == io::ErrorKind::InvalidData {
                // Not UTF-8
                SnapshotError::Corrupt {
                    reason: source.to_string(),
                }
            } else {
                SnapshotError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        decode(&text)
    }

    /// Encode and atomically replace the file
    pub fn write(&self, snapshot: &Snapshot) -> PersistenceResult<()> {
        let text = encode(snapshot)?;
        let tmp = self.temp_path();

        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(text.as_bytes())?;
            file.sync_all()
        });
        if let Err(source) = written {
            let _ = fs::remove_file(&tmp);
            return Err(PersistenceError::write(&tmp, source));
        }

        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            PersistenceError::write(&self.path, source)
        })?;

        log_info!(
            "Saved {} circuit(s) to {}",
            snapshot.circuits.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Parameter;

    #[test]
    fn decodes_wrapped_snapshot() {
        let decoded = decode(
            r#"{"lastSavedTimestamp": "2025-11-05T10:00:00", "circuits": {"Panel A": {"tensao": 220, "thd": 3.5}}}"#,
        )
        .unwrap();

        assert_eq!(decoded.format, SnapshotFormat::Wrapped);
        assert_eq!(
            decoded.snapshot.last_saved_timestamp.as_deref(),
            Some("2025-11-05T10:00:00")
        );
        let panel = &decoded.snapshot.circuits["Panel A"];
        assert_eq!(panel.get(Parameter::Voltage), Some(220.0));
        assert_eq!(panel.get(Parameter::HarmonicDistortion), Some(3.5));
    }

    #[test]
    fn decodes_original_wrapper_keys() {
        let decoded = decode(
            r#"{"ultimo_salvamento": "2025-11-05T10:00:00", "circuitos": {"Motor": {"corrente": 14.0}}}"#,
        )
        .unwrap();

        assert_eq!(decoded.format, SnapshotFormat::Wrapped);
        assert_eq!(
            decoded.snapshot.circuits["Motor"].get(Parameter::Current),
            Some(14.0)
        );
    }

    #[test]
    fn decodes_legacy_mapping() {
        let decoded = decode(r#"{"Panel A": {"tensao": 220}}"#).unwrap();

        assert_eq!(decoded.format, SnapshotFormat::Legacy);
        assert_eq!(decoded.snapshot.last_saved_timestamp, None);
        assert_eq!(
            decoded.snapshot.circuits["Panel A"].get(Parameter::Voltage),
            Some(220.0)
        );
    }

    #[test]
    fn wrapper_without_timestamp_is_accepted() {
        let decoded = decode(r#"{"circuits": {}}"#).unwrap();
        assert_eq!(decoded.format, SnapshotFormat::Wrapped);
        assert_eq!(decoded.snapshot.last_saved_timestamp, None);
    }

    #[test]
    fn unknown_stored_parameters_are_dropped() {
        let decoded = decode(r#"{"circuits": {"Q1": {"tensao": 221, "potencia": 3}}}"#).unwrap();
        assert_eq!(decoded.snapshot.circuits["Q1"].len(), 1);
    }

    #[test]
    fn rejects_corrupt_input() {
        for text in ["{not json", "[1, 2]", "42", r#"{"Q1": {"tensao": "high"}}"#, r#"{"Q1": 5}"#] {
            assert!(
                matches!(decode(text), Err(SnapshotError::Corrupt { .. })),
                "{text} should be corrupt"
            );
        }
    }

    #[test]
    fn encode_uses_canonical_names() {
        let mut circuits = BTreeMap::new();
        circuits.insert(
            "Q1".to_string(),
            [(Parameter::PowerFactor, 0.95)].into_iter().collect(),
        );
        let text = encode(&Snapshot {
            last_saved_timestamp: Some("2025-11-05T00:00:00.000000".into()),
            circuits,
        })
        .unwrap();

        assert!(text.contains("\"lastSavedTimestamp\": \"2025-11-05T00:00:00.000000\""));
        assert!(text.contains("\"fator_potencia\": 0.95"));
        assert!(text.contains("\n    \"circuits\""));
    }
}
