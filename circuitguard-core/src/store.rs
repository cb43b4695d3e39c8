//! Circuit Store
//!
//! The only mutable state in CircuitGuard: circuit name → latest known values.
//!
//! ## Merge Semantics
//!
//! Each incoming reading overwrites only the parameters it carries. There is
//! no history: the stored set is always the fold of every merge so far, last
//! write wins per parameter.
//!
//! ```text
//! store:    Panel A { V=220, I=10 }
//! merge:    Panel A { I=12, f=60 }
//! result:   Panel A { V=220, I=12, f=60 }
//! ```
//!
//! ## Save Stamp
//!
//! The store also remembers when its content was last saved. Loading adopts
//! the snapshot's own stamp; when loading fails the stamp explains why the
//! store is empty instead.

use core::fmt;
use std::collections::btree_map::{self, BTreeMap};

use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::catalog::Parameter;
use crate::errors::SnapshotError;
use crate::snapshot::{DecodedSnapshot, Snapshot, SnapshotFormat};
use crate::time::Clock;

/// Partial mapping of parameter → value for one circuit
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MeasurementSet(BTreeMap<Parameter, f64>);

impl MeasurementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.0.get(&parameter).copied()
    }

    /// Store a value, replacing any previous one for the same parameter
    pub fn set(&mut self, parameter: Parameter, value: f64) {
        self.0.insert(parameter, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        self.0.iter().map(|(parameter, value)| (*parameter, *value))
    }

    /// Overwrite this set with every value present in `update`
    pub fn merge_from(&mut self, update: &MeasurementSet) {
        for (parameter, value) in update.iter() {
            self.set(parameter, value);
        }
    }
}

impl FromIterator<(Parameter, f64)> for MeasurementSet {
    fn from_iter<T: IntoIterator<Item = (Parameter, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Unknown keys are dropped rather than failing the snapshot, so data written
// by a build that knows more parameters still loads.
impl<'de> Deserialize<'de> for MeasurementSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = MeasurementSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to numbers")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
                let mut set = MeasurementSet::new();
                while let Some(key) = map.next_key::<String>()? {
                    match Parameter::from_canonical_name(&key) {
                        Some(parameter) => {
                            let value: f64 = map.next_value()?;
                            set.set(parameter, value);
                        }
                        None => {
                            map.next_value::<IgnoredAny>()?;
                            log_warn!("Dropping unknown stored parameter {:?}", key);
                        }
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

/// When the store content was last saved, or why that is unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStamp {
    /// Fresh process, nothing loaded or saved
    Unsaved,
    /// No snapshot existed at load time
    NewFile,
    /// Snapshot could not be read from disk
    Unreadable,
    /// Snapshot was not valid JSON or had the wrong shape
    Corrupt,
    /// Snapshot was the bare legacy mapping without a timestamp
    Legacy,
    /// Snapshot had the wrapper but no timestamp field
    Missing,
    /// ISO-8601 timestamp of the last successful save
    Saved(String),
}

impl SaveStamp {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStamp::Saved(_))
    }
}

impl fmt::Display for SaveStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStamp::Unsaved => f.write_str("N/A (data not saved yet)"),
            SaveStamp::NewFile => f.write_str("N/A (new file)"),
            SaveStamp::Unreadable => f.write_str("N/A (file unreadable)"),
            SaveStamp::Corrupt => f.write_str("N/A (corrupt file)"),
            SaveStamp::Legacy => f.write_str("N/A (legacy format, save to upgrade)"),
            SaveStamp::Missing => f.write_str("N/A"),
            SaveStamp::Saved(at) => f.write_str(at),
        }
    }
}

/// What [`CircuitStore::load`] ended up doing
#[derive(Debug)]
pub enum LoadOutcome {
    /// Snapshot content replaced the store
    Loaded {
        circuits: usize,
        format: SnapshotFormat,
    },
    /// Store was reset to empty; the error says why
    Degraded(SnapshotError),
}

/// In-memory circuit records plus the last save stamp
#[derive(Debug, Clone)]
pub struct CircuitStore {
    circuits: BTreeMap<String, MeasurementSet>,
    last_saved: SaveStamp,
}

impl Default for CircuitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitStore {
    pub fn new() -> Self {
        Self {
            circuits: BTreeMap::new(),
            last_saved: SaveStamp::Unsaved,
        }
    }

    /// Merge a reading into a circuit, creating the circuit if needed
    ///
    /// Returns the circuit's full set after the merge. An empty update still
    /// creates the circuit but changes no values.
    pub fn merge(&mut self, circuit: &str, measurements: &MeasurementSet) -> &MeasurementSet {
        let stored = self.circuits.entry(circuit.to_string()).or_default();
        stored.merge_from(measurements);
        log_debug!(
            "Merged {} parameter(s) into {:?} ({} stored)",
            measurements.len(),
            circuit,
            stored.len()
        );
        stored
    }

    /// Replace the whole store from a snapshot read attempt
    ///
    /// Never fails: any error empties the store and is handed back inside
    /// [`LoadOutcome::Degraded`] with the save stamp set accordingly.
    pub fn load(&mut self, source: Result<DecodedSnapshot, SnapshotError>) -> LoadOutcome {
        match source {
            Ok(DecodedSnapshot { snapshot, format }) => {
                self.last_saved = match (format, snapshot.last_saved_timestamp) {
                    (SnapshotFormat::Legacy, _) => SaveStamp::Legacy,
                    (SnapshotFormat::Wrapped, Some(at)) => SaveStamp::Saved(at),
                    (SnapshotFormat::Wrapped, None) => SaveStamp::Missing,
                };
                self.circuits = snapshot.circuits;

                log_info!(
                    "Loaded {} circuit(s), last saved: {}",
                    self.circuits.len(),
                    self.last_saved
                );
                LoadOutcome::Loaded {
                    circuits: self.circuits.len(),
                    format,
                }
            }
            Err(err) => {
                self.circuits.clear();
                self.last_saved = match &err {
                    SnapshotError::NotFound { .. } => SaveStamp::NewFile,
                    SnapshotError::Io { .. } => SaveStamp::Unreadable,
                    SnapshotError::Corrupt { .. } => SaveStamp::Corrupt,
                };

                log_warn!("Starting with an empty store: {}", err);
                LoadOutcome::Degraded(err)
            }
        }
    }

    /// Capture current content with a fresh timestamp, without marking it saved
    pub fn snapshot(&self, clock: &dyn Clock) -> Snapshot {
        Snapshot {
            last_saved_timestamp: Some(clock.iso_timestamp()),
            circuits: self.circuits.clone(),
        }
    }

    /// Capture a snapshot and hand it to `write`
    ///
    /// The save stamp only moves forward when `write` succeeds; on failure the
    /// store is left exactly as it was.
    pub fn save<E>(
        &mut self,
        clock: &dyn Clock,
        write: impl FnOnce(&Snapshot) -> Result<(), E>,
    ) -> Result<Snapshot, E> {
        let snapshot = self.snapshot(clock);
        write(&snapshot)?;
        self.commit_save(&snapshot);
        Ok(snapshot)
    }

    /// Adopt a snapshot's timestamp as the last successful save
    pub fn commit_save(&mut self, snapshot: &Snapshot) {
        if let Some(at) = &snapshot.last_saved_timestamp {
            self.last_saved = SaveStamp::Saved(at.clone());
        }
    }

    pub fn last_saved(&self) -> &SaveStamp {
        &self.last_saved
    }

    pub fn get(&self, circuit: &str) -> Option<&MeasurementSet> {
        self.circuits.get(circuit)
    }

    pub fn contains(&self, circuit: &str) -> bool {
        self.circuits.contains_key(circuit)
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Circuits in name order
    pub fn iter(&self) -> Circuits<'_> {
        Circuits {
            inner: self.circuits.iter(),
        }
    }
}

/// Iterator over `(name, measurements)` pairs, ordered by name
pub struct Circuits<'a> {
    inner: btree_map::Iter<'a, String, MeasurementSet>,
}

impl<'a> Iterator for Circuits<'a> {
    type Item = (&'a str, &'a MeasurementSet);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(name, set)| (name.as_str(), set))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a CircuitStore {
    type Item = (&'a str, &'a MeasurementSet);
    type IntoIter = Circuits<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
