//! Error Types for Measurement Ingestion and Persistence
//!
//! ## Design Philosophy
//!
//! Nothing in CircuitGuard is fatal to the running process. The error types
//! below exist so that callers can tell the recoverable cases apart and report
//! them to the operator:
//!
//! 1. **Line rejection**: `ParseError` means the whole line was refused and
//!    nothing was merged.
//! 2. **Token degradation**: `ParseWarning` is not an error at all from the
//!    caller's point of view. The token is dropped and the rest of the line
//!    still lands in the store.
//! 3. **Load degradation**: `SnapshotError` is consumed by
//!    [`CircuitStore::load`](crate::store::CircuitStore::load), which falls back
//!    to an empty store and records why in the save stamp.
//! 4. **Write failure**: `PersistenceError` leaves in-memory state untouched so
//!    the operator may retry.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use circuitguard_core::{parse_line, ParseError};
//!
//! match parse_line("  ; V=220") {
//!     Ok(parsed) => {
//!         // merge parsed.measurements, show parsed.warnings
//!         # let _ = parsed;
//!     }
//!     Err(ParseError::EmptyCircuitName { .. }) => {
//!         // prompt the operator again
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for line parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for snapshot decoding and reading
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Result type for durable writes
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A measurement line that cannot be recorded at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The leading segment is blank after trimming
    #[error("circuit name cannot be empty (line: {line:?})")]
    EmptyCircuitName {
        /// The raw line as submitted
        line: String,
    },
}

/// Per-segment problems that drop a single token but keep the line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Segment has no `=` between token and value
    #[error("segment {segment:?} has no '=' and was ignored")]
    MissingSeparator {
        /// The trimmed segment text
        segment: String,
    },

    /// Token is not one of the catalog's short names
    #[error("unknown parameter {token:?} ignored")]
    UnknownToken {
        /// The trimmed token text
        token: String,
    },

    /// Value side is not a finite number
    #[error("value {value:?} for {token:?} is not a number and was ignored")]
    MalformedValue {
        /// The trimmed token text
        token: String,
        /// The trimmed value text, before decimal normalization
        value: String,
    },
}

/// Why a snapshot could not be turned into store content
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// No snapshot exists at the given location
    #[error("snapshot file {path} not found")]
    NotFound {
        /// Location that was probed
        path: PathBuf,
    },

    /// The file exists but could not be read
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        /// Location that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// The content is not valid JSON or has the wrong shape
    #[error("snapshot is corrupt: {reason}")]
    Corrupt {
        /// Decoder message
        reason: String,
    },
}

/// A durable write that did not complete
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Serialization failed before touching the disk
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    /// The file could not be written, appended to, or renamed into place
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target location
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display_names_the_segment() {
        let warning = ParseWarning::UnknownToken { token: "kW".into() };
        assert_eq!(warning.to_string(), "unknown parameter \"kW\" ignored");

        let warning = ParseWarning::MalformedValue {
            token: "V".into(),
            value: "abc".into(),
        };
        assert!(warning.to_string().contains("\"abc\""));
    }

    #[test]
    fn write_error_keeps_path() {
        let err = PersistenceError::write(
            "/nowhere/data.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("failed to write /nowhere/data.json"));
    }
}
