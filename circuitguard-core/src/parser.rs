//! Measurement Line Parser
//!
//! ## Line Format
//!
//! ```text
//! <circuit name> ; <token>=<value> ; <token>=<value> ; ...
//! ```
//!
//! - Segments are separated by `;`. The first one, trimmed, is the circuit name.
//! - Each following segment is split on its first `=` only.
//! - Tokens are the short catalog names, case-insensitive: `V`, `I`, `FP`, `F`, `THD`.
//! - Values accept a comma as decimal separator (`0,95` reads as `0.95`).
//! - Segment order does not matter. A repeated token keeps its last value.
//!
//! ## Failure Model
//!
//! Only a blank circuit name rejects the line. Every other problem drops the
//! offending segment and is reported as a [`ParseWarning`] alongside the data
//! that did parse, so a single typo never costs the operator a whole reading.
//!
//! The parser is pure: it never logs or prints. Rendering warnings is up to
//! the caller.
//!
//! ```rust
//! use circuitguard_core::{parse_line, Parameter};
//!
//! let parsed = parse_line("Panel A; V=220; fp=0,95; kW=3").unwrap();
//! assert_eq!(parsed.circuit, "Panel A");
//! assert_eq!(parsed.measurements.get(Parameter::PowerFactor), Some(0.95));
//! assert_eq!(parsed.warnings.len(), 1);
//! ```

use crate::catalog::resolve_token;
use crate::errors::{ParseError, ParseResult, ParseWarning};
use crate::store::MeasurementSet;

const SEGMENT_SEPARATOR: char = ';';
const VALUE_SEPARATOR: char = '=';

/// Outcome of parsing one line: the data that made it, plus what was dropped
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// Trimmed circuit name, never empty
    pub circuit: String,
    /// Parameters that parsed cleanly; may be empty
    pub measurements: MeasurementSet,
    /// One entry per dropped segment, in line order
    pub warnings: Vec<ParseWarning>,
}

impl ParsedLine {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Parse one raw measurement line
pub fn parse_line(line: &str) -> ParseResult<ParsedLine> {
    let mut segments = line.split(SEGMENT_SEPARATOR);

    let circuit = segments.next().unwrap_or_default().trim();
    if circuit.is_empty() {
        return Err(ParseError::EmptyCircuitName {
            line: line.to_string(),
        });
    }

    let mut measurements = MeasurementSet::new();
    let mut warnings = Vec::new();

    for segment in segments {
        let segment = segment.trim();
        // Trailing or doubled separators ("A; V=220;") carry nothing
        if segment.is_empty() {
            continue;
        }

        let Some((token, value)) = segment.split_once(VALUE_SEPARATOR) else {
            warnings.push(ParseWarning::MissingSeparator {
                segment: segment.to_string(),
            });
            continue;
        };

        let token = token.trim();
        let value = value.trim();

        let Some(parameter) = resolve_token(token) else {
            warnings.push(ParseWarning::UnknownToken {
                token: token.to_string(),
            });
            continue;
        };

        match parse_value(value) {
            Some(number) => measurements.set(parameter, number),
            None => warnings.push(ParseWarning::MalformedValue {
                token: token.to_string(),
                value: value.to_string(),
            }),
        }
    }

    Ok(ParsedLine {
        circuit: circuit.to_string(),
        measurements,
        warnings,
    })
}

/// Parse a numeric value, treating commas as decimal points
///
/// Non-finite results ("inf", "NaN") are rejected like any other garbage.
pub fn parse_value(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
