//! Property tests for line parsing and merging

use circuitguard_core::{parse_line, CircuitStore, MeasurementSet, Parameter};
use proptest::prelude::*;

fn token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("V".to_string()),
        Just("i".to_string()),
        Just("fp".to_string()),
        Just("F".to_string()),
        Just("thd".to_string()),
        "[a-zA-Z]{1,4}",
    ]
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        (token(), -1000.0f64..1000.0).prop_map(|(t, v)| format!("{t}={v}")),
        (token(), "[^;]{0,8}").prop_map(|(t, v)| format!(" {t} = {v} ")),
        "[^;=]{0,8}",
    ]
}

proptest! {
    #[test]
    fn parse_never_fails_with_a_name(
        name in "[A-Za-z][A-Za-z0-9 ]{0,15}",
        segments in prop::collection::vec(segment(), 0..8),
    ) {
        let line = std::iter::once(name.clone()).chain(segments).collect::<Vec<_>>().join(";");
        let parsed = parse_line(&line);

        prop_assert!(parsed.is_ok());
        let parsed = parsed.unwrap();
        prop_assert_eq!(parsed.circuit, name.trim());
        prop_assert!(parsed.measurements.len() <= Parameter::ALL.len());
    }

    #[test]
    fn merge_keeps_only_latest_value(values in prop::collection::vec(-500.0f64..500.0, 1..10)) {
        let mut store = CircuitStore::new();
        for value in &values {
            let update: MeasurementSet = [(Parameter::Voltage, *value)].into_iter().collect();
            store.merge("Q1", &update);
            store.merge("Q1", &update);
        }

        let stored = store.get("Q1").unwrap();
        prop_assert_eq!(stored.get(Parameter::Voltage), values.last().copied());
        prop_assert_eq!(stored.len(), 1);
    }
}
