use myenovos::error::EnovosError;
use myenovos::points::{ContractTags, MEASUREMENT, normalize_readings};
use myenovos::portal::ConsumptionReading;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn tags() -> ContractTags {
    ContractTags {
        contract_nr: "600002".to_string(),
        customer_nr: "4711".to_string(),
        device_designation: "LU-POD-600002".to_string(),
        product_name: "nova naturstroum".to_string(),
        installation_id: "INST-600002".to_string(),
        installation_service_type: "Electricity".to_string(),
    }
}

fn readings(raw: Value) -> Vec<ConsumptionReading> {
    serde_json::from_value(raw).unwrap()
}

#[test]
fn only_maco_readings_survive() {
    let raw = readings(json!([
        { "ts": "2024-03-01T00:00:00Z", "status": "MACO", "value": "3.5" },
        { "ts": "2024-03-01T00:15:00Z", "status": "EST", "value": "1.0" },
        { "ts": "2024-03-01T00:30:00Z", "status": "EST", "value": "garbage" }
    ]));

    let points = normalize_readings(&raw, &tags()).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].value(), 3.5);
    assert_eq!(points[0].measurement, MEASUREMENT);
    assert_eq!(points[0].tags, tags());
    assert_eq!(points[0].time.to_rfc3339(), "2024-03-01T00:00:00+00:00");
}

#[test]
fn order_is_preserved() {
    let raw = readings(json!([
        { "ts": "2024-03-01T00:30:00+01:00", "status": "MACO", "value": 2 },
        { "ts": "2024-03-01T00:15:00+01:00", "status": "MACO", "value": 1 }
    ]));

    let values: Vec<f64> = normalize_readings(&raw, &tags())
        .unwrap()
        .iter()
        .map(|p| p.value())
        .collect();
    assert_eq!(values, vec![2.0, 1.0]);
}

#[test]
fn normalization_is_idempotent() {
    let raw = readings(json!([
        { "ts": "2024-03-01T00:00:00Z", "status": "MACO", "value": "0.25" },
        { "ts": "2024-03-01T00:15:00Z", "status": "MACO", "value": "0.5" }
    ]));

    let first = normalize_readings(&raw, &tags()).unwrap();
    let second = normalize_readings(&raw, &tags()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn duplicate_instants_keep_first_reading() {
    let raw = readings(json!([
        { "ts": "2024-03-01T01:00:00+01:00", "status": "MACO", "value": "1.0" },
        { "ts": "2024-03-01T00:00:00Z", "status": "MACO", "value": "9.0" }
    ]));

    let points = normalize_readings(&raw, &tags()).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].value(), 1.0);
}

#[test]
fn empty_input_gives_empty_output() {
    assert!(normalize_readings(&[], &tags()).unwrap().is_empty());
}

#[test]
fn bad_maco_value_is_upstream_error() {
    let raw = readings(json!([
        { "ts": "2024-03-01T00:00:00Z", "status": "MACO", "value": "n/a" }
    ]));

    let err = normalize_readings(&raw, &tags()).unwrap_err();
    assert!(matches!(err, EnovosError::Upstream { .. }));
}

#[test]
fn status_match_is_exact() {
    let raw = readings(json!([
        { "ts": "2024-03-01T00:00:00Z", "status": "maco", "value": "1" },
        { "ts": "2024-03-01T00:15:00Z", "status": "MACO ", "value": "1" }
    ]));

    assert!(normalize_readings(&raw, &tags()).unwrap().is_empty());
}

#[test]
fn iso8601_offset_variants_are_accepted() {
    let raw = readings(json!([
        { "ts": "2024-03-01T01:00:00+0100", "status": "MACO", "value": "1.0" },
        { "ts": "2024-03-01T01:15:00.000+01", "status": "MACO", "value": "2.0" },
        { "ts": "2024-03-01T00:30Z", "status": "MACO", "value": "3.0" }
    ]));

    let points = normalize_readings(&raw, &tags()).unwrap();
    let instants: Vec<i64> = points.iter().map(|p| p.time.timestamp()).collect();
    assert_eq!(instants, vec![1_709_251_200, 1_709_252_100, 1_709_253_000]);
    assert_eq!(points[0].time.offset().local_minus_utc(), 3600);
}
