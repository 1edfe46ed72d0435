//! Normalization of raw portal readings into time-series points

use crate::error::{EnovosError, Result};
use crate::portal::graph::ContractData;
use crate::portal::history::ConsumptionReading;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Measurement name of every emitted point
pub const MEASUREMENT: &str = "Enovos Consumption";

/// Status of measured/confirmed readings; everything else is dropped
pub const MACO_STATUS: &str = "MACO";

/// Tag set shared by all points of one contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractTags {
    pub contract_nr: String,
    pub customer_nr: String,
    pub device_designation: String,
    pub product_name: String,
    pub installation_id: String,
    pub installation_service_type: String,
}

impl ContractTags {
    /// Tag key/value pairs in a stable order
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("contract_nr", self.contract_nr.as_str()),
            ("customer_nr", self.customer_nr.as_str()),
            ("device_designation", self.device_designation.as_str()),
            ("installation_id", self.installation_id.as_str()),
            ("installation_service_type", self.installation_service_type.as_str()),
            ("product_name", self.product_name.as_str()),
        ]
    }
}

impl From<&ContractData> for ContractTags {
    fn from(data: &ContractData) -> Self {
        Self {
            contract_nr: data.contract_nr.clone(),
            customer_nr: data.customer_id.clone(),
            device_designation: data.device_designation.clone(),
            product_name: data.product_name.clone(),
            installation_id: data.installation_id.clone(),
            installation_service_type: data.installation_service_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointFields {
    pub value: f64,
}

/// One confirmed consumption value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub measurement: &'static str,
    pub tags: ContractTags,
    pub time: DateTime<FixedOffset>,
    pub fields: PointFields,
}

impl TimeSeriesPoint {
    pub fn value(&self) -> f64 {
        self.fields.value
    }
}

/// Turn raw readings into points
///
/// Keeps only MACO readings, in delivery order, first reading per instant.
/// Pure: the same input always yields the same output.
pub fn normalize_readings(
    readings: &[ConsumptionReading],
    tags: &ContractTags,
) -> Result<Vec<TimeSeriesPoint>> {
    let mut seen: HashSet<DateTime<Utc>> = HashSet::new();
    let mut points = Vec::new();

    for reading in readings.iter().filter(|r| r.status == MACO_STATUS) {
        let time = parse_timestamp(&reading.ts)?;
        let value = coerce_value(&reading.value)?;
        if !seen.insert(time.with_timezone(&Utc)) {
            continue;
        }
        points.push(TimeSeriesPoint {
            measurement: MEASUREMENT,
            tags: tags.clone(),
            time,
            fields: PointFields { value },
        });
    }

    Ok(points)
}

/// Offset-carrying ISO 8601 shapes accepted besides RFC 3339: compact or
/// hour-only offsets, minute precision
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// ISO 8601 instant keeping its offset; a timestamp without offset is UTC
pub fn parse_timestamp(ts: &str) -> Result<DateTime<FixedOffset>> {
    let ts = ts.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt);
    }

    let zulu;
    let with_offset = match ts.strip_suffix(['Z', 'z']) {
        Some(local) => {
            zulu = format!("{}+00:00", local);
            zulu.as_str()
        }
        None => ts,
    };
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(with_offset, fmt).ok())
    {
        return Ok(dt);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
        .ok_or_else(|| {
            EnovosError::upstream("loadprofile", format!("invalid timestamp '{}'", ts))
        })
}

/// Reading value as f64; accepts JSON numbers and numeric strings
pub fn coerce_value(value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).ok_or_else(|| {
        EnovosError::upstream("loadprofile", format!("invalid reading value {}", value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_keeps_offset() {
        let dt = parse_timestamp("2024-01-01T01:15:00+01:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 3600);
        assert_eq!(dt.to_rfc3339(), "2024-01-01T01:15:00+01:00");
    }

    #[test]
    fn test_parse_timestamp_naive_is_utc() {
        let dt = parse_timestamp("2024-01-01T00:15:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_parse_timestamp_iso8601_shapes() {
        let cases = [
            ("2024-01-01T00:00:00+0100", "2023-12-31T23:00:00+00:00"),
            ("2024-01-01T00:00:00.000+01", "2023-12-31T23:00:00+00:00"),
            ("2024-01-01T00:00Z", "2024-01-01T00:00:00+00:00"),
            ("2024-01-01T00:00+01:00", "2023-12-31T23:00:00+00:00"),
            ("2024-01-01T00:00", "2024-01-01T00:00:00+00:00"),
        ];
        for (raw, utc) in cases {
            let dt = parse_timestamp(raw).unwrap();
            assert_eq!(dt.with_timezone(&Utc).to_rfc3339(), utc, "{}", raw);
        }
        assert_eq!(
            parse_timestamp("2024-01-01T00:00:00+0100")
                .unwrap()
                .offset()
                .local_minus_utc(),
            3600
        );
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value(&json!("3.5")).unwrap(), 3.5);
        assert_eq!(coerce_value(&json!(9)).unwrap(), 9.0);
        assert!(coerce_value(&json!("NaN")).is_err());
        assert!(coerce_value(&json!(null)).is_err());
        assert!(coerce_value(&json!("abc")).is_err());
    }

    #[test]
    fn test_point_json_shape() {
        let tags = ContractTags {
            contract_nr: "600123".to_string(),
            customer_nr: "4711".to_string(),
            device_designation: "LU000001".to_string(),
            product_name: "nova naturstroum".to_string(),
            installation_id: "9001".to_string(),
            installation_service_type: "Electricity".to_string(),
        };
        let readings = vec![ConsumptionReading {
            ts: "2024-01-01T00:00:00Z".to_string(),
            status: "MACO".to_string(),
            value: json!("0.25"),
        }];
        let points = normalize_readings(&readings, &tags).unwrap();
        let v = serde_json::to_value(&points[0]).unwrap();
        assert_eq!(v["measurement"], json!("Enovos Consumption"));
        assert_eq!(v["fields"]["value"], json!(0.25));
        assert_eq!(v["tags"]["customer_nr"], json!("4711"));
        assert!(v["time"].as_str().unwrap().starts_with("2024-01-01T00:00:00"));
    }
}
