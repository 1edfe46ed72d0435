mod common;

use chrono::DateTime;
use common::*;
use myenovos::config::InfluxConfig;
use myenovos::error::EnovosError;
use myenovos::points::{ContractTags, MEASUREMENT, PointFields, TimeSeriesPoint};
use myenovos::sink::{InfluxSink, PointSink, encode_batch, encode_line};
use myenovos::transport::Method;
use std::collections::HashMap;

fn point(ts: &str, value: f64) -> TimeSeriesPoint {
    TimeSeriesPoint {
        measurement: MEASUREMENT,
        tags: ContractTags {
            contract_nr: "600002".to_string(),
            customer_nr: "4711".to_string(),
            device_designation: "LU POD=1".to_string(),
            product_name: "nova naturstroum, home".to_string(),
            installation_id: String::new(),
            installation_service_type: "Electricity".to_string(),
        },
        time: DateTime::parse_from_rfc3339(ts).unwrap(),
        fields: PointFields { value },
    }
}

fn influx_config() -> InfluxConfig {
    InfluxConfig {
        host: "influx.test".to_string(),
        port: 8086,
        database: "energy".to_string(),
        user: Some("root".to_string()),
        password: Some("s3cret".to_string()),
    }
}

#[test]
fn line_protocol_escaping() {
    let mut line = String::new();
    encode_line(&point("2024-03-01T00:15:00+01:00", 0.25), &mut line).unwrap();
    assert_eq!(
        line,
        "Enovos\\ Consumption,contract_nr=600002,customer_nr=4711,\
         device_designation=LU\\ POD\\=1,installation_service_type=Electricity,\
         product_name=nova\\ naturstroum\\,\\ home value=0.25 1709248500000000000"
    );
}

#[test]
fn batch_is_newline_separated() {
    let body = encode_batch(&[
        point("2024-03-01T00:00:00Z", 1.0),
        point("2024-03-01T00:15:00Z", 2.5),
    ])
    .unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" value=1 1709251200000000000"));
    assert!(lines[1].ends_with(" value=2.5 1709252100000000000"));
}

#[test]
fn write_posts_to_write_endpoint() {
    let transport = ScriptedTransport::new(vec![response(204, &[], "")]);
    let mut sink = InfluxSink::new(transport.clone(), &influx_config()).unwrap();

    let written = sink
        .write_points(&[point("2024-03-01T00:00:00Z", 1.0)])
        .unwrap();
    assert_eq!(written, 1);

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url.path(), "/write");
    assert_eq!(request.url.host_str(), Some("influx.test"));
    let params: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
    assert_eq!(params["db"], "energy");
    assert_eq!(params["precision"], "ns");
    assert_eq!(params["u"], "root");
    assert_eq!(params["p"], "s3cret");
    let body = String::from_utf8(request.body.clone().unwrap()).unwrap();
    assert!(body.starts_with("Enovos\\ Consumption,"));
}

#[test]
fn empty_batch_sends_nothing() {
    let transport = ScriptedTransport::new(Vec::new());
    let mut sink = InfluxSink::new(transport.clone(), &influx_config()).unwrap();

    assert_eq!(sink.write_points(&[]).unwrap(), 0);
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn ensure_database_issues_create_statement() {
    let transport = ScriptedTransport::new(vec![json_response(&serde_json::json!({"results": []}))]);
    let mut cfg = influx_config();
    cfg.user = None;
    let sink = InfluxSink::new(transport.clone(), &cfg).unwrap();

    sink.ensure_database().unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.url.path(), "/query");
    let params: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
    assert_eq!(params["q"], "CREATE DATABASE \"energy\"");
    assert!(!params.contains_key("u"));
}

#[test]
fn rejected_write_is_upstream_error() {
    let transport = ScriptedTransport::new(vec![response(400, &[], "{\"error\":\"bad line\"}")]);
    let mut sink = InfluxSink::new(transport, &influx_config()).unwrap();

    let err = sink
        .write_points(&[point("2024-03-01T00:00:00Z", 1.0)])
        .unwrap_err();
    match err {
        EnovosError::Upstream { endpoint, message } => {
            assert_eq!(endpoint, "influx");
            assert!(message.contains("bad line"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_database_name_is_rejected() {
    let transport = ScriptedTransport::new(Vec::new());
    let mut cfg = influx_config();
    cfg.database = " ".to_string();
    assert!(InfluxSink::new(transport, &cfg).is_err());
}
