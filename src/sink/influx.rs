//! InfluxDB 1.x sink speaking line protocol over HTTP

use crate::config::InfluxConfig;
use crate::error::{EnovosError, Result};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::points::TimeSeriesPoint;
use crate::sink::PointSink;
use crate::transport::{HttpRequest, HttpTransport, Method};
use reqwest::Url;
use std::sync::Arc;

/// Escape a measurement name: commas and spaces
fn escape_measurement(s: &str, out: &mut String) {
    for ch in s.chars() {
        if matches!(ch, ',' | ' ') {
            out.push('\\');
        }
        out.push(ch);
    }
}

/// Escape tag keys, tag values and field keys: commas, spaces and equals
fn escape_ident(s: &str, out: &mut String) {
    for ch in s.chars() {
        if matches!(ch, ',' | ' ' | '=') {
            out.push('\\');
        }
        out.push(ch);
    }
}

/// Append one point as a line-protocol line (no trailing newline)
pub fn encode_line(point: &TimeSeriesPoint, out: &mut String) -> Result<()> {
    let nanos = point.time.timestamp_nanos_opt().ok_or_else(|| {
        EnovosError::validation("time", format!("{} is outside the nanosecond range", point.time))
    })?;

    escape_measurement(point.measurement, out);
    for (key, value) in point.tags.pairs() {
        // line protocol has no representation for empty tag values
        if value.is_empty() {
            continue;
        }
        out.push(',');
        escape_ident(key, out);
        out.push('=');
        escape_ident(value, out);
    }

    out.push(' ');
    escape_ident("value", out);
    out.push('=');
    out.push_str(&point.value().to_string());

    out.push(' ');
    out.push_str(&nanos.to_string());
    Ok(())
}

/// Newline-separated batch body
pub fn encode_batch(points: &[TimeSeriesPoint]) -> Result<String> {
    let mut out = String::new();
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        encode_line(point, &mut out)?;
    }
    Ok(out)
}

pub struct InfluxSink {
    transport: Arc<dyn HttpTransport>,
    base: Url,
    database: String,
    user: Option<String>,
    password: Option<String>,
    logger: StructuredLogger,
}

impl InfluxSink {
    pub fn new(transport: Arc<dyn HttpTransport>, cfg: &InfluxConfig) -> Result<Self> {
        if cfg.database.trim().is_empty() {
            return Err(EnovosError::validation(
                "influx.database",
                "Database name cannot be empty",
            ));
        }
        let base = Url::parse(&format!("http://{}:{}/", cfg.host, cfg.port)).map_err(|e| {
            EnovosError::validation(
                "influx.host",
                format!("'{}:{}': {}", cfg.host, cfg.port, e),
            )
        })?;
        Ok(Self {
            transport,
            base,
            database: cfg.database.clone(),
            user: cfg.user.clone().filter(|u| !u.is_empty()),
            password: cfg.password.clone(),
            logger: get_logger_with_context(
                LogContext::new("influx").with_field("database", &cfg.database),
            ),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base
            .join(path)
            .map_err(|e| EnovosError::config(format!("influx URL: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in params {
                query.append_pair(k, v);
            }
            if let Some(user) = &self.user {
                query.append_pair("u", user);
                if let Some(password) = &self.password {
                    query.append_pair("p", password);
                }
            }
        }
        Ok(url)
    }

    fn post(&self, url: Url, body: Option<Vec<u8>>) -> Result<()> {
        let mut request = HttpRequest::new(Method::Post, url);
        if body.is_some() {
            request
                .headers
                .push(("Content-Type".to_string(), "text/plain; charset=utf-8".to_string()));
        }
        request.body = body;
        let resp = self.transport.execute(&request)?;
        if !resp.is_success() {
            return Err(EnovosError::upstream(
                "influx",
                format!("HTTP {}: {}", resp.status, resp.body.trim()),
            ));
        }
        Ok(())
    }

    /// Create the database if it does not exist yet (idempotent on the server)
    pub fn ensure_database(&self) -> Result<()> {
        let statement = format!(
            "CREATE DATABASE \"{}\"",
            self.database.replace('\\', "\\\\").replace('"', "\\\"")
        );
        let url = self.url("query", &[("q", statement.as_str())])?;
        self.post(url, None)?;
        self.logger.debug("Database ensured");
        Ok(())
    }
}

impl PointSink for InfluxSink {
    fn prepare(&mut self) -> Result<()> {
        self.ensure_database()
    }

    fn write_points(&mut self, points: &[TimeSeriesPoint]) -> Result<usize> {
        if points.is_empty() {
            return Ok(0);
        }
        let body = encode_batch(points)?;
        let url = self.url("write", &[("db", self.database.as_str()), ("precision", "ns")])?;
        self.post(url, Some(body.into_bytes()))?;
        self.logger
            .info(&format!("Wrote {} point(s)", points.len()));
        Ok(points.len())
    }
}
