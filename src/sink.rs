//! Destinations for normalized points

pub mod influx;
pub mod json;

pub use influx::{InfluxSink, encode_batch, encode_line};
pub use json::JsonSink;

use crate::error::Result;
use crate::points::TimeSeriesPoint;

/// Consumer of one batch of points; returns how many were written
pub trait PointSink {
    /// Called once the target contract is known, before any fetch
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_points(&mut self, points: &[TimeSeriesPoint]) -> Result<usize>;
}
