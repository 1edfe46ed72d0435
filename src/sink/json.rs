use crate::error::Result;
use crate::points::TimeSeriesPoint;
use crate::sink::PointSink;
use std::io::Write;

/// Writes each batch as a pretty-printed JSON array
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PointSink for JsonSink<W> {
    fn write_points(&mut self, points: &[TimeSeriesPoint]) -> Result<usize> {
        serde_json::to_writer_pretty(&mut self.writer, points)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(points.len())
    }
}
