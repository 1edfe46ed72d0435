//! Time window resolution
//!
//! Explicit bounds are Unix timestamps used verbatim. A missing end means
//! "now"; a missing start means the end instant moved to day 1 of its
//! calendar month, keeping the time of day.

use crate::error::{EnovosError, Result};
use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

/// Timezone in which "day 1 of the month" is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The system timezone
    #[default]
    Local,
    Named(Tz),
}

impl FromStr for CalendarZone {
    type Err = EnovosError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        s.parse::<Tz>()
            .map(Self::Named)
            .map_err(|e| EnovosError::validation("timezone", format!("'{}': {}", s, e)))
    }
}

impl CalendarZone {
    /// `end` with the day-of-month set to 1, same local time of day
    pub fn month_start(&self, end: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self {
            Self::Local => month_start_in(end, &Local),
            Self::Named(tz) => month_start_in(end, tz),
        }
    }
}

fn month_start_in<Z: TimeZone>(end: DateTime<Utc>, tz: &Z) -> Result<DateTime<Utc>> {
    let local = end.with_timezone(tz).naive_local();
    let first = local
        .with_day(1)
        .ok_or_else(|| EnovosError::validation("start", "cannot move to day 1"))?;
    tz.from_local_datetime(&first)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            EnovosError::validation(
                "start",
                format!("{} does not exist in the calendar timezone", first),
            )
        })
}

/// Half-open fetch window, both ends absolute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Resolve optional Unix-timestamp bounds against the wall clock
    pub fn resolve(start: Option<f64>, end: Option<f64>, zone: &CalendarZone) -> Result<Self> {
        Self::resolve_at(start, end, zone, Utc::now())
    }

    /// Like [`TimeWindow::resolve`] with an explicit "now"
    pub fn resolve_at(
        start: Option<f64>,
        end: Option<f64>,
        zone: &CalendarZone,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let end = match end {
            Some(ts) => instant_from_unix(ts)?,
            None => now,
        };
        let start = match start {
            Some(ts) => instant_from_unix(ts)?,
            None => zone.month_start(end)?,
        };
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Unix timestamp with optional fractional seconds
pub fn instant_from_unix(secs: f64) -> Result<DateTime<Utc>> {
    if !secs.is_finite() {
        return Err(EnovosError::validation(
            "timestamp",
            format!("{} is not a finite number", secs),
        ));
    }
    let mut whole = secs.floor();
    let mut nanos = ((secs - whole) * 1e9).round();
    if nanos >= 1e9 {
        whole += 1.0;
        nanos = 0.0;
    }
    DateTime::from_timestamp(whole as i64, nanos as u32).ok_or_else(|| {
        EnovosError::validation("timestamp", format!("{} is out of range", secs))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_parsing() {
        assert_eq!("local".parse::<CalendarZone>().unwrap(), CalendarZone::Local);
        assert_eq!(
            "Europe/Luxembourg".parse::<CalendarZone>().unwrap(),
            CalendarZone::Named(chrono_tz::Europe::Luxembourg)
        );
        assert!("Nowhere/Atlantis".parse::<CalendarZone>().is_err());
    }

    #[test]
    fn test_fractional_timestamp() {
        let dt = instant_from_unix(1_700_000_000.25).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_millis(), 250);
        assert!(instant_from_unix(f64::NAN).is_err());
    }

    #[test]
    fn test_millis() {
        let w = TimeWindow::resolve_at(
            Some(1_709_251_200.0),
            Some(1_710_496_800.5),
            &CalendarZone::Local,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(w.start_millis(), 1_709_251_200_000);
        assert_eq!(w.end_millis(), 1_710_496_800_500);
    }
}
