//! Periodic data log.
//!
//! One [`LogRecord`] per logging interval, rendered as a CSV line:
//!
//! ```text
//! timestamp,state,fan,bedroom,office,door,furnace,actual_pct,desired_pct,average_pct,indoor_c,outdoor_c
//! 2024-05-06 07:08:09,RUN,1,0,0,0,0,25.000,30.000,48.00,21.5,
//! ```
//!
//! Ratios are written as percentages, booleans as `0`/`1`, and a missing
//! temperature as an empty field.

use core::fmt::Write;

use log::debug;

use crate::app::events::ControllerSnapshot;
use crate::app::ports::{RecordSink, SinkError};
use crate::clock::{Timestamp, format_timestamp};

/// First line of every log file.
pub const CSV_HEADER: &str = "timestamp,state,fan,bedroom,office,door,furnace,\
actual_pct,desired_pct,average_pct,indoor_c,outdoor_c";

/// Capacity of one rendered line, newline excluded.
pub const CSV_LINE_CAPACITY: usize = 128;

/// One row of the data log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRecord {
    pub timestamp: Timestamp,
    pub state: &'static str,
    pub relay_on: bool,
    pub bedroom_open: bool,
    pub office_open: bool,
    /// Settled (delayed) door state.
    pub door_open: bool,
    pub furnace_calling: bool,
    pub actual_ratio: f32,
    pub desired_ratio: f32,
    pub moving_average: f32,
    pub indoor_c: Option<f32>,
    pub outdoor_c: Option<f32>,
}

impl From<&ControllerSnapshot> for LogRecord {
    fn from(s: &ControllerSnapshot) -> Self {
        Self {
            timestamp: s.timestamp,
            state: s.run_state.label(),
            relay_on: s.relay_on,
            bedroom_open: s.sensors.bedroom_open,
            office_open: s.sensors.office_open,
            door_open: s.door_settled,
            furnace_calling: s.sensors.furnace_calling,
            actual_ratio: s.current_ratio,
            desired_ratio: s.desired_ratio,
            moving_average: s.moving_average,
            indoor_c: s.temperatures.indoor_c,
            outdoor_c: s.temperatures.outdoor_c,
        }
    }
}

impl LogRecord {
    /// Render as one CSV line without the trailing newline.
    pub fn to_csv(&self) -> heapless::String<CSV_LINE_CAPACITY> {
        let mut line = heapless::String::new();
        let _ = write!(
            line,
            "{},{},{},{},{},{},{},{:.3},{:.3},{:.2},",
            format_timestamp(self.timestamp),
            self.state,
            u8::from(self.relay_on),
            u8::from(self.bedroom_open),
            u8::from(self.office_open),
            u8::from(self.door_open),
            u8::from(self.furnace_calling),
            self.actual_ratio * 100.0,
            self.desired_ratio * 100.0,
            self.moving_average * 100.0,
        );
        if let Some(t) = self.indoor_c {
            let _ = write!(line, "{t:.1}");
        }
        let _ = line.push(',');
        if let Some(t) = self.outdoor_c {
            let _ = write!(line, "{t:.1}");
        }
        line
    }
}

// ═══════════════════════════════════════════════════════════════
//  Emitter
// ═══════════════════════════════════════════════════════════════

/// Rate-limits records to the logging interval and keeps them in
/// strictly increasing timestamp order.
#[derive(Debug, Default)]
pub struct DataLogger {
    last_written: Option<Timestamp>,
}

impl DataLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp of the last record accepted by the sink.
    pub fn last_written(&self) -> Option<Timestamp> {
        self.last_written
    }

    /// Whether a record at `now` is due.
    ///
    /// Returns `Err(OutOfOrder)` when `now` is before the last record,
    /// which only happens after the clock was set backwards.  A repeat of
    /// the last timestamp is simply not due.
    pub fn is_due(&self, now: Timestamp, interval_secs: u32) -> Result<bool, SinkError> {
        match self.last_written {
            None => Ok(true),
            Some(last) if now < last => Err(SinkError::OutOfOrder),
            Some(last) => Ok(now - last >= Timestamp::from(interval_secs)),
        }
    }

    /// Append `record` to `sink` if logging is enabled and the interval has
    /// passed.  Returns `Ok(true)` when a record was written.
    pub fn log<R: RecordSink>(
        &mut self,
        record: &LogRecord,
        enabled: bool,
        interval_secs: u32,
        sink: &mut R,
    ) -> Result<bool, SinkError> {
        if !enabled || !self.is_due(record.timestamp, interval_secs)? {
            return Ok(false);
        }
        sink.append(record)?;
        self.last_written = Some(record.timestamp);
        debug!("DATALOG: record at {}", record.timestamp);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecSink(Vec<LogRecord>);

    impl RecordSink for VecSink {
        fn append(&mut self, record: &LogRecord) -> Result<(), SinkError> {
            self.0.push(*record);
            Ok(())
        }
    }

    struct BrokenSink;

    impl RecordSink for BrokenSink {
        fn append(&mut self, _: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Unavailable)
        }
    }

    fn record(timestamp: Timestamp) -> LogRecord {
        LogRecord {
            timestamp,
            state: "RUN",
            relay_on: true,
            bedroom_open: false,
            office_open: true,
            door_open: false,
            furnace_calling: false,
            actual_ratio: 0.25,
            desired_ratio: 0.3,
            moving_average: 0.4812,
            indoor_c: Some(21.54),
            outdoor_c: None,
        }
    }

    #[test]
    fn csv_line_formats_percentages_and_flags() {
        let line = record(1_714_979_289).to_csv();
        assert_eq!(
            line.as_str(),
            "2024-05-06 07:08:09,RUN,1,0,1,0,0,25.000,30.000,48.12,21.5,"
        );
    }

    #[test]
    fn header_matches_column_count() {
        let line = record(0).to_csv();
        assert_eq!(
            CSV_HEADER.split(',').count(),
            line.split(',').count(),
            "header and row disagree"
        );
    }

    #[test]
    fn respects_interval() {
        let mut logger = DataLogger::new();
        let mut sink = VecSink(Vec::new());
        assert!(logger.log(&record(1000), true, 300, &mut sink).unwrap());
        assert!(!logger.log(&record(1299), true, 300, &mut sink).unwrap());
        assert!(logger.log(&record(1300), true, 300, &mut sink).unwrap());
        assert_eq!(sink.0.len(), 2);
    }

    #[test]
    fn disabled_logger_writes_nothing() {
        let mut logger = DataLogger::new();
        let mut sink = VecSink(Vec::new());
        assert!(!logger.log(&record(1000), false, 300, &mut sink).unwrap());
        assert!(sink.0.is_empty());
        assert_eq!(logger.last_written(), None);
    }

    #[test]
    fn backwards_timestamp_is_refused() {
        let mut logger = DataLogger::new();
        let mut sink = VecSink(Vec::new());
        logger.log(&record(5000), true, 10, &mut sink).unwrap();
        assert_eq!(logger.log(&record(5000), true, 10, &mut sink), Ok(false));
        assert_eq!(
            logger.log(&record(100), true, 10, &mut sink),
            Err(SinkError::OutOfOrder)
        );
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn sink_failure_does_not_advance() {
        let mut logger = DataLogger::new();
        assert_eq!(
            logger.log(&record(1000), true, 300, &mut BrokenSink),
            Err(SinkError::Unavailable)
        );
        assert_eq!(logger.last_written(), None);
    }
}
