//! Mock adapters for integration tests.
//!
//! Records every relay write and event so tests can assert on the full
//! history without touching real GPIO.

use airexchange::app::events::AppEvent;
use airexchange::app::ports::{ActuatorPort, EventSink, RecordSink, SensorPort, SinkError, TimePort};
use airexchange::clock::{DateTimeFields, Timestamp};
use airexchange::datalog::LogRecord;
use airexchange::error::{ActuatorError, ClockError};
use airexchange::fsm::context::{SensorSnapshot, Temperatures};

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub contacts: SensorSnapshot,
    pub temperatures: Temperatures,
    /// Every value passed to `set_relay`, in order.
    pub relay_writes: Vec<bool>,
    /// When set, `set_relay` fails without changing the output.
    pub fail_relay: bool,
    relay_on: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            contacts: SensorSnapshot::default(),
            temperatures: Temperatures {
                indoor_c: Some(20.0),
                outdoor_c: Some(5.0),
            },
            relay_writes: Vec::new(),
            fail_relay: false,
            relay_on: false,
        }
    }

    pub fn relay_on(&self) -> bool {
        self.relay_on
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_contacts(&mut self) -> SensorSnapshot {
        self.contacts
    }

    fn read_temperatures(&mut self) -> Temperatures {
        self.temperatures
    }
}

impl ActuatorPort for MockHardware {
    fn set_relay(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.relay_writes.push(on);
        if self.fail_relay {
            return Err(ActuatorError::GpioWriteFailed);
        }
        self.relay_on = on;
        Ok(())
    }

    fn relay_state(&self) -> bool {
        self.relay_on
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    pub now: Timestamp,
}

impl TimePort for MockClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn set_clock(&mut self, fields: &DateTimeFields) -> Result<(), ClockError> {
        self.now = fields.to_timestamp()?;
        Ok(())
    }

    fn uptime_ms(&self) -> u64 {
        0
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_changes(&self) -> Vec<(airexchange::fsm::StateId, airexchange::fsm::StateId)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn closed_periods(&self) -> Vec<f32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::PeriodClosed { ratio, .. } => Some(*ratio),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── VecRecordSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct VecRecordSink {
    pub records: Vec<LogRecord>,
    pub fail: bool,
}

impl RecordSink for VecRecordSink {
    fn append(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Unavailable);
        }
        self.records.push(*record);
        Ok(())
    }
}
