//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (contacts, relay, clock, log file, display, storage)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! ## Contract notes
//!
//! - **ActuatorPort::set_relay** is called once per control cycle whether or
//!   not the state changed, so implementations must be idempotent.
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **RecordSink** failures never reach the control path.

use crate::clock::{DateTimeFields, Timestamp};
use crate::config::SystemConfig;
use crate::datalog::LogRecord;
use crate::display::DisplayText;
use crate::error::{ActuatorError, ClockError};
use crate::fsm::context::{SensorSnapshot, Temperatures};
use crate::scheduler::Task;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain input data.
///
/// Both reads are infallible from the domain's point of view: an adapter
/// that fails to read a contact reports its last known value.
pub trait SensorPort {
    /// Sample the four contacts.  The door value is not delay-filtered.
    fn read_contacts(&mut self) -> SensorSnapshot;

    /// Read indoor and outdoor temperatures.  Missing probes yield `None`.
    fn read_temperatures(&mut self) -> Temperatures;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the fan relay.
pub trait ActuatorPort {
    /// Energise (`true`) or release (`false`) the fan relay.
    fn set_relay(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Last state successfully written to the relay.
    fn relay_state(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: RTC / system clock → domain)
// ───────────────────────────────────────────────────────────────

/// Wall clock plus a monotonic uptime counter.
pub trait TimePort {
    /// Current wall-clock time.
    fn now(&self) -> Timestamp;

    /// Adjust the wall clock.  The only permitted discontinuity.
    fn set_clock(&mut self, fields: &DateTimeFields) -> Result<(), ClockError>;

    /// Milliseconds since boot.  Never goes backwards.
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, file,
/// status LED, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Record sink port (driven adapter: domain → data log storage)
// ───────────────────────────────────────────────────────────────

/// Append-only destination for periodic [`LogRecord`]s.
pub trait RecordSink {
    fn append(&mut self, record: &LogRecord) -> Result<(), SinkError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character display)
// ───────────────────────────────────────────────────────────────

/// Receives a rendered text frame every display period.
pub trait DisplayPort {
    fn show(&mut self, frame: &DisplayText);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] if nothing has been stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the main loop)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a task is due.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) only tracks cadence; the
/// main loop implements this to run the control cycle, refresh the display
/// or flush the config.
pub trait SchedulerDelegate {
    /// Called when `task` is due.  `label` is the schedule's name.
    fn on_schedule_fired(&mut self, label: &str, task: Task);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`RecordSink`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// Backing store not present (no card, file not open).
    Unavailable,
    /// Generic I/O error.
    IoError,
    /// Record timestamp not after the previous one.
    OutOfOrder,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "log sink unavailable"),
            Self::IoError => write!(f, "I/O error"),
            Self::OutOfOrder => write!(f, "record timestamp not increasing"),
        }
    }
}
