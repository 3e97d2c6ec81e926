//! System clock adapter.
//!
//! Implements [`TimePort`]: a wall clock in Unix seconds that the user can
//! set from the console, plus a monotonic uptime used by the scheduler.
//!
//! - **`target_os = "espidf"`**: uptime from `esp_timer_get_time()`
//!   (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uptime from `std::time::Instant`.
//!
//! Setting the clock never touches the platform time; it records an
//! offset on top of it.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::TimePort;
use crate::clock::{DateTimeFields, Timestamp};
use crate::error::ClockError;

pub struct SystemClock {
    /// Seconds added to the platform wall clock.
    offset_secs: Timestamp,
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            offset_secs: 0,
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Platform wall clock in Unix seconds.  A clock before the epoch
    /// (unset RTC) reads as negative seconds.
    fn platform_now() -> Timestamp {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as Timestamp,
            Err(e) => -(e.duration().as_secs() as Timestamp),
        }
    }

    /// Current clock offset in seconds.
    pub fn offset_secs(&self) -> Timestamp {
        self.offset_secs
    }
}

impl TimePort for SystemClock {
    fn now(&self) -> Timestamp {
        Self::platform_now() + self.offset_secs
    }

    fn set_clock(&mut self, fields: &DateTimeFields) -> Result<(), ClockError> {
        let target = fields.to_timestamp()?;
        self.offset_secs = target - Self::platform_now();
        Ok(())
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer is started by the IDF before app_main.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}
