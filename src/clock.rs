//! Wall-clock time representation.
//!
//! The controller reasons in whole seconds since a fixed epoch
//! ([`Timestamp`]).  The clock source is monotonic except for one explicit
//! user-initiated adjustment, which arrives as [`DateTimeFields`] from the
//! console and is converted here.

use core::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ClockError;

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Length of one day in seconds.  Used by the day-wrap correction in
/// [`period_ratio`](crate::control::duty_cycle::period_ratio).
pub const SECS_PER_DAY: Timestamp = 86_400;

/// Broken-down calendar time as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeFields {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeFields {
    /// Convert to a [`Timestamp`], rejecting dates that do not exist.
    pub fn to_timestamp(&self) -> Result<Timestamp, ClockError> {
        let dt = NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32))
            .ok_or(ClockError::InvalidDateTime)?;
        Ok(dt.and_utc().timestamp())
    }

    /// Parse `YYYY-MM-DD HH:MM:SS` (the `T` separator is also accepted).
    pub fn parse(text: &str) -> Result<Self, ClockError> {
        let text = text.trim();
        let dt = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
            .map_err(|_| ClockError::InvalidDateTime)?;
        Ok(Self {
            year: dt.year(),
            month: dt.month() as u8,
            day: dt.day() as u8,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        })
    }
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS` into a fixed buffer.
/// Out-of-range timestamps render as the raw second count.
pub fn format_timestamp(ts: Timestamp) -> heapless::String<24> {
    let mut out = heapless::String::new();
    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => {
            let _ = write!(out, "{}", dt.format("%Y-%m-%d %H:%M:%S"));
        }
        None => {
            let _ = write!(out, "{ts}");
        }
    }
    out
}
