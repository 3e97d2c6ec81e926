//! System configuration parameters
//!
//! All tunable parameters for the air-exchange controller.
//! Values can be overridden from the config file or console commands.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Door debounce delay used when nothing else is configured.
///
/// Old wiring notes quote 12 s; field units have always run with 120 s.
pub const DEFAULT_DOOR_DELAY_SECS: u32 = 120;

/// Sample cap for the duty-cycle moving average.
pub const DEFAULT_MAX_SAMPLES: u16 = 64;

/// User-settable duty-cycle regulation targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    /// Fraction of each on/off period the fan should run (0.0–1.0).
    pub desired_ratio: f32,
    /// Whether the state machine regulates towards `desired_ratio`.
    pub adjustment_enabled: bool,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            desired_ratio: 0.5,
            adjustment_enabled: false,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Door ---
    /// Seconds a sliding-door edge must age before it is acted upon.
    pub door_delay_secs: u32,

    // --- Duty cycle ---
    /// Moving-average sample cap.
    pub max_samples: u16,
    /// Regulation targets.
    pub targets: Targets,

    // --- Data log ---
    /// Write a log record every `logging_interval_secs`.
    pub logging_enabled: bool,
    /// Minimum spacing between log records (seconds).
    pub logging_interval_secs: u32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Display refresh interval (milliseconds)
    pub display_interval_ms: u32,
    /// Consecutive identical reads before a contact input changes.
    pub contact_debounce_reads: u8,
    /// Seconds after the last runtime change before the config is persisted.
    pub autosave_delay_secs: u16,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            door_delay_secs: DEFAULT_DOOR_DELAY_SECS,

            max_samples: DEFAULT_MAX_SAMPLES,
            targets: Targets::default(),

            logging_enabled: true,
            logging_interval_secs: 300, // 5 min

            control_loop_interval_ms: 1000, // 1 Hz
            display_interval_ms: 1000,
            contact_debounce_reads: 3,
            autosave_delay_secs: 5,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.door_delay_secs > 3600 {
            return Err(ConfigError::ValidationFailed(
                "door_delay_secs must be 0–3600",
            ));
        }
        if !(1..=1024).contains(&self.max_samples) {
            return Err(ConfigError::ValidationFailed(
                "max_samples must be 1–1024",
            ));
        }
        if !(0.0..=1.0).contains(&self.targets.desired_ratio) {
            return Err(ConfigError::ValidationFailed(
                "desired_ratio must be 0.0–1.0",
            ));
        }
        if !(10..=86_400).contains(&self.logging_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "logging_interval_secs must be 10–86400",
            ));
        }
        if !(100..=10_000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 100–10000",
            ));
        }
        if !(100..=60_000).contains(&self.display_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "display_interval_ms must be 100–60000",
            ));
        }
        if !(1..=20).contains(&self.contact_debounce_reads) {
            return Err(ConfigError::ValidationFailed(
                "contact_debounce_reads must be 1–20",
            ));
        }
        if !(1..=600).contains(&self.autosave_delay_secs) {
            return Err(ConfigError::ValidationFailed(
                "autosave_delay_secs must be 1–600",
            ));
        }
        Ok(())
    }

    /// Seconds per control cycle.
    pub fn control_period_secs(&self) -> f32 {
        self.control_loop_interval_ms as f32 / 1000.0
    }
}
