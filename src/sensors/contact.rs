//! Dry-contact inputs (window reed switches, door switch, thermostat call).
//!
//! Each input is read through `embedded-hal`'s [`InputPin`], mapped through
//! its wiring polarity and passed through a consecutive-read debouncer.
//! A contact only changes once the same level has been read
//! `required` times in a row.
//!
//! A failed read keeps the last stable value; the failure is logged once
//! and again on recovery.

use embedded_hal::digital::InputPin;
use log::{info, warn};

use crate::error::SensorError;

/// Electrical level that means "asserted" (open window, calling furnace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    fn asserted(self, level_high: bool) -> bool {
        match self {
            Self::ActiveHigh => level_high,
            Self::ActiveLow => !level_high,
        }
    }
}

/// N-consecutive-reads debouncer.
#[derive(Debug, Clone, Copy)]
pub struct ContactDebouncer {
    stable: bool,
    candidate: bool,
    count: u8,
    required: u8,
}

impl ContactDebouncer {
    pub fn new(initial: bool, required: u8) -> Self {
        Self {
            stable: initial,
            candidate: initial,
            count: 0,
            required: required.max(1),
        }
    }

    /// Feed one raw sample and return the stable value.
    pub fn update(&mut self, raw: bool) -> bool {
        if raw == self.stable {
            self.candidate = raw;
            self.count = 0;
            return self.stable;
        }

        if raw == self.candidate {
            self.count = self.count.saturating_add(1);
        } else {
            self.candidate = raw;
            self.count = 1;
        }

        if self.count >= self.required {
            self.stable = raw;
            self.count = 0;
        }
        self.stable
    }

    pub fn stable(&self) -> bool {
        self.stable
    }
}

/// One debounced contact on a GPIO.
pub struct ContactInput<P: InputPin> {
    name: &'static str,
    pin: P,
    polarity: Polarity,
    debouncer: ContactDebouncer,
    faulted: bool,
}

impl<P: InputPin> ContactInput<P> {
    pub fn new(name: &'static str, pin: P, polarity: Polarity, debounce_reads: u8) -> Self {
        Self {
            name,
            pin,
            polarity,
            debouncer: ContactDebouncer::new(false, debounce_reads),
            faulted: false,
        }
    }

    /// Read the pin once and seed the debouncer with the result, so the
    /// first snapshot reflects the real input instead of "not asserted".
    pub fn prime(&mut self) {
        if let Ok(high) = self.pin.is_high() {
            let asserted = self.polarity.asserted(high);
            self.debouncer = ContactDebouncer::new(asserted, self.debouncer.required);
        }
    }

    /// Sample the pin and return the debounced "asserted" value.
    pub fn read(&mut self) -> bool {
        match self.pin.is_high() {
            Ok(high) => {
                if self.faulted {
                    info!("CONTACT | {} read recovered", self.name);
                    self.faulted = false;
                }
                self.debouncer.update(self.polarity.asserted(high))
            }
            Err(_) => {
                if !self.faulted {
                    warn!(
                        "CONTACT | {}: {}, holding {}",
                        self.name,
                        SensorError::GpioReadFailed,
                        self.debouncer.stable()
                    );
                    self.faulted = true;
                }
                self.debouncer.stable()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
