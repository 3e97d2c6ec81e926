//! Fan relay driver.
//!
//! A single `embedded-hal` [`OutputPin`] energises the fan contactor coil.
//! Some relay boards switch on a low input, so the active level is
//! configurable.
//!
//! The driver writes the pin on every call, even when the requested state
//! equals the current one.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Off,
    On,
}

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    active_low: bool,
    state: RelayState,
}

impl<P: OutputPin> RelayDriver<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        Self {
            pin,
            active_low,
            state: RelayState::Off,
        }
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on != self.active_low;
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.state = if on { RelayState::On } else { RelayState::Off };
        Ok(())
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        matches!(self.state, RelayState::On)
    }
}
