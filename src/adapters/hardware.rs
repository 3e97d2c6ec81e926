//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`ContactBank`], the fan [`RelayDriver`] and the two
//! thermometers, exposing them through [`SensorPort`] and
//! [`ActuatorPort`].  Everything is generic over `embedded-hal` pins, so
//! the same adapter runs on ESP-IDF `PinDriver`s and on test doubles.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::relay::RelayDriver;
use crate::error::ActuatorError;
use crate::fsm::context::{SensorSnapshot, Temperatures};
use crate::sensors::ContactBank;
use crate::sensors::temperature::Thermometer;

/// One thermometer and whether its last read failed.
struct Probe<T: Thermometer> {
    name: &'static str,
    sensor: T,
    faulted: bool,
}

impl<T: Thermometer> Probe<T> {
    fn read(&mut self) -> Option<f32> {
        match self.sensor.read_celsius() {
            Ok(c) => {
                self.faulted = false;
                Some(c)
            }
            Err(e) => {
                if !self.faulted {
                    warn!("TEMP | {} probe: {}", self.name, e);
                    self.faulted = true;
                }
                None
            }
        }
    }
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct GpioHardware<I, O, TI, TO>
where
    I: InputPin,
    O: OutputPin,
    TI: Thermometer,
    TO: Thermometer,
{
    contacts: ContactBank<I>,
    relay: RelayDriver<O>,
    indoor: Probe<TI>,
    outdoor: Probe<TO>,
}

impl<I, O, TI, TO> GpioHardware<I, O, TI, TO>
where
    I: InputPin,
    O: OutputPin,
    TI: Thermometer,
    TO: Thermometer,
{
    pub fn new(contacts: ContactBank<I>, relay: RelayDriver<O>, indoor: TI, outdoor: TO) -> Self {
        Self {
            contacts,
            relay,
            indoor: Probe {
                name: "indoor",
                sensor: indoor,
                faulted: false,
            },
            outdoor: Probe {
                name: "outdoor",
                sensor: outdoor,
                faulted: false,
            },
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I, O, TI, TO> SensorPort for GpioHardware<I, O, TI, TO>
where
    I: InputPin,
    O: OutputPin,
    TI: Thermometer,
    TO: Thermometer,
{
    fn read_contacts(&mut self) -> SensorSnapshot {
        self.contacts.read_all()
    }

    fn read_temperatures(&mut self) -> Temperatures {
        Temperatures {
            indoor_c: self.indoor.read(),
            outdoor_c: self.outdoor.read(),
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I, O, TI, TO> ActuatorPort for GpioHardware<I, O, TI, TO>
where
    I: InputPin,
    O: OutputPin,
    TI: Thermometer,
    TO: Thermometer,
{
    fn set_relay(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.relay.set(on)
    }

    fn relay_state(&self) -> bool {
        self.relay.is_on()
    }
}
