//! Sensor subsystem: individual input drivers and the aggregating
//! [`ContactBank`].
//!
//! The bank owns the four contact inputs and produces a [`SensorSnapshot`]
//! each tick that gets written into `FsmContext.sensors`.

pub mod contact;
pub mod temperature;

use embedded_hal::digital::InputPin;

use crate::fsm::context::SensorSnapshot;
use contact::ContactInput;

/// Aggregates the four contact inputs and produces a unified snapshot.
pub struct ContactBank<P: InputPin> {
    pub bedroom: ContactInput<P>,
    pub office: ContactInput<P>,
    pub door: ContactInput<P>,
    pub furnace: ContactInput<P>,
}

impl<P: InputPin> ContactBank<P> {
    /// Construct a new bank.  Pass in pre-built inputs (built in main
    /// where peripheral ownership is established).
    pub fn new(
        bedroom: ContactInput<P>,
        office: ContactInput<P>,
        door: ContactInput<P>,
        furnace: ContactInput<P>,
    ) -> Self {
        let mut bank = Self {
            bedroom,
            office,
            door,
            furnace,
        };
        bank.bedroom.prime();
        bank.office.prime();
        bank.door.prime();
        bank.furnace.prime();
        bank
    }

    /// Read every contact and return a unified snapshot.
    ///
    /// Individual read failures are logged by the input and the previous
    /// stable value is retained.
    pub fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            bedroom_open: self.bedroom.read(),
            office_open: self.office.read(),
            door_open_raw: self.door.read(),
            furnace_calling: self.furnace.read(),
        }
    }
}
