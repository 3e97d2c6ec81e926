//! Host simulation of the contacts, thermometers and relay.
//!
//! Used by the host build of the binary and by the fuzz target.  Inputs
//! are changed from the console with `sim` lines:
//!
//! ```text
//! sim bedroom on        contact: bedroom | office | door | furnace
//! sim furnace off
//! sim indoor 21.5       thermometer: indoor | outdoor, or "none"
//! sim outdoor none
//! ```

use log::info;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::error::{ActuatorError, CommandError};
use crate::fsm::context::{SensorSnapshot, Temperatures};

/// In-memory hardware double.
#[derive(Debug, Default)]
pub struct SimHardware {
    pub contacts: SensorSnapshot,
    pub temperatures: Temperatures,
    relay_on: bool,
    relay_writes: u64,
}

impl SimHardware {
    pub fn new() -> Self {
        Self {
            temperatures: Temperatures {
                indoor_c: Some(21.0),
                outdoor_c: Some(10.0),
            },
            ..Self::default()
        }
    }

    /// Number of `set_relay` calls so far.
    pub fn relay_writes(&self) -> u64 {
        self.relay_writes
    }

    /// Apply one `sim ...` console line (without the leading `sim`).
    pub fn apply(&mut self, args: &str) -> Result<(), CommandError> {
        let mut words = args.split_whitespace();
        let target = words.next().ok_or(CommandError::MissingArgument)?;
        let value = words.next().ok_or(CommandError::MissingArgument)?;

        let contact = match target {
            "bedroom" => Some(&mut self.contacts.bedroom_open),
            "office" => Some(&mut self.contacts.office_open),
            "door" => Some(&mut self.contacts.door_open_raw),
            "furnace" => Some(&mut self.contacts.furnace_calling),
            _ => None,
        };
        if let Some(slot) = contact {
            *slot = match value {
                "on" | "open" | "1" => true,
                "off" | "closed" | "0" => false,
                _ => return Err(CommandError::InvalidArgument("expected on or off")),
            };
            info!("SIM | {} = {}", target, *slot);
            return Ok(());
        }

        let probe = match target {
            "indoor" => &mut self.temperatures.indoor_c,
            "outdoor" => &mut self.temperatures.outdoor_c,
            _ => return Err(CommandError::UnknownCommand),
        };
        *probe = match value {
            "none" => None,
            v => Some(
                v.parse()
                    .map_err(|_| CommandError::InvalidArgument("expected degrees C"))?,
            ),
        };
        info!("SIM | {} = {:?}", target, *probe);
        Ok(())
    }
}

impl SensorPort for SimHardware {
    fn read_contacts(&mut self) -> SensorSnapshot {
        self.contacts
    }

    fn read_temperatures(&mut self) -> Temperatures {
        self.temperatures
    }
}

impl ActuatorPort for SimHardware {
    fn set_relay(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.relay_on = on;
        self.relay_writes += 1;
        Ok(())
    }

    fn relay_state(&self) -> bool {
        self.relay_on
    }
}
