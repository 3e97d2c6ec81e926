//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to.  It contains the latest contact snapshot, the settled door
//! state, the duty-cycle estimator, the regulation targets and the relay
//! command.  Think of it as the "blackboard" in a blackboard architecture.

use crate::clock::Timestamp;
use crate::config::{SystemConfig, Targets};
use crate::control::duty_cycle::DutyCycleState;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to state handlers; written by the service)
// ---------------------------------------------------------------------------

/// The four contact inputs, sampled once per control cycle.
///
/// `true` means "asserted": window open, door open, furnace calling.
/// `door_open_raw` has not yet been through the door delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    pub bedroom_open: bool,
    pub office_open: bool,
    pub door_open_raw: bool,
    pub furnace_calling: bool,
}

impl SensorSnapshot {
    /// No input asserted.
    pub fn quiescent(&self) -> bool {
        !(self.bedroom_open || self.office_open || self.door_open_raw || self.furnace_calling)
    }
}

/// Indoor / outdoor temperature, `None` when the probe did not answer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Temperatures {
    pub indoor_c: Option<f32>,
    pub outdoor_c: Option<f32>,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    /// Wall-clock time of the current cycle.
    pub now: Timestamp,

    // -- Inputs --
    /// Latest contact readings.  Updated before each FSM tick.
    pub sensors: SensorSnapshot,
    /// Door state after the debounce delay.
    pub door_settled: bool,
    /// No door edge is waiting out its delay.
    pub door_delay_elapsed: bool,
    /// Regulation targets, refreshed from config every cycle.
    pub targets: Targets,

    // -- Estimator --
    pub duty: DutyCycleState,
    /// Ratio folded into the average during this tick, if a handler
    /// closed a period.  Cleared by the caller before each tick.
    pub closed_ratio: Option<f32>,

    // -- Output --
    /// Relay command applied after the FSM tick.
    pub relay_on: bool,
}

impl FsmContext {
    /// Create a new context at time `now`.
    pub fn new(config: &SystemConfig, now: Timestamp) -> Self {
        Self {
            now,
            sensors: SensorSnapshot::default(),
            door_settled: false,
            door_delay_elapsed: true,
            targets: config.targets,
            duty: DutyCycleState::new(now, config.max_samples),
            closed_ratio: None,
            relay_on: false,
        }
    }

    /// Move to the time of this cycle.  A clock stepped backwards drags
    /// the duty-cycle marks along so the open period keeps its length.
    pub fn advance_clock(&mut self, now: Timestamp) {
        if now < self.now {
            self.duty.shift(now - self.now);
        }
        self.now = now;
    }

    /// Any input asks for the fan to stop, and the door is not mid-delay.
    pub fn off_request(&self) -> bool {
        let s = &self.sensors;
        (s.bedroom_open || s.office_open || s.furnace_calling || self.door_settled)
            && self.door_delay_elapsed
    }

    /// Every input is quiescent and the door is not mid-delay.
    pub fn all_clear(&self) -> bool {
        let s = &self.sensors;
        !(s.bedroom_open || s.office_open || s.furnace_calling || self.door_settled)
            && self.door_delay_elapsed
    }

    /// Fold the open period into the moving average and start a new one.
    pub fn close_period(&mut self) {
        self.closed_ratio = Some(self.duty.close_period(self.now));
    }
}
