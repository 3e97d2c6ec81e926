//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, append to a file,
//! flash a status LED, etc.

use crate::clock::Timestamp;
use crate::config::Targets;
use crate::fsm::StateId;
use crate::fsm::context::{SensorSnapshot, Temperatures};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A duty-cycle period was folded into the moving average.
    PeriodClosed { ratio: f32, moving_average: f32 },

    /// Desired ratio or adjustment flag changed.
    TargetsChanged(Targets),

    /// The wall clock was set.
    ClockSet { from: Timestamp, to: Timestamp },

    /// Reply to a status request.
    Status(ControllerSnapshot),
}

/// Everything an observer needs to know about the controller at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSnapshot {
    pub timestamp: Timestamp,
    pub run_state: StateId,
    pub relay_on: bool,
    pub sensors: SensorSnapshot,
    /// Door state after the debounce delay.
    pub door_settled: bool,
    pub current_ratio: f32,
    pub moving_average: f32,
    pub sample_count: u16,
    pub desired_ratio: f32,
    pub adjustment_enabled: bool,
    pub temperatures: Temperatures,
}
