//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (UART on the device, stderr on the host).

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::clock::format_timestamp;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::PeriodClosed {
                ratio,
                moving_average,
            } => {
                info!(
                    "DUTY  | period closed at {:.1}% | average {:.1}%",
                    ratio * 100.0,
                    moving_average * 100.0
                );
            }
            AppEvent::TargetsChanged(t) => {
                info!(
                    "TARGET | desired={:.1}% | adjust={}",
                    t.desired_ratio * 100.0,
                    if t.adjustment_enabled { "on" } else { "off" }
                );
            }
            AppEvent::ClockSet { from, to } => {
                info!(
                    "CLOCK | {} -> {}",
                    format_timestamp(*from),
                    format_timestamp(*to)
                );
            }
            AppEvent::Status(s) => {
                info!(
                    "STATUS | {} | state={:?} fan={} | bedroom={} office={} door={}/{} furnace={} | \
                     ratio={:.1}% avg={:.1}% (n={}) target={:.1}% adjust={}",
                    format_timestamp(s.timestamp),
                    s.run_state,
                    if s.relay_on { "ON" } else { "OFF" },
                    u8::from(s.sensors.bedroom_open),
                    u8::from(s.sensors.office_open),
                    u8::from(s.sensors.door_open_raw),
                    u8::from(s.door_settled),
                    u8::from(s.sensors.furnace_calling),
                    s.current_ratio * 100.0,
                    s.moving_average * 100.0,
                    s.sample_count,
                    s.desired_ratio * 100.0,
                    if s.adjustment_enabled { "on" } else { "off" },
                );
            }
        }
    }
}
