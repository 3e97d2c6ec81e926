//! 4 × 20 character status frame.
//!
//! ```text
//! ┌────────────────────┐
//! │07:08:09     RUN-ADJ│
//! │B0 O1 D0 F0  fan ON │
//! │R 25.0 A 48.1 T 30.0│
//! │In  21.5C Out  -3.2C│
//! └────────────────────┘
//! ```
//!
//! Ratios are percentages (R current, A moving average, T target).

use core::fmt::Write;

use crate::app::events::ControllerSnapshot;
use crate::clock::format_timestamp;

pub const COLS: usize = 20;
pub const ROWS: usize = 4;

pub type Line = heapless::String<COLS>;

/// A rendered frame.  Lines longer than [`COLS`] are truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayText {
    pub lines: [Line; ROWS],
}

impl DisplayText {
    pub fn render(s: &ControllerSnapshot) -> Self {
        let mut frame = Self::default();

        let stamp = format_timestamp(s.timestamp);
        let time = stamp.get(11..19).unwrap_or(stamp.as_str());
        fill(&mut frame.lines[0], format_args!("{time:<8}{:>12}", s.run_state.label()));

        fill(
            &mut frame.lines[1],
            format_args!(
                "B{} O{} D{} F{}  fan {}",
                u8::from(s.sensors.bedroom_open),
                u8::from(s.sensors.office_open),
                u8::from(s.door_settled),
                u8::from(s.sensors.furnace_calling),
                if s.relay_on { "ON" } else { "OFF" },
            ),
        );

        fill(
            &mut frame.lines[2],
            format_args!(
                "R{:5.1} A{:5.1} T{:5.1}",
                s.current_ratio * 100.0,
                s.moving_average * 100.0,
                s.desired_ratio * 100.0,
            ),
        );

        fill(
            &mut frame.lines[3],
            format_args!(
                "In {:>6} Out {:>6}",
                Temp(s.temperatures.indoor_c),
                Temp(s.temperatures.outdoor_c),
            ),
        );

        frame
    }
}

/// Write into a fixed line, dropping whatever does not fit.
fn fill(line: &mut Line, args: core::fmt::Arguments<'_>) {
    let mut buf: heapless::String<64> = heapless::String::new();
    let _ = buf.write_fmt(args);
    for ch in buf.chars() {
        if line.push(ch).is_err() {
            break;
        }
    }
}

struct Temp(Option<f32>);

impl core::fmt::Display for Temp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut buf: heapless::String<12> = heapless::String::new();
        match self.0 {
            Some(t) => {
                let _ = write!(buf, "{t:.1}C");
            }
            None => {
                let _ = buf.push_str("--.-");
            }
        }
        f.pad(&buf)
    }
}
