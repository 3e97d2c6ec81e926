//! Log-backed character display.
//!
//! Stands in for the 20x4 LCD: each frame that differs from the previous
//! one is printed at debug level, one row per line.

use log::debug;

use crate::app::ports::DisplayPort;
use crate::display::DisplayText;

#[derive(Default)]
pub struct LogDisplay {
    last: Option<DisplayText>,
    frames_shown: u64,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames that actually reached the log.
    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }
}

impl DisplayPort for LogDisplay {
    fn show(&mut self, frame: &DisplayText) {
        if self.last.as_ref() == Some(frame) {
            return;
        }
        for (row, line) in frame.lines.iter().enumerate() {
            debug!("LCD{} |{:<20}|", row, line.as_str());
        }
        self.frames_shown += 1;
        self.last = Some(frame.clone());
    }
}
