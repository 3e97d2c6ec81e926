//! Fuzz target: console command parser
//!
//! Feeds arbitrary UTF-8 lines to `AppCommand::parse` and the simulator's
//! `sim` handler, verifying:
//! - No panics under arbitrary input
//! - Every accepted ratio is a fraction in 0.0–1.0
//!
//! cargo fuzz run fuzz_console_line

#![no_main]

use airexchange::adapters::sim::SimHardware;
use airexchange::app::commands::AppCommand;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(AppCommand::SetDesiredRatio(r)) = AppCommand::parse(line) {
        assert!((0.0..=1.0).contains(&r));
    }

    let mut hw = SimHardware::new();
    let _ = hw.apply(line);
});
