//! Fuzz target: controller loop
//!
//! Drives `AppService` with arbitrary contact levels, clock steps
//! (including backwards jumps) and targets, verifying:
//! - No panics under arbitrary input sequences
//! - The relay is written exactly once per cycle
//! - The relay always matches the run state
//! - Ratios stay within 0.0–1.0
//!
//! cargo fuzz run fuzz_controller_tick

#![no_main]

use airexchange::adapters::sim::SimHardware;
use airexchange::app::events::AppEvent;
use airexchange::app::ports::{ActuatorPort, EventSink};
use airexchange::app::service::AppService;
use airexchange::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Some((&head, steps)) = data.split_first() else {
        return;
    };

    let mut config = SystemConfig::default();
    config.targets.adjustment_enabled = head & 0x80 != 0;
    config.targets.desired_ratio = f32::from(head & 0x7F) / 127.0;
    config.door_delay_secs = u32::from(head & 0x0F) * 10;

    let mut app = AppService::new(config);
    let mut hw = SimHardware::new();
    let mut now: i64 = 1_700_000_000;
    app.start(now, &mut hw, &mut Discard);

    for pair in steps.chunks_exact(2) {
        let (bits, step) = (pair[0], pair[1]);
        hw.contacts.bedroom_open = bits & 0b0001 != 0;
        hw.contacts.office_open = bits & 0b0010 != 0;
        hw.contacts.door_open_raw = bits & 0b0100 != 0;
        hw.contacts.furnace_calling = bits & 0b1000 != 0;

        // High bit: backwards clock jump of up to a day.
        if bits & 0x80 != 0 {
            now -= i64::from(step) * 340;
        } else {
            now += i64::from(step);
        }
        app.tick(now, &mut hw, &mut Discard);

        let snap = app.snapshot();
        assert_eq!(hw.relay_state(), app.state().is_running());
        assert!((0.0..=1.0).contains(&snap.current_ratio));
        assert!((0.0..=1.0).contains(&snap.moving_average));
    }

    assert_eq!(hw.relay_writes(), steps.len() as u64 / 2 + 1);
});
