//! Integration tests for the AppService → door filter → FSM → relay pipeline.
//!
//! These run on the host and drive the service with scripted contact
//! inputs and explicit timestamps, the way the scheduler loop does.

use crate::mock_hw::{MockClock, MockHardware, RecordingSink, VecRecordSink};

use airexchange::adapters::config_store::FileConfigStore;
use airexchange::app::commands::AppCommand;
use airexchange::app::events::AppEvent;
use airexchange::app::ports::ConfigPort;
use airexchange::app::service::AppService;
use airexchange::clock::{DateTimeFields, SECS_PER_DAY, Timestamp};
use airexchange::config::SystemConfig;
use airexchange::error::{CommandError, Error};
use airexchange::fsm::StateId;

fn make_app(config: SystemConfig) -> (AppService, MockHardware, RecordingSink) {
    (AppService::new(config), MockHardware::new(), RecordingSink::new())
}

fn command(app: &mut AppService, cmd: AppCommand, sink: &mut RecordingSink) {
    let mut clock = MockClock { now: 0 };
    app.handle_command(cmd, &mut clock, sink).unwrap();
}

/// Tick once per second over `from..=to`.
fn run(
    app: &mut AppService,
    hw: &mut MockHardware,
    sink: &mut RecordingSink,
    from: Timestamp,
    to: Timestamp,
) {
    for t in from..=to {
        app.tick(t, hw, sink);
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn all_clear_at_startup_runs_the_fan() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);

    assert_eq!(app.state(), StateId::Running);
    assert!(hw.relay_on());
    assert!(matches!(sink.events[0], AppEvent::Started(StateId::Running)));
}

#[test]
fn any_contact_at_startup_keeps_the_fan_off() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    hw.contacts.office_open = true;
    app.start(0, &mut hw, &mut sink);

    assert_eq!(app.state(), StateId::NotRunning);
    assert!(!hw.relay_on());
}

#[test]
fn first_tick_starts_the_service_lazily() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.tick(10, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Running);
    assert_eq!(app.tick_count(), 0);
    assert_eq!(hw.relay_writes, vec![true]);
}

// ── Off requests ──────────────────────────────────────────────

#[test]
fn furnace_call_stops_fan_and_folds_period() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);
    run(&mut app, &mut hw, &mut sink, 1, 99);
    assert_eq!(app.state(), StateId::Running);

    hw.contacts.furnace_calling = true;
    app.tick(100, &mut hw, &mut sink);

    assert_eq!(app.state(), StateId::NotRunning);
    assert!(!hw.relay_on());
    let snap = app.snapshot();
    assert_eq!(snap.sample_count, 1);
    assert!((snap.moving_average - 1.0).abs() < 1e-6);
    assert_eq!(sink.closed_periods().len(), 1);
    assert_eq!(
        sink.state_changes(),
        vec![(StateId::Running, StateId::NotRunning)]
    );
}

#[test]
fn fan_restarts_once_everything_clears() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    hw.contacts.bedroom_open = true;
    app.start(0, &mut hw, &mut sink);
    run(&mut app, &mut hw, &mut sink, 1, 50);
    assert_eq!(app.state(), StateId::NotRunning);

    hw.contacts.bedroom_open = false;
    app.tick(51, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Running);
    assert!(hw.relay_on());
}

// ── Duty-cycle regulation ─────────────────────────────────────

#[test]
fn low_ratio_holds_fan_on_through_off_request() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    command(&mut app, AppCommand::SetAdjustment(true), &mut sink);
    command(&mut app, AppCommand::SetDesiredRatio(0.30), &mut sink);

    // Off for 750 s, then on.
    hw.contacts.furnace_calling = true;
    app.start(0, &mut hw, &mut sink);
    hw.contacts.furnace_calling = false;
    app.tick(750, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Running);

    // At t=1000 the period is 25 % on, below the 30 % target.
    hw.contacts.furnace_calling = true;
    app.tick(1000, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::RunningAdjusting);
    assert!(hw.relay_on());
    assert!((app.snapshot().current_ratio - 0.25).abs() < 1e-6);

    // 450 / 1200 = 37.5 % overshoots the target and closes the period.
    app.tick(1200, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::NotRunning);
    assert!(!hw.relay_on());
    let closed = sink.closed_periods();
    assert_eq!(closed.len(), 1);
    assert!((closed[0] - 0.375).abs() < 1e-6);
}

#[test]
fn without_adjustment_off_request_stops_immediately() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    command(&mut app, AppCommand::SetDesiredRatio(0.90), &mut sink);

    hw.contacts.furnace_calling = true;
    app.start(0, &mut hw, &mut sink);
    hw.contacts.furnace_calling = false;
    app.tick(900, &mut hw, &mut sink);
    hw.contacts.furnace_calling = true;
    app.tick(1000, &mut hw, &mut sink);

    assert_eq!(app.state(), StateId::NotRunning);
}

// ── Door delay ────────────────────────────────────────────────

#[test]
fn brief_door_opening_is_invisible() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);

    hw.contacts.door_open_raw = true;
    for t in 1..=59 {
        app.tick(t, &mut hw, &mut sink);
        assert!(!app.snapshot().door_settled);
    }
    hw.contacts.door_open_raw = false;
    for t in 60..=400 {
        app.tick(t, &mut hw, &mut sink);
        assert!(!app.snapshot().door_settled, "door settled open at t={t}");
        assert_eq!(app.state(), StateId::Running);
    }
    assert!(sink.state_changes().is_empty());
}

#[test]
fn door_held_open_past_delay_stops_fan() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);

    hw.contacts.door_open_raw = true;
    run(&mut app, &mut hw, &mut sink, 10, 129);
    assert_eq!(app.state(), StateId::Running);

    app.tick(130, &mut hw, &mut sink);
    assert!(app.snapshot().door_settled);
    assert_eq!(app.state(), StateId::NotRunning);
}

#[test]
fn pending_door_defers_other_requests() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);

    hw.contacts.door_open_raw = true;
    app.tick(10, &mut hw, &mut sink);
    hw.contacts.furnace_calling = true;
    run(&mut app, &mut hw, &mut sink, 11, 129);
    assert_eq!(app.state(), StateId::Running, "held while the door edge ages");

    app.tick(130, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::NotRunning);
}

#[test]
fn door_delay_command_applies_to_next_edge() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    command(&mut app, AppCommand::SetDoorDelay(5), &mut sink);
    app.start(0, &mut hw, &mut sink);

    hw.contacts.door_open_raw = true;
    run(&mut app, &mut hw, &mut sink, 1, 5);
    assert_eq!(app.state(), StateId::Running);
    app.tick(6, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::NotRunning);
}

// ── Relay writes ──────────────────────────────────────────────

#[test]
fn relay_is_written_exactly_once_per_tick() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);
    run(&mut app, &mut hw, &mut sink, 1, 20);
    hw.contacts.bedroom_open = true;
    run(&mut app, &mut hw, &mut sink, 21, 40);

    assert_eq!(hw.relay_writes.len(), 41);
    assert!(hw.relay_writes[..21].iter().all(|&on| on));
    assert!(hw.relay_writes[21..].iter().all(|&on| !on));
}

#[test]
fn repeated_ticks_with_same_inputs_are_stable() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    hw.contacts.furnace_calling = true;
    app.start(0, &mut hw, &mut sink);
    run(&mut app, &mut hw, &mut sink, 1, 500);

    assert_eq!(app.state(), StateId::NotRunning);
    assert!(sink.state_changes().is_empty());
}

#[test]
fn relay_fault_does_not_stop_the_state_machine() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);
    hw.fail_relay = true;
    hw.contacts.furnace_calling = true;
    app.tick(1, &mut hw, &mut sink);

    assert_eq!(app.state(), StateId::NotRunning);
    assert!(hw.relay_on(), "failed write leaves the output untouched");

    hw.fail_relay = false;
    app.tick(2, &mut hw, &mut sink);
    assert!(!hw.relay_on());
}

// ── Backward clock steps ──────────────────────────────────────

const T0: Timestamp = 1_700_000_000;

/// One hour back, and two days back.
const STEPS_BACK: [Timestamp; 2] = [3_600, 2 * SECS_PER_DAY];

/// Adjustment on, target 0.5.  Off for 500 s then on for 400 s, so the
/// open period sits at 4/9 and the fan is `Running` at `T0 + 900`.
fn regulating_app() -> (AppService, MockHardware, RecordingSink) {
    let mut config = SystemConfig::default();
    config.targets.adjustment_enabled = true;
    config.targets.desired_ratio = 0.5;
    let (mut app, mut hw, mut sink) = make_app(config);

    hw.contacts.furnace_calling = true;
    app.start(T0, &mut hw, &mut sink);
    hw.contacts.furnace_calling = false;
    app.tick(T0 + 500, &mut hw, &mut sink);
    app.tick(T0 + 900, &mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Running);
    (app, hw, sink)
}

#[test]
fn clock_step_back_while_running_keeps_the_ratio() {
    for back in STEPS_BACK {
        let (mut app, mut hw, mut sink) = regulating_app();
        let ratio = app.snapshot().current_ratio;

        hw.contacts.furnace_calling = true;
        let base = T0 + 900 - back;
        app.tick(base, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::RunningAdjusting, "{back} s back");
        assert_eq!(app.snapshot().current_ratio, ratio);

        // 500 / 1000 is not above the target; 501 / 1001 is.
        run(&mut app, &mut hw, &mut sink, base + 1, base + 100);
        assert_eq!(app.state(), StateId::RunningAdjusting, "{back} s back");
        app.tick(base + 101, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::NotRunning, "{back} s back");
        assert!(!hw.relay_on());
        let closed = sink.closed_periods();
        assert_eq!(closed.len(), 1);
        assert!((closed[0] - 501.0 / 1001.0).abs() < 1e-6);
    }
}

#[test]
fn clock_step_back_while_adjusting_does_not_hold_the_fan() {
    for back in STEPS_BACK {
        let (mut app, mut hw, mut sink) = regulating_app();
        hw.contacts.furnace_calling = true;
        app.tick(T0 + 950, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::RunningAdjusting);

        // 450 / 950 carried over; above 0.5 once 51 more seconds run.
        let base = T0 + 950 - back;
        run(&mut app, &mut hw, &mut sink, base, base + 50);
        assert_eq!(app.state(), StateId::RunningAdjusting, "{back} s back");
        assert!(hw.relay_on());
        app.tick(base + 51, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::NotRunning, "{back} s back");
        assert!(!hw.relay_on());
    }
}

#[test]
fn clock_step_back_while_stopped_measures_the_next_period() {
    for back in STEPS_BACK {
        let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
        hw.contacts.furnace_calling = true;
        app.start(T0, &mut hw, &mut sink);
        app.tick(T0 + 500, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::NotRunning);

        hw.contacts.furnace_calling = false;
        let base = T0 + 500 - back;
        app.tick(base, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::Running, "{back} s back");

        hw.contacts.furnace_calling = true;
        app.tick(base + 100, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::NotRunning, "{back} s back");
        let closed = sink.closed_periods();
        assert!((closed[0] - 100.0 / 600.0).abs() < 1e-6, "{back} s back: {}", closed[0]);
    }
}

#[test]
fn off_request_stops_within_one_cycle_after_clock_step_back() {
    for back in STEPS_BACK {
        let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
        app.start(T0, &mut hw, &mut sink);
        run(&mut app, &mut hw, &mut sink, T0 + 1, T0 + 100);

        hw.contacts.furnace_calling = true;
        app.tick(T0 + 100 - back, &mut hw, &mut sink);
        assert_eq!(app.state(), StateId::NotRunning, "{back} s back");
        assert!(!hw.relay_on());
        assert!((sink.closed_periods()[0] - 1.0).abs() < 1e-6);
    }
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn console_lines_reach_the_config() {
    let (mut app, _hw, mut sink) = make_app(SystemConfig::default());
    for line in ["ratio 40", "adjust on", "interval 60", "log off"] {
        let cmd = AppCommand::parse(line).unwrap();
        command(&mut app, cmd, &mut sink);
    }
    let cfg = app.config();
    assert!((cfg.targets.desired_ratio - 0.40).abs() < 1e-6);
    assert!(cfg.targets.adjustment_enabled);
    assert_eq!(cfg.logging_interval_secs, 60);
    assert!(!cfg.logging_enabled);
    assert!(app.is_config_dirty());
}

#[test]
fn out_of_range_command_is_rejected() {
    let (mut app, _hw, mut sink) = make_app(SystemConfig::default());
    let mut clock = MockClock { now: 0 };
    let err = app
        .handle_command(AppCommand::SetDoorDelay(7200), &mut clock, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Command(CommandError::InvalidArgument(_))));
    assert_eq!(app.config().door_delay_secs, 120);
}

#[test]
fn clock_set_emits_event_and_moves_the_clock() {
    let (mut app, _hw, mut sink) = make_app(SystemConfig::default());
    let mut clock = MockClock { now: 1_000 };
    let fields = DateTimeFields::parse("2024-03-01 12:00:00").unwrap();
    app.handle_command(AppCommand::SetClock(fields), &mut clock, &mut sink)
        .unwrap();

    assert_eq!(clock.now, 1_709_294_400);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ClockSet {
            from: 1_000,
            to: 1_709_294_400
        }
    )));
}

#[test]
fn status_command_reports_snapshot() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);
    app.tick(30, &mut hw, &mut sink);
    command(&mut app, AppCommand::ReportStatus, &mut sink);

    let status = sink.events.iter().find_map(|e| match e {
        AppEvent::Status(s) => Some(*s),
        _ => None,
    });
    let status = status.expect("status event");
    assert_eq!(status.run_state, StateId::Running);
    assert!(status.relay_on);
    assert_eq!(status.timestamp, 30);
    assert_eq!(status.temperatures.indoor_c, Some(20.0));
}

// ── Data log ──────────────────────────────────────────────────

#[test]
fn records_follow_logging_interval() {
    let mut config = SystemConfig::default();
    config.logging_interval_secs = 60;
    let (mut app, mut hw, mut sink) = make_app(config);
    let mut records = VecRecordSink::default();

    app.start(0, &mut hw, &mut sink);
    for t in 1..=180 {
        app.tick(t, &mut hw, &mut sink);
        app.log_record(&mut records);
    }

    let stamps: Vec<_> = records.records.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![1, 61, 121]);
    assert!(records.records.iter().all(|r| r.state == "RUN" && r.relay_on));
}

#[test]
fn backwards_clock_pauses_the_log() {
    let mut config = SystemConfig::default();
    config.logging_interval_secs = 10;
    let (mut app, mut hw, mut sink) = make_app(config);
    let mut records = VecRecordSink::default();

    app.start(1_000, &mut hw, &mut sink);
    assert!(app.log_record(&mut records));

    app.tick(500, &mut hw, &mut sink);
    assert!(!app.log_record(&mut records));

    app.tick(1_010, &mut hw, &mut sink);
    assert!(app.log_record(&mut records));
    assert_eq!(records.records.len(), 2);
}

#[test]
fn failing_record_sink_does_not_affect_control() {
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    let mut records = VecRecordSink {
        fail: true,
        ..Default::default()
    };
    app.start(0, &mut hw, &mut sink);
    hw.contacts.furnace_calling = true;
    app.tick(1, &mut hw, &mut sink);
    assert!(!app.log_record(&mut records));
    assert_eq!(app.state(), StateId::NotRunning);
}

// ── Config persistence ────────────────────────────────────────

#[test]
fn config_auto_saves_after_delay() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileConfigStore::new(dir.path().join("airexchange.json"));
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);

    command(&mut app, AppCommand::SetDesiredRatio(0.4), &mut sink);
    for t in 1..=4 {
        app.tick(t, &mut hw, &mut sink);
        assert!(!app.auto_save_if_needed(&store), "saved early at t={t}");
    }
    app.tick(5, &mut hw, &mut sink);
    assert!(app.auto_save_if_needed(&store));
    assert!(!app.is_config_dirty());

    let loaded = store.load().unwrap();
    assert!((loaded.targets.desired_ratio - 0.4).abs() < 1e-6);
}

#[test]
fn explicit_save_flushes_on_next_check() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileConfigStore::new(dir.path().join("airexchange.cfg"));
    let (mut app, mut hw, mut sink) = make_app(SystemConfig::default());
    app.start(0, &mut hw, &mut sink);
    run(&mut app, &mut hw, &mut sink, 1, 10);

    command(&mut app, AppCommand::SaveConfig, &mut sink);
    assert!(app.auto_save_if_needed(&store));
    assert_eq!(store.load().unwrap(), SystemConfig::default());
}

#[test]
fn force_save_writes_pending_changes() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileConfigStore::new(dir.path().join("airexchange.json"));
    let (mut app, _hw, mut sink) = make_app(SystemConfig::default());

    command(&mut app, AppCommand::SetLoggingInterval(900), &mut sink);
    app.force_save_if_dirty(&store);

    assert!(!app.is_config_dirty());
    assert_eq!(store.load().unwrap().logging_interval_secs, 900);
}
