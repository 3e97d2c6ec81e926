//! Integration tests for the data log: AppService snapshots written through
//! the CSV file sink.

use crate::mock_hw::{MockHardware, RecordingSink};

use airexchange::adapters::csv_sink::CsvFileSink;
use airexchange::app::service::AppService;
use airexchange::config::SystemConfig;
use airexchange::datalog::CSV_HEADER;

fn config_with_interval(secs: u32) -> SystemConfig {
    let mut config = SystemConfig::default();
    config.logging_interval_secs = secs;
    config
}

#[test]
fn service_writes_header_and_rows_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airlog.csv");
    let mut csv = CsvFileSink::open(&path);

    let mut app = AppService::new(config_with_interval(30));
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    // 2024-05-06 00:00:00 UTC
    let base = 1_714_953_600;
    app.start(base, &mut hw, &mut sink);
    for t in 1..=60 {
        if t == 45 {
            hw.contacts.furnace_calling = true;
        }
        app.tick(base + t, &mut hw, &mut sink);
        app.log_record(&mut csv);
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 4, "header plus records at t=1, 31 and 61:\n{text}");
    assert!(lines[1].starts_with("2024-05-06 00:00:01,RUN,1,0,0,0,0,100.000,50.000,0.00,20.0,5.0"));
    assert!(lines[2].starts_with("2024-05-06 00:00:31,RUN,1,"));
    assert!(lines[3].starts_with("2024-05-06 00:01:01,OFF,0,0,0,0,1,0.000,50.000,100.00,"));
}

#[test]
fn reopened_log_appends_without_second_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airlog.csv");

    for (round, base) in [(0, 1_000), (1, 2_000)] {
        let mut csv = CsvFileSink::open(&path);
        let mut app = AppService::new(config_with_interval(10));
        let mut hw = MockHardware::new();
        let mut sink = RecordingSink::new();
        app.start(base, &mut hw, &mut sink);
        assert!(app.log_record(&mut csv), "round {round} wrote nothing");
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches(CSV_HEADER).count(), 1);
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn disabled_logging_leaves_file_with_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("airlog.csv");
    let mut csv = CsvFileSink::open(&path);

    let mut config = config_with_interval(10);
    config.logging_enabled = false;
    let mut app = AppService::new(config);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    app.start(0, &mut hw, &mut sink);
    for t in 1..=100 {
        app.tick(t, &mut hw, &mut sink);
        app.log_record(&mut csv);
    }

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), vec![CSV_HEADER]);
}
