//! Air-exchange controller: main entry point.
//!
//! Hexagonal architecture driven by a cadence scheduler.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioHardware / SimHardware   LogEventSink   FileConfigStore   │
//! │  (Sensor+Actuator)            (EventSink)    (ConfigPort)      │
//! │  CsvFileSink    LogDisplay    SystemClock    console (stdin)   │
//! │  (RecordSink)   (DisplayPort) (TimePort)                       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Door filter · FSM · Duty cycle · Data log             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven): control · display · autosave    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the host the binary runs against [`SimHardware`]; type `sim door on`
//! and friends on stdin to move the inputs, `quit` to exit.
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};

use airexchange::adapters::config_store::FileConfigStore;
use airexchange::adapters::csv_sink::CsvFileSink;
use airexchange::adapters::display::LogDisplay;
use airexchange::adapters::log_sink::LogEventSink;
use airexchange::adapters::time::SystemClock;
use airexchange::app::commands::AppCommand;
use airexchange::app::ports::{ActuatorPort, DisplayPort, SchedulerDelegate, SensorPort, TimePort};
use airexchange::app::service::AppService;
use airexchange::config::SystemConfig;
use airexchange::display::DisplayText;
use airexchange::error::{CommandError, Error};
use airexchange::scheduler::{Schedule, Scheduler, Task};

/// Main loop poll period.  Task cadence comes from the scheduler.
const POLL_INTERVAL_MS: u64 = 50;

/// Extra console handling for a particular hardware backend.  Returns
/// `None` when the line is not for the backend.
type BackendConsole<H> = fn(&mut H, &str) -> Option<Result<(), CommandError>>;

// ── Runtime ───────────────────────────────────────────────────
//
// Owns the service plus every adapter.  The scheduler calls back into it
// through `SchedulerDelegate`, so cadence stays out of the domain core.

struct Runtime<H> {
    app: AppService,
    hw: H,
    clock: SystemClock,
    events: LogEventSink,
    records: CsvFileSink,
    lcd: LogDisplay,
    store: FileConfigStore,
}

impl<H: SensorPort + ActuatorPort> Runtime<H> {
    fn handle_line(&mut self, line: &str, backend: BackendConsole<H>) {
        if let Some(result) = backend(&mut self.hw, line) {
            if let Err(e) = result {
                warn!("Console: '{}' rejected: {}", line, Error::Command(e));
            }
            return;
        }
        let result = AppCommand::parse(line)
            .map_err(Error::from)
            .and_then(|cmd| self.app.handle_command(cmd, &mut self.clock, &mut self.events));
        if let Err(e) = result {
            warn!("Console: '{}' rejected: {}", line, e);
        }
    }
}

impl<H: SensorPort + ActuatorPort> SchedulerDelegate for Runtime<H> {
    fn on_schedule_fired(&mut self, label: &str, task: Task) {
        debug!("Schedule fired: '{}' ({:?})", label, task);
        match task {
            Task::ControlCycle => {
                let now = self.clock.now();
                self.app.tick(now, &mut self.hw, &mut self.events);
                self.app.log_record(&mut self.records);
            }
            Task::DisplayRefresh => {
                let frame = DisplayText::render(&self.app.snapshot());
                self.lcd.show(&frame);
            }
            Task::ConfigSave => {
                self.app.auto_save_if_needed(&self.store);
            }
        }
    }
}

fn build_scheduler(config: &SystemConfig) -> Scheduler {
    let mut sched = Scheduler::new();
    let entries = [
        ("control", Task::ControlCycle, config.control_loop_interval_ms),
        ("display", Task::DisplayRefresh, config.display_interval_ms),
        ("autosave", Task::ConfigSave, config.control_loop_interval_ms),
    ];
    for (label, task, interval_ms) in entries {
        let schedule = Schedule {
            label,
            task,
            interval_ms,
            enabled: true,
        };
        if sched.add(schedule).is_none() {
            warn!("Scheduler full, '{}' not scheduled", label);
        }
    }
    info!("Scheduler: {} tasks active", sched.active_count());
    sched
}

/// Feed stdin lines to the main loop.  The UART console on the device,
/// the terminal on the host.
fn spawn_console() -> Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("console".into())
        .stack_size(8 * 1024)
        .spawn(move || {
            for line in std::io::stdin().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

fn load_config(store: &FileConfigStore) -> SystemConfig {
    let config = store.load_or_default();
    info!(
        "Config: door delay {} s, target {:.0}% (adjust {}), log every {} s",
        config.door_delay_secs,
        config.targets.desired_ratio * 100.0,
        if config.targets.adjustment_enabled { "on" } else { "off" },
        config.logging_interval_secs,
    );
    config
}

/// Start the service and run the scheduler until `quit` (host only).
fn run<H: SensorPort + ActuatorPort>(mut rt: Runtime<H>, backend: BackendConsole<H>) -> Result<()> {
    let mut sched = build_scheduler(rt.app.config());
    let console = spawn_console()?;

    let now = rt.clock.now();
    rt.app.start(now, &mut rt.hw, &mut rt.events);
    info!("System ready. Entering scheduler loop.");

    loop {
        for line in console.try_iter() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            #[cfg(not(target_os = "espidf"))]
            if line.eq_ignore_ascii_case("quit") {
                rt.app.force_save_if_dirty(&rt.store);
                info!("Shutting down after {} ticks", rt.app.tick_count());
                return Ok(());
            }
            rt.handle_line(line, backend);
        }

        let uptime_ms = rt.clock.uptime_ms();
        sched.tick(uptime_ms, &mut rt);

        thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
}

// ── Main ──────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use airexchange::adapters::sim::SimHardware;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  AirExchange v{} (host sim)       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "airexchange.json".into());
    let log_path = args.next().unwrap_or_else(|| "airexchange.csv".into());

    let store = FileConfigStore::new(config_path);
    let config = load_config(&store);

    let rt = Runtime {
        app: AppService::new(config),
        hw: SimHardware::new(),
        clock: SystemClock::new(),
        events: LogEventSink::new(),
        records: CsvFileSink::open(log_path),
        lcd: LogDisplay::new(),
        store,
    };

    let backend: BackendConsole<SimHardware> =
        |hw, line| line.strip_prefix("sim").map(|args| hw.apply(args));
    run(rt, backend)
}

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use airexchange::adapters::hardware::GpioHardware;
    use airexchange::drivers::hw_init;
    use airexchange::drivers::relay::RelayDriver;
    use airexchange::pins;
    use airexchange::sensors::ContactBank;
    use airexchange::sensors::contact::{ContactInput, Polarity};
    use airexchange::sensors::temperature::NtcThermistor;
    use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AirExchange v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from the SD card (or defaults) ─────────
    let store = FileConfigStore::new(format!("{}/airexchange.cfg", pins::SD_MOUNT_POINT));
    let config = load_config(&store);

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_adc(&[pins::INDOOR_TEMP_ADC_CHANNEL, pins::OUTDOOR_TEMP_ADC_CHANNEL])
        .map_err(Error::from)?;

    let reads = config.contact_debounce_reads;
    let contact = |name: &'static str, gpio: i32| -> Result<_> {
        // SAFETY: each GPIO number in `pins` is claimed exactly once here.
        let mut driver = PinDriver::input(unsafe { AnyIOPin::new(gpio) })?;
        driver.set_pull(Pull::Up)?;
        Ok(ContactInput::new(name, driver, Polarity::ActiveLow, reads))
    };
    let contacts = ContactBank::new(
        contact("bedroom", pins::BEDROOM_CONTACT_GPIO)?,
        contact("office", pins::OFFICE_CONTACT_GPIO)?,
        contact("door", pins::DOOR_CONTACT_GPIO)?,
        contact("furnace", pins::FURNACE_CALL_GPIO)?,
    );

    // SAFETY: the relay GPIO is not claimed anywhere else.
    let relay_pin = PinDriver::output(unsafe { AnyOutputPin::new(pins::FAN_RELAY_GPIO) })?;
    let relay = RelayDriver::new(relay_pin, pins::FAN_RELAY_ACTIVE_LOW);

    let hw = GpioHardware::new(
        contacts,
        relay,
        NtcThermistor::new(hw_init::adc1_channel(pins::INDOOR_TEMP_ADC_CHANNEL)),
        NtcThermistor::new(hw_init::adc1_channel(pins::OUTDOOR_TEMP_ADC_CHANNEL)),
    );

    // ── 4. Service + adapters ─────────────────────────────────
    let rt = Runtime {
        app: AppService::new(config),
        hw,
        clock: SystemClock::new(),
        events: LogEventSink::new(),
        records: CsvFileSink::open(format!("{}/airlog.csv", pins::SD_MOUNT_POINT)),
        lcd: LogDisplay::new(),
        store,
    };

    run(rt, |_, _| None)
}
