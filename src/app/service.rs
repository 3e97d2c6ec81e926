//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the FSM, the door debounce filter, the data-log
//! emitter and the live configuration.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService       │ ──▶ RecordSink
//! ActuatorPort ◀──│  Door · FSM · Duty     │
//!                 └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::clock::Timestamp;
use crate::config::SystemConfig;
use crate::control::debounce::DoorDebounce;
use crate::datalog::{DataLogger, LogRecord};
use crate::error::{ActuatorError, CommandError, Result};
use crate::fsm::context::{FsmContext, Temperatures};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::commands::AppCommand;
use super::events::{AppEvent, ControllerSnapshot};
use super::ports::{
    ActuatorPort, ConfigError, ConfigPort, EventSink, RecordSink, SensorPort, SinkError, TimePort,
};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    fsm: Fsm,
    ctx: FsmContext,
    door: DoorDebounce,
    temperatures: Temperatures,
    logger: DataLogger,
    started: bool,
    tick_count: u64,
    /// Last relay write error, reported once until the relay recovers.
    relay_fault: Option<ActuatorError>,
    /// Last log sink error, reported once until a write succeeds.
    sink_fault: Option<SinkError>,
    config_dirty: bool,
    dirty_since_tick: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next, or let
    /// the first [`tick`](Self::tick) do it.
    pub fn new(config: SystemConfig) -> Self {
        let ctx = FsmContext::new(&config, 0);
        let door = DoorDebounce::new(false, config.door_delay_secs);
        let fsm = Fsm::new(build_state_table(), StateId::NotRunning);

        Self {
            config,
            fsm,
            ctx,
            door,
            temperatures: Temperatures::default(),
            logger: DataLogger::new(),
            started: false,
            tick_count: 0,
            relay_fault: None,
            sink_fault: None,
            config_dirty: false,
            dirty_since_tick: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Sample the inputs once, pick the initial mode and drive the relay.
    ///
    /// The fan starts in `Running` only when no contact is asserted.  The
    /// door filter is seeded with the raw door value, so a door that is
    /// already open at boot counts as settled.
    pub fn start(
        &mut self,
        now: Timestamp,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        let sensors = hw.read_contacts();
        self.temperatures = hw.read_temperatures();

        self.ctx = FsmContext::new(&self.config, now);
        self.ctx.sensors = sensors;
        self.door = DoorDebounce::new(sensors.door_open_raw, self.config.door_delay_secs);
        self.ctx.door_settled = self.door.settled_open();
        self.ctx.door_delay_elapsed = true;

        let initial = StateId::initial_for(&sensors);
        self.fsm = Fsm::new(build_state_table(), initial);
        self.fsm.start(&mut self.ctx);
        self.started = true;

        self.apply_relay(hw);
        sink.emit(&AppEvent::Started(initial));
        info!("AppService started in {:?}", initial);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read inputs → door filter → FSM → relay.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.  The relay is written exactly
    /// once per call.
    pub fn tick(
        &mut self,
        now: Timestamp,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) {
        if !self.started {
            self.start(now, hw, sink);
            return;
        }
        self.tick_count += 1;
        let prev_state = self.fsm.current_state();

        // 1. Read inputs via SensorPort
        let sensors = hw.read_contacts();
        self.temperatures = hw.read_temperatures();

        // 2. Clock and door delay
        if now < self.ctx.now {
            warn!(
                "Clock stepped back {} s, shifting the open duty period",
                self.ctx.now - now
            );
        }
        self.ctx.advance_clock(now);
        self.ctx.sensors = sensors;
        self.ctx.door_settled = self.door.update(sensors.door_open_raw, now);
        self.ctx.door_delay_elapsed = !self.door.is_pending();
        self.ctx.targets = self.config.targets;
        self.ctx.closed_ratio = None;

        // 3. FSM tick (pure state logic)
        self.fsm.tick(&mut self.ctx);
        debug!(
            "tick {}: {:?} ratio={:.3} door={}",
            self.tick_count,
            self.fsm.current_state(),
            self.ctx.duty.current_ratio,
            self.ctx.door_settled
        );

        // 4. Apply the relay via ActuatorPort
        self.apply_relay(hw);

        // 5. Emit what changed
        if let Some(ratio) = self.ctx.closed_ratio {
            sink.emit(&AppEvent::PeriodClosed {
                ratio,
                moving_average: self.ctx.duty.moving_average,
            });
        }
        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    /// Append a data-log record if one is due.  Returns `true` if written.
    ///
    /// Sink failures are logged and otherwise ignored; the control path
    /// never sees them.
    pub fn log_record(&mut self, records: &mut impl RecordSink) -> bool {
        let record = LogRecord::from(&self.snapshot());
        let result = self.logger.log(
            &record,
            self.config.logging_enabled,
            self.config.logging_interval_secs,
            records,
        );
        match result {
            Ok(written) => {
                if written && self.sink_fault.take().is_some() {
                    info!("Data log recovered");
                }
                written
            }
            Err(e) => {
                if self.sink_fault != Some(e) {
                    warn!("Data log write failed: {}", e);
                    self.sink_fault = Some(e);
                }
                false
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (console, stdin).
    ///
    /// Values are range-checked against the config rules; a rejected
    /// command leaves every setting unchanged.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        clock: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::SetDesiredRatio(ratio) => {
                self.update_config(|c| c.targets.desired_ratio = ratio)?;
                info!("Desired ratio set to {:.3}", ratio);
                sink.emit(&AppEvent::TargetsChanged(self.config.targets));
            }
            AppCommand::SetAdjustment(enabled) => {
                self.update_config(|c| c.targets.adjustment_enabled = enabled)?;
                info!("Duty-cycle adjustment {}", if enabled { "on" } else { "off" });
                sink.emit(&AppEvent::TargetsChanged(self.config.targets));
            }
            AppCommand::SetLogging(enabled) => {
                self.update_config(|c| c.logging_enabled = enabled)?;
                info!("Data logging {}", if enabled { "on" } else { "off" });
            }
            AppCommand::SetLoggingInterval(secs) => {
                self.update_config(|c| c.logging_interval_secs = secs)?;
                info!("Data log interval set to {} s", secs);
            }
            AppCommand::SetDoorDelay(secs) => {
                self.update_config(|c| c.door_delay_secs = secs)?;
                self.door.set_delay(secs);
                info!("Door delay set to {} s", secs);
            }
            AppCommand::SetClock(fields) => {
                let from = clock.now();
                clock.set_clock(&fields)?;
                let to = clock.now();
                info!("Clock set: {} -> {}", from, to);
                sink.emit(&AppEvent::ClockSet { from, to });
            }
            AppCommand::SaveConfig => {
                self.config_dirty = true;
                self.dirty_since_tick = 0;
                info!("Explicit config save requested (will flush on next auto-save check)");
            }
            AppCommand::ReportStatus => {
                sink.emit(&AppEvent::Status(self.snapshot()));
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a point-in-time snapshot from the current context.
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            timestamp: self.ctx.now,
            run_state: self.fsm.current_state(),
            relay_on: self.ctx.relay_on,
            sensors: self.ctx.sensors,
            door_settled: self.ctx.door_settled,
            current_ratio: self.ctx.duty.current_ratio,
            moving_average: self.ctx.duty.moving_average,
            sample_count: self.ctx.duty.sample_count,
            desired_ratio: self.config.targets.desired_ratio,
            adjustment_enabled: self.config.targets.adjustment_enabled,
            temperatures: self.temperatures,
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Borrow the live configuration.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Write the commanded relay state.  Errors are logged once per fault.
    fn apply_relay(&mut self, hw: &mut impl ActuatorPort) {
        match hw.set_relay(self.ctx.relay_on) {
            Ok(()) => {
                if self.relay_fault.take().is_some() {
                    info!("Relay output recovered");
                }
            }
            Err(e) => {
                if self.relay_fault != Some(e) {
                    warn!("Relay write failed: {}", e);
                    self.relay_fault = Some(e);
                }
            }
        }
    }

    /// Apply `change` to a copy of the config, validate, then commit.
    fn update_config(&mut self, change: impl FnOnce(&mut SystemConfig)) -> Result<()> {
        let mut candidate = self.config.clone();
        change(&mut candidate);
        candidate.validate().map_err(|e| match e {
            ConfigError::ValidationFailed(msg) => CommandError::InvalidArgument(msg),
            _ => CommandError::InvalidArgument("configuration rejected"),
        })?;
        if candidate != self.config {
            self.config = candidate;
            self.mark_config_dirty();
        }
        Ok(())
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified.
    pub fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_tick = self.tick_count;
        }
    }

    /// Save once `autosave_delay_secs` have passed since the first unsaved
    /// change.  Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        let ticks_since_dirty = self.tick_count.saturating_sub(self.dirty_since_tick);
        let secs_since_dirty = ticks_since_dirty as f32 * self.config.control_period_secs();
        if secs_since_dirty < f32::from(self.config.autosave_delay_secs) {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before shutdown).
    pub fn force_save_if_dirty(&mut self, storage: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config force-saved before shutdown");
            }
            Err(e) => {
                warn!("Config force-save failed: {}", e);
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
