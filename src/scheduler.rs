//! Cadence scheduler.
//!
//! Decouples the control cycle, display refresh and config auto-save from
//! each other and from the main loop's poll rate.  The scheduler notifies a
//! [`SchedulerDelegate`] when a task is due; the main loop implements the
//! delegate.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    uptime_ms (monotonic)                     │
//! │                              │                               │
//! │        ┌─────────────────────┼──────────────────────┐        │
//! │        ▼                     ▼                      ▼        │
//! │  ┌───────────┐        ┌───────────┐          ┌───────────┐   │
//! │  │  Control  │        │  Display  │          │  Config   │   │
//! │  │  cycle    │        │  refresh  │          │  save     │   │
//! │  └─────┬─────┘        └─────┬─────┘          └─────┬─────┘   │
//! │        └────────────────────┼──────────────────────┘         │
//! │                             ▼                                │
//! │                     SchedulerDelegate                        │
//! │                             │                                │
//! │                             ▼                                │
//! │                   AppService.tick() / snapshot()             │
//! │                   AppService.auto_save_if_needed()           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cadence is measured on uptime, never on the wall clock, so a user clock
//! set does not stall or burst the control loop.

use crate::app::ports::SchedulerDelegate;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// Work items the main loop knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    ControlCycle,
    DisplayRefresh,
    ConfigSave,
}

/// A single schedule entry.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label (e.g., "control").
    pub label: &'static str,
    pub task: Task,
    /// Fire every `interval_ms` of uptime.
    pub interval_ms: u32,
    /// Whether this schedule is currently enabled.
    pub enabled: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules (stack-allocated).
const MAX_SCHEDULES: usize = 4;

/// The scheduler engine.
///
/// When a schedule is due it invokes the [`SchedulerDelegate`] callback
/// rather than running the work itself.
pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Uptime of the last fire; `None` until the first tick.
    last_fired_ms: Option<u64>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
        }
    }

    /// Add a schedule.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        for (i, slot) in self.schedules.iter_mut().enumerate() {
            if slot.is_none() {
                info!(
                    "Scheduler: added '{}' every {} ms at slot {}",
                    schedule.label, schedule.interval_ms, i
                );
                *slot = Some(ScheduleEntry {
                    schedule,
                    last_fired_ms: None,
                });
                return Some(i);
            }
        }
        None // All slots full.
    }

    /// Fire every due schedule.  Call as often as the main loop polls.
    ///
    /// A schedule fires on the first tick after it was added, then whenever
    /// `interval_ms` has passed since its last fire.  Missed intervals are
    /// not replayed: one late tick fires once.
    pub fn tick(&mut self, uptime_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for slot in self.schedules.iter_mut() {
            let entry = match slot {
                Some(e) if e.schedule.enabled => e,
                _ => continue,
            };

            let due = match entry.last_fired_ms {
                None => true,
                Some(last) => uptime_ms.saturating_sub(last) >= u64::from(entry.schedule.interval_ms),
            };
            if due {
                debug!("Scheduler: '{}' fired at {} ms", entry.schedule.label, uptime_ms);
                entry.last_fired_ms = Some(uptime_ms);
                delegate.on_schedule_fired(entry.schedule.label, entry.schedule.task);
            }
        }
    }

    /// Number of active (enabled) schedules.
    pub fn active_count(&self) -> usize {
        self.schedules
            .iter()
            .filter(|s| s.as_ref().is_some_and(|e| e.schedule.enabled))
            .count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
