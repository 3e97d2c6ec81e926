//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌─────────────────────┬──────────┬───────────────────┐  │
//! │  │ StateId             │ on_enter │ on_update         │  │
//! │  ├─────────────────────┼──────────┼───────────────────┤  │
//! │  │ Running             │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ NotRunning          │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ RunningAdjusting    │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ NotRunningAdjusting │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └─────────────────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut FsmContext` which
//! holds contact readings, the duty-cycle estimator, targets, and the
//! relay command.  Handlers never fail.

pub mod context;
pub mod states;

use context::{FsmContext, SensorSnapshot};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Fan run modes.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Running = 0,
    NotRunning = 1,
    RunningAdjusting = 2,
    NotRunningAdjusting = 3,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert a `u8` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `NotRunning` in release (fan off).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Running,
            1 => Self::NotRunning,
            2 => Self::RunningAdjusting,
            3 => Self::NotRunningAdjusting,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::NotRunning
            }
        }
    }

    /// Starting mode: run only when no contact is asserted.
    pub fn initial_for(sensors: &SensorSnapshot) -> Self {
        if sensors.quiescent() {
            Self::Running
        } else {
            Self::NotRunning
        }
    }

    /// Whether the relay is on in this mode.
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::RunningAdjusting)
    }

    /// Short code for the display and the data log.
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "RUN",
            Self::NotRunning => "OFF",
            Self::RunningAdjusting => "RUN-ADJ",
            Self::NotRunningAdjusting => "OFF-ADJ",
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]) and a mutable
/// [`FsmContext`] that is threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        debug_assert_eq!(self.table[self.current].id as usize, self.current);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        // Exit current state
        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        // Enter new state
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
