//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.  This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!             [all clear]
//!  NOT_RUNNING ──────────────▶ RUNNING
//!    ▲  │  ▲                    │   │
//!    │  │  └──[off request]─────┘   │ [off request, ratio < target]
//!    │  │                           │ [no request, ratio > target]
//!    │  │ [all clear,               ▼
//!    │  │  avg > target]      RUNNING_ADJUSTING
//!    │  ▼                           │
//!    │ NOT_RUNNING_ADJUSTING        │ [ratio > target | adjust off]
//!    │  │                           │
//!    └──┴───────────────────────────┘
//!      [off request | avg < target | adjust off]
//! ```
//!
//! Every transition into `NotRunning` from a running state closes the
//! duty-cycle period.  Comparisons against the target are strict.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Running
        StateDescriptor {
            id: StateId::Running,
            name: "Running",
            on_enter: Some(running_enter),
            on_exit: None,
            on_update: running_update,
        },
        // Index 1: NotRunning
        StateDescriptor {
            id: StateId::NotRunning,
            name: "NotRunning",
            on_enter: Some(not_running_enter),
            on_exit: None,
            on_update: not_running_update,
        },
        // Index 2: RunningAdjusting
        StateDescriptor {
            id: StateId::RunningAdjusting,
            name: "RunningAdjusting",
            on_enter: Some(running_adjusting_enter),
            on_exit: None,
            on_update: running_adjusting_update,
        },
        // Index 3: NotRunningAdjusting
        StateDescriptor {
            id: StateId::NotRunningAdjusting,
            name: "NotRunningAdjusting",
            on_enter: Some(not_running_adjusting_enter),
            on_exit: None,
            on_update: not_running_adjusting_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING state: fan on, following the contacts
// ═══════════════════════════════════════════════════════════════════════════

fn running_enter(ctx: &mut FsmContext) {
    ctx.relay_on = true;
    ctx.duty.start_on(ctx.now);
    info!("RUNNING: fan on");
}

fn running_update(ctx: &mut FsmContext) -> Option<StateId> {
    let ratio = ctx.duty.update_ratio(ctx.now);
    let adjust = ctx.targets.adjustment_enabled;
    let target = ctx.targets.desired_ratio;

    if ctx.off_request() {
        if adjust && ratio < target {
            info!(
                "RUNNING: off requested but ratio {:.3} < target {:.3}, holding on",
                ratio, target
            );
            return Some(StateId::RunningAdjusting);
        }
        ctx.close_period();
        return Some(StateId::NotRunning);
    }

    if adjust && ratio > target {
        debug!("RUNNING: ratio {:.3} above target {:.3}", ratio, target);
        return Some(StateId::RunningAdjusting);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  NOT_RUNNING state: fan off until every input clears
// ═══════════════════════════════════════════════════════════════════════════

fn not_running_enter(ctx: &mut FsmContext) {
    ctx.relay_on = false;
    info!(
        "NOT_RUNNING: fan off, average {:.3} over {} periods",
        ctx.duty.moving_average, ctx.duty.sample_count
    );
}

fn not_running_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.all_clear() {
        return None;
    }

    let duty = &ctx.duty;
    if ctx.targets.adjustment_enabled
        && duty.sample_count > 0
        && duty.moving_average > ctx.targets.desired_ratio
    {
        return Some(StateId::NotRunningAdjusting);
    }

    Some(StateId::Running)
}

// ═══════════════════════════════════════════════════════════════════════════
//  RUNNING_ADJUSTING state: fan held on to reach the target ratio
// ═══════════════════════════════════════════════════════════════════════════

fn running_adjusting_enter(ctx: &mut FsmContext) {
    ctx.relay_on = true;
    info!(
        "RUNNING_ADJUSTING: regulating towards {:.3}",
        ctx.targets.desired_ratio
    );
}

fn running_adjusting_update(ctx: &mut FsmContext) -> Option<StateId> {
    let ratio = ctx.duty.update_ratio(ctx.now);

    if ratio > ctx.targets.desired_ratio || !ctx.targets.adjustment_enabled {
        ctx.close_period();
        return Some(StateId::NotRunning);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  NOT_RUNNING_ADJUSTING state: fan held off, average above target
// ═══════════════════════════════════════════════════════════════════════════

fn not_running_adjusting_enter(ctx: &mut FsmContext) {
    ctx.relay_on = false;
    info!(
        "NOT_RUNNING_ADJUSTING: average {:.3} above target {:.3}, holding off",
        ctx.duty.moving_average, ctx.targets.desired_ratio
    );
}

fn not_running_adjusting_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.off_request() {
        ctx.close_period();
        return Some(StateId::NotRunning);
    }

    if !ctx.targets.adjustment_enabled || ctx.duty.moving_average < ctx.targets.desired_ratio {
        return Some(StateId::NotRunning);
    }

    None
}
