//! Signal conditioning and duty-cycle arithmetic used by the FSM.
//!
//! Both submodules are pure: no I/O, no logging, state only in the structs
//! the caller owns.

pub mod debounce;
pub mod duty_cycle;
