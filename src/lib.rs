//! Air-exchange fan controller library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulator. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod clock;
pub mod config;
pub mod datalog;
pub mod display;
pub mod error;
pub mod fsm;
pub mod scheduler;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod pins;
pub mod sensors;
