//! Peripheral drivers: fan relay output and ADC bring-up.

pub mod hw_init;
pub mod relay;
