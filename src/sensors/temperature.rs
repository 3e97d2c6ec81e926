//! NTC thermistor temperature probes (10 kOhm @ 25 C, B = 3950).
//!
//! Each probe sits in a voltage divider with a fixed 10 kOhm resistor and
//! is sampled by an ADC channel.  The simplified Beta (Steinhart-Hart)
//! equation converts resistance to temperature.
//!
//! Temperatures are informational only: they go to the display and the
//! data log and never influence the fan.

use crate::error::SensorError;

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;

/// Anything that yields a temperature in degrees Celsius.
pub trait Thermometer {
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// A raw 12-bit ADC sample source.
pub trait AdcChannel {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

impl<F: FnMut() -> Result<u16, SensorError>> AdcChannel for F {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self()
    }
}

/// Thermistor read through an [`AdcChannel`].
pub struct NtcThermistor<A: AdcChannel> {
    adc: A,
}

impl<A: AdcChannel> NtcThermistor<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }
}

impl<A: AdcChannel> Thermometer for NtcThermistor<A> {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        adc_to_celsius(self.adc.read_raw()?)
    }
}

/// Convert a divider reading to Celsius.  An open or shorted probe pins
/// the divider at a rail and is reported as unavailable.
pub fn adc_to_celsius(raw: u16) -> Result<f32, SensorError> {
    let voltage = (f32::from(raw) / ADC_MAX) * V_REF;
    if voltage <= 0.01 || voltage >= (V_REF - 0.01) {
        return Err(SensorError::ThermometerUnavailable);
    }
    let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
    let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
    if inv_t <= 0.0 {
        return Err(SensorError::ThermometerUnavailable);
    }
    Ok((1.0 / inv_t) - 273.15)
}
