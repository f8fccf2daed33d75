//! BME280 environment sensor adapter
//!
//! This adapter implements the EnvironmentSensor port using the bme280
//! driver for the Bosch combined temperature/pressure/humidity part, and
//! scales its floating-point readings into the station's fixed-point units.

use bme280::i2c::BME280;
use embassy_time::Delay;
use libm::roundf;

use crate::domain::environment::EnvironmentSample;
use crate::ports::environment::{EnvironmentError, EnvironmentSensor};

/// BME280 adapter implementing EnvironmentSensor
///
/// The sensor is probed and calibrated by `init()`; sampling before that
/// reports `NotInitialized`.
pub struct Bme280Environment<I> {
    sensor: BME280<I>,
    delay: Delay,
    ready: bool,
}

impl<I: embedded_hal::i2c::I2c> Bme280Environment<I> {
    /// Create the adapter on the primary address (SDO low, 0x76).
    pub fn new(i2c: I) -> Self {
        Self {
            sensor: BME280::new_primary(i2c),
            delay: Delay,
            ready: false,
        }
    }

    /// Create the adapter on the secondary address (SDO high, 0x77).
    pub fn new_secondary(i2c: I) -> Self {
        Self {
            sensor: BME280::new_secondary(i2c),
            delay: Delay,
            ready: false,
        }
    }
}

/// Map driver errors onto the port's vocabulary
fn map_error<E>(error: bme280::Error<E>) -> EnvironmentError {
    match error {
        bme280::Error::Bus(_) => EnvironmentError::ReadFailed,
        bme280::Error::UnsupportedChip => EnvironmentError::Disconnected,
        bme280::Error::NoCalibrationData => EnvironmentError::Disconnected,
        bme280::Error::CompensationFailed => EnvironmentError::InvalidData,
        bme280::Error::InvalidData => EnvironmentError::InvalidData,
    }
}

impl<I: embedded_hal::i2c::I2c> EnvironmentSensor for Bme280Environment<I> {
    fn init(&mut self) -> Result<(), EnvironmentError> {
        self.sensor.init(&mut self.delay).map_err(map_error)?;
        self.ready = true;
        Ok(())
    }

    fn sample(&mut self) -> Result<EnvironmentSample, EnvironmentError> {
        if !self.ready {
            return Err(EnvironmentError::NotInitialized);
        }
        let measurements = self.sensor.measure(&mut self.delay).map_err(map_error)?;
        Ok(EnvironmentSample {
            temperature_dc: roundf(measurements.temperature * 10.0) as i32,
            // The driver reports pascals; ten of those make a deci-hectopascal.
            pressure_dhpa: roundf(measurements.pressure / 10.0) as i32,
            humidity_dpct: roundf(measurements.humidity * 10.0) as i32,
        })
    }
}
