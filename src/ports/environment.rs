//! Environment sensor port - ambient temperature, pressure and humidity
//!
//! The port speaks the station's fixed-point units; scaling from whatever
//! the sensor natively reports happens in the adapter.

use crate::domain::environment::EnvironmentSample;

/// Error type for environment sensor operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum EnvironmentError {
    /// The sensor did not answer on the bus.
    Disconnected,
    /// A measurement could not be read.
    ReadFailed,
    /// The sensor produced values outside its rated range.
    InvalidData,
    /// Sampled before a successful `init`.
    NotInitialized,
}

/// Port for the combined environment sensor.
pub trait EnvironmentSensor {
    /// Probe and configure the sensor.
    fn init(&mut self) -> Result<(), EnvironmentError>;

    /// Take one observation.
    fn sample(&mut self) -> Result<EnvironmentSample, EnvironmentError>;
}
