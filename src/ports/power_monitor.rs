//! Power monitor port - triggered voltage and current conversions
//!
//! The electrical sequencer drives a shunt-and-bus monitor (an INA220 in the
//! field units) through this trait. Conversions are one-shot: the sequencer
//! triggers one, polls until it is ready and then reads the result, so a
//! single port call never blocks for the conversion time.

/// Error type for power monitor operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum PowerMonitorError {
    /// The device rejected its measurement configuration.
    ConfigRejected,
    /// A bus transaction failed or the device stopped acknowledging.
    Bus,
}

/// Port for a combined bus-voltage and shunt-current monitor.
///
/// # Example Implementation
///
/// ```ignore
/// struct Ina220PowerMonitor<'d, T: i2c::Instance> {
///     i2c: I2c<'d, T, i2c::Blocking>,
///     address: u8,
/// }
///
/// impl<T: i2c::Instance> PowerMonitor for Ina220PowerMonitor<'_, T> {
///     fn start_bus_conversion(&mut self) -> Result<(), PowerMonitorError> {
///         self.write_register(REG_CONFIG, CONFIG_BUS_TRIGGERED)
///     }
///
///     fn conversion_ready(&mut self) -> Result<bool, PowerMonitorError> {
///         Ok(self.read_register(REG_BUS_VOLTAGE)? & CNVR_MASK != 0)
///     }
///     // ...
/// }
/// ```
pub trait PowerMonitor {
    /// Probe the device and write its measurement configuration.
    fn configure(&mut self) -> Result<(), PowerMonitorError>;

    /// Trigger a one-shot bus-voltage conversion.
    fn start_bus_conversion(&mut self) -> Result<(), PowerMonitorError>;

    /// Trigger a one-shot shunt-current conversion.
    fn start_shunt_conversion(&mut self) -> Result<(), PowerMonitorError>;

    /// Whether the last triggered conversion has finished.
    fn conversion_ready(&mut self) -> Result<bool, PowerMonitorError>;

    /// Bus voltage of the completed conversion, in mV.
    fn bus_millivolts(&mut self) -> Result<i32, PowerMonitorError>;

    /// Shunt current of the completed conversion, in mA.
    fn shunt_milliamps(&mut self) -> Result<i32, PowerMonitorError>;
}
