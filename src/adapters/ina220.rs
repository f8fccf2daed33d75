//! INA220 power monitor adapter
//!
//! This adapter implements the PowerMonitor port over an INA220 bus/shunt
//! monitor on I2C. Conversions run in single-shot triggered mode so the
//! electrical sequencer controls exactly when the part samples.

use embedded_hal::i2c::I2c;

use crate::ports::power_monitor::{PowerMonitor, PowerMonitorError};

/// Factory-default slave address (A1 = A0 = GND).
pub const DEFAULT_ADDRESS: u8 = 0x40;

const REG_CONFIG: u8 = 0x00;
const REG_SHUNT_VOLTAGE: u8 = 0x01;
const REG_BUS_VOLTAGE: u8 = 0x02;

/// 32 V bus range, ±320 mV shunt range, 12-bit conversions, mode bits clear.
const CONFIG_BASE: u16 = 0x3998;
const MODE_SHUNT_TRIGGERED: u16 = 0b001;
const MODE_BUS_TRIGGERED: u16 = 0b010;

/// Conversion-ready flag in the bus voltage register.
const CNVR_MASK: u16 = 1 << 1;

/// Bus voltage register is pre-shifted; one LSB is 4 mV.
const BUS_MV_PER_LSB: i32 = 4;
/// Shunt voltage register LSB, microvolts.
const SHUNT_UV_PER_LSB: i32 = 10;

/// INA220 adapter implementing PowerMonitor
///
/// Generic over any `embedded-hal` I2C bus. The shunt resistance is fixed
/// per board and turns shunt microvolts into milliamps.
pub struct Ina220Monitor<I> {
    i2c: I,
    address: u8,
    shunt_milliohms: i32,
}

impl<I: I2c> Ina220Monitor<I> {
    pub fn new(i2c: I, address: u8, shunt_milliohms: i32) -> Self {
        Self {
            i2c,
            address,
            shunt_milliohms,
        }
    }

    /// Release the underlying I2C bus
    pub fn release(self) -> I {
        self.i2c
    }

    fn write_register(&mut self, register: u8, value: u16) -> Result<(), PowerMonitorError> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c
            .write(self.address, &[register, hi, lo])
            .map_err(|_| PowerMonitorError::Bus)
    }

    fn read_register(&mut self, register: u8) -> Result<u16, PowerMonitorError> {
        let mut raw = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut raw)
            .map_err(|_| PowerMonitorError::Bus)?;
        Ok(u16::from_be_bytes(raw))
    }
}

impl<I: I2c> PowerMonitor for Ina220Monitor<I> {
    /// Park the part powered down and verify it holds the configuration.
    fn configure(&mut self) -> Result<(), PowerMonitorError> {
        self.write_register(REG_CONFIG, CONFIG_BASE)?;
        if self.read_register(REG_CONFIG)? != CONFIG_BASE {
            return Err(PowerMonitorError::ConfigRejected);
        }
        Ok(())
    }

    fn start_bus_conversion(&mut self) -> Result<(), PowerMonitorError> {
        // Writing the configuration register kicks off a triggered
        // conversion and clears CNVR.
        self.write_register(REG_CONFIG, CONFIG_BASE | MODE_BUS_TRIGGERED)
    }

    fn start_shunt_conversion(&mut self) -> Result<(), PowerMonitorError> {
        self.write_register(REG_CONFIG, CONFIG_BASE | MODE_SHUNT_TRIGGERED)
    }

    fn conversion_ready(&mut self) -> Result<bool, PowerMonitorError> {
        Ok(self.read_register(REG_BUS_VOLTAGE)? & CNVR_MASK != 0)
    }

    fn bus_millivolts(&mut self) -> Result<i32, PowerMonitorError> {
        let register = self.read_register(REG_BUS_VOLTAGE)?;
        Ok(i32::from(register >> 3) * BUS_MV_PER_LSB)
    }

    fn shunt_milliamps(&mut self) -> Result<i32, PowerMonitorError> {
        let raw = self.read_register(REG_SHUNT_VOLTAGE)? as i16;
        Ok(i32::from(raw) * SHUNT_UV_PER_LSB / self.shunt_milliohms)
    }
}
